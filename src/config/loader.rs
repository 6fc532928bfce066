//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading jurisdiction
//! configurations from YAML files.

use chrono::NaiveDate;
use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{ConversionLimits, JurisdictionConfig, JurisdictionFile, JurisdictionMetadata, Regime};

/// Loads and provides access to jurisdiction configuration.
///
/// The `ConfigLoader` reads YAML configuration files from a directory,
/// validates them and resolves the regime in force on a given date.
///
/// # Directory Structure
///
/// ```text
/// config/vn/
/// ├── jurisdiction.yaml   # Metadata and conversion limits
/// └── regimes/
///     └── 2024-07-01.yaml # Tax, insurance, allowance and zone tables
/// ```
///
/// # Example
///
/// ```no_run
/// use salary_engine::config::ConfigLoader;
/// use chrono::NaiveDate;
///
/// let loader = ConfigLoader::load("./config/vn").unwrap();
///
/// let date = NaiveDate::from_ymd_opt(2024, 8, 1).unwrap();
/// let regime = loader.regime_for(date).unwrap();
/// println!("Brackets in force: {}", regime.tax_brackets.len());
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: JurisdictionConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing (`ConfigNotFound`)
    /// - Any file contains invalid YAML or an invalid bracket table (`ConfigParseError`)
    /// - A regime or the limits violate an invariant (`InvalidConfig`)
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let jurisdiction_path = path.join("jurisdiction.yaml");
        let jurisdiction = Self::load_yaml::<JurisdictionFile>(&jurisdiction_path)?;

        let regimes_dir = path.join("regimes");
        let regimes = Self::load_regimes(&regimes_dir)?;

        let config = JurisdictionConfig::new(jurisdiction.jurisdiction, jurisdiction.limits, regimes);
        let loader = Self::from_config(config)?;
        tracing::debug!(
            jurisdiction = %loader.jurisdiction().code,
            regimes = loader.config().regimes().len(),
            "Loaded salary configuration"
        );

        Ok(loader)
    }

    /// Builds a loader from configuration already held in memory.
    ///
    /// Fails with `InvalidConfig` if the limits or any regime are invalid,
    /// or if two regimes share an effective date.
    pub fn from_config(config: JurisdictionConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads all regime files from the regimes directory.
    fn load_regimes(regimes_dir: &Path) -> EngineResult<Vec<Regime>> {
        let regimes_dir_str = regimes_dir.display().to_string();

        let entries = fs::read_dir(regimes_dir).map_err(|_| EngineError::ConfigNotFound {
            path: regimes_dir_str.clone(),
        })?;

        let mut regimes = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: regimes_dir_str.clone(),
            })?;

            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                regimes.push(Self::load_yaml::<Regime>(&path)?);
            }
        }

        if regimes.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no regime files found)", regimes_dir_str),
            });
        }

        Ok(regimes)
    }

    /// Returns the underlying jurisdiction configuration.
    pub fn config(&self) -> &JurisdictionConfig {
        &self.config
    }

    /// Returns the jurisdiction metadata.
    pub fn jurisdiction(&self) -> &JurisdictionMetadata {
        self.config.jurisdiction()
    }

    /// Returns the conversion limits.
    pub fn limits(&self) -> &ConversionLimits {
        self.config.limits()
    }

    /// Gets the regime in force on a given date.
    ///
    /// The most recent regime effective on or before `date` is returned.
    pub fn regime_for(&self, date: NaiveDate) -> EngineResult<&Regime> {
        self.config
            .regimes()
            .iter()
            .rev()
            .find(|regime| regime.effective_date <= date)
            .ok_or(EngineError::RegimeNotFound { date })
    }

    /// Returns the most recent regime.
    pub fn latest_regime(&self) -> EngineResult<&Regime> {
        self.config
            .regimes()
            .last()
            .ok_or_else(|| EngineError::InvalidConfig {
                message: "no regimes configured".to_string(),
            })
    }
}
