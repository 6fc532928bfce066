//! Configuration loading and management for the Salary Engine.
//!
//! This module provides functionality to load jurisdiction configurations
//! from YAML files: tax brackets, insurance rates and ceilings, allowances,
//! minimum-wage zones and conversion limits.
//!
//! # Example
//!
//! ```no_run
//! use salary_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/vn").unwrap();
//! println!("Loaded jurisdiction: {}", config.jurisdiction().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    AllowanceConfig, ConversionLimits, DependantPolicy, InsuranceCeilings, InsuranceRates,
    JurisdictionConfig, JurisdictionFile, JurisdictionMetadata, Regime, SalaryRange,
    SolverConfig, SubRates, TaxBracket, TaxBracketTable, Zone,
};
