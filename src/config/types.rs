//! Configuration types for salary conversion.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files. Structural invariants
//! (bracket ordering, rate bounds) are checked when the types are built,
//! so a loaded [`Regime`] is always safe to compute with.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{EngineError, EngineResult};

/// Metadata about the jurisdiction.
#[derive(Debug, Clone, Deserialize)]
pub struct JurisdictionMetadata {
    /// Short code for the jurisdiction (e.g., "VN").
    pub code: String,
    /// The human-readable name of the jurisdiction.
    pub name: String,
    /// ISO currency code of all monetary values (e.g., "VND").
    pub currency: String,
    /// URL to the legal source of the regime.
    pub source_url: String,
}

/// Inclusive range of salaries accepted by the converter.
///
/// The same range bounds the gross values the inverse solver will consider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryRange {
    /// Smallest accepted salary.
    pub min: Decimal,
    /// Largest accepted salary.
    pub max: Decimal,
}

impl SalaryRange {
    /// Returns true if `salary` lies within `[min, max]`.
    pub fn contains(&self, salary: Decimal) -> bool {
        salary >= self.min && salary <= self.max
    }
}

/// Settings for the inverse solver and the rounding convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Largest accepted difference between the requested and the reproduced net.
    pub tolerance: Decimal,
    /// Maximum number of oracle calls made by the bisection fallback.
    pub max_iterations: u32,
    /// Decimal places of the smallest currency unit (0 for VND, 2 for cents).
    pub currency_decimals: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: Decimal::ONE,
            max_iterations: 64,
            currency_decimals: 0,
        }
    }
}

/// Limits applied to every conversion regardless of the regime in force.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ConversionLimits {
    /// Accepted salary range.
    pub salary_range: SalaryRange,
    /// Inverse solver settings.
    #[serde(default)]
    pub solver: SolverConfig,
}

impl ConversionLimits {
    /// Checks that the range is non-empty and the solver settings are usable.
    pub fn validate(&self) -> EngineResult<()> {
        let range = self.salary_range;
        if range.min <= Decimal::ZERO || range.min > range.max {
            return Err(invalid_config(format!(
                "salary range [{}, {}] must be positive and non-empty",
                range.min, range.max
            )));
        }
        if self.solver.tolerance <= Decimal::ZERO {
            return Err(invalid_config("solver tolerance must be positive"));
        }
        if self.solver.max_iterations == 0 {
            return Err(invalid_config("solver max_iterations must be > 0"));
        }
        Ok(())
    }
}

/// Jurisdiction file structure (`jurisdiction.yaml`).
#[derive(Debug, Clone, Deserialize)]
pub struct JurisdictionFile {
    /// Jurisdiction metadata.
    pub jurisdiction: JurisdictionMetadata,
    /// Conversion limits.
    pub limits: ConversionLimits,
}

/// A single progressive tax band.
///
/// Income in `[lower_bound, upper_bound)` is taxed at `rate`. The top band
/// has no upper bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    /// Inclusive lower bound of the band.
    pub lower_bound: Decimal,
    /// Exclusive upper bound of the band; `None` for the top band.
    #[serde(default)]
    pub upper_bound: Option<Decimal>,
    /// Marginal rate as a fraction (0.05 for 5%).
    pub rate: Decimal,
}

/// An ordered, contiguous table of tax brackets spanning `[0, ∞)`.
///
/// The table can only be built from brackets that start at zero, are
/// contiguous, have strictly increasing rates in `[0, 1)` and end with a
/// single unbounded band.
///
/// # Example
///
/// ```
/// use salary_engine::config::{TaxBracket, TaxBracketTable};
/// use rust_decimal::Decimal;
///
/// let table = TaxBracketTable::new(vec![
///     TaxBracket { lower_bound: Decimal::ZERO, upper_bound: Some(Decimal::from(100)), rate: Decimal::new(10, 2) },
///     TaxBracket { lower_bound: Decimal::from(100), upper_bound: None, rate: Decimal::new(20, 2) },
/// ]).unwrap();
///
/// assert_eq!(table.closed_form_tax(Decimal::from(150)), Decimal::from(20));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TaxBracket>", into = "Vec<TaxBracket>")]
pub struct TaxBracketTable {
    brackets: Vec<TaxBracket>,
}

impl TaxBracketTable {
    /// Builds a table, checking every structural invariant.
    pub fn new(brackets: Vec<TaxBracket>) -> EngineResult<Self> {
        let Some(first) = brackets.first() else {
            return Err(invalid_config("tax bracket table is empty"));
        };
        if first.lower_bound != Decimal::ZERO {
            return Err(invalid_config(format!(
                "first tax bracket must start at 0, found {}",
                first.lower_bound
            )));
        }

        for (index, bracket) in brackets.iter().enumerate() {
            if bracket.rate < Decimal::ZERO || bracket.rate >= Decimal::ONE {
                return Err(invalid_config(format!(
                    "tax bracket {} has rate {} outside [0, 1)",
                    index, bracket.rate
                )));
            }

            let is_last = index + 1 == brackets.len();
            match (bracket.upper_bound, is_last) {
                (None, true) => {}
                (None, false) => {
                    return Err(invalid_config(format!(
                        "tax bracket {} is unbounded but is not the top bracket",
                        index
                    )));
                }
                (Some(_), true) => {
                    return Err(invalid_config("top tax bracket must be unbounded"));
                }
                (Some(upper), false) => {
                    let next = &brackets[index + 1];
                    if upper <= bracket.lower_bound {
                        return Err(invalid_config(format!(
                            "tax bracket {} is empty: [{}, {})",
                            index, bracket.lower_bound, upper
                        )));
                    }
                    if next.lower_bound != upper {
                        return Err(invalid_config(format!(
                            "tax brackets {} and {} are not contiguous ({} != {})",
                            index,
                            index + 1,
                            upper,
                            next.lower_bound
                        )));
                    }
                    if next.rate <= bracket.rate {
                        return Err(invalid_config(format!(
                            "tax bracket rates must strictly increase ({} then {})",
                            bracket.rate, next.rate
                        )));
                    }
                }
            }
        }

        Ok(Self { brackets })
    }

    /// Returns the brackets in ascending order.
    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }

    /// Returns the number of brackets.
    pub fn len(&self) -> usize {
        self.brackets.len()
    }

    /// Always false; a table holds at least one bracket.
    pub fn is_empty(&self) -> bool {
        self.brackets.is_empty()
    }

    /// Returns the tax owed on all income below each bracket's lower bound.
    ///
    /// This is the "base amount" column of the closed-form table.
    pub fn base_amounts(&self) -> Vec<Decimal> {
        let mut base = Decimal::ZERO;
        self.brackets
            .iter()
            .map(|bracket| {
                let current = base;
                if let Some(upper) = bracket.upper_bound {
                    base += (upper - bracket.lower_bound) * bracket.rate;
                }
                current
            })
            .collect()
    }

    /// Computes tax as `base amount + marginal rate × excess` for the band
    /// containing `taxable_income`.
    ///
    /// Negative income is treated as zero.
    pub fn closed_form_tax(&self, taxable_income: Decimal) -> Decimal {
        let taxable = taxable_income.max(Decimal::ZERO);
        let bases = self.base_amounts();
        self.brackets
            .iter()
            .zip(bases)
            .rev()
            .find(|(bracket, _)| taxable >= bracket.lower_bound)
            .map(|(bracket, base)| base + (taxable - bracket.lower_bound) * bracket.rate)
            .unwrap_or(Decimal::ZERO)
    }
}

impl TryFrom<Vec<TaxBracket>> for TaxBracketTable {
    type Error = EngineError;

    fn try_from(brackets: Vec<TaxBracket>) -> EngineResult<Self> {
        Self::new(brackets)
    }
}

impl From<TaxBracketTable> for Vec<TaxBracket> {
    fn from(table: TaxBracketTable) -> Self {
        table.brackets
    }
}

/// Social, health and unemployment insurance rates for one payer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubRates {
    /// Social insurance rate.
    pub social: Decimal,
    /// Health insurance rate.
    pub health: Decimal,
    /// Unemployment insurance rate.
    pub unemployment: Decimal,
}

impl SubRates {
    /// Returns the combined rate.
    pub fn total(&self) -> Decimal {
        self.social + self.health + self.unemployment
    }
}

/// Employee and employer insurance rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsuranceRates {
    /// Rates deducted from the employee's salary.
    pub employee: SubRates,
    /// Rates paid by the employer on top of the salary.
    pub employer: SubRates,
}

impl InsuranceRates {
    /// Checks that all rates are non-negative and the employee share is below 100%.
    pub fn validate(&self) -> EngineResult<()> {
        for (payer, rates) in [("employee", &self.employee), ("employer", &self.employer)] {
            if rates.social < Decimal::ZERO
                || rates.health < Decimal::ZERO
                || rates.unemployment < Decimal::ZERO
            {
                return Err(invalid_config(format!(
                    "{} insurance rates must not be negative",
                    payer
                )));
            }
        }
        if self.employee.total() >= Decimal::ONE {
            return Err(invalid_config(format!(
                "employee insurance total {} must be below 1",
                self.employee.total()
            )));
        }
        Ok(())
    }
}

/// Contribution ceilings for the insurance base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsuranceCeilings {
    /// Cap on the social and health insurance base.
    pub social_health_cap: Decimal,
    /// The unemployment base is capped at this multiple of the zone's minimum wage.
    pub unemployment_cap_multiplier: Decimal,
}

/// How out-of-range dependant counts are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependantPolicy {
    /// Clamp the count into `[0, max_dependants]`.
    #[default]
    Clamp,
    /// Reject the input with `InvalidDependentCount`.
    Reject,
}

/// Personal and dependant allowance configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowanceConfig {
    /// Allowance every taxpayer receives.
    pub self_allowance: Decimal,
    /// Allowance per registered dependant.
    pub per_dependant_allowance: Decimal,
    /// Largest number of dependants that attract an allowance.
    pub max_dependants: u32,
    /// Treatment of counts outside `[0, max_dependants]`.
    #[serde(default)]
    pub dependant_policy: DependantPolicy,
}

/// A minimum-wage region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    /// Human-readable name of the region.
    pub name: String,
    /// Monthly regional minimum wage.
    pub minimum_wage: Decimal,
}

/// Every table needed for a conversion, effective from a given date.
#[derive(Debug, Clone, Deserialize)]
pub struct Regime {
    /// The date from which this regime applies.
    pub effective_date: NaiveDate,
    /// Progressive income tax bands.
    pub tax_brackets: TaxBracketTable,
    /// Insurance contribution rates.
    pub insurance: InsuranceRates,
    /// Insurance base ceilings.
    pub ceilings: InsuranceCeilings,
    /// Allowance configuration.
    pub allowances: AllowanceConfig,
    /// Minimum-wage regions by identifier.
    pub zones: HashMap<String, Zone>,
}

impl Regime {
    /// Checks the invariants not already enforced by the bracket table.
    pub fn validate(&self) -> EngineResult<()> {
        self.insurance.validate()?;

        if self.ceilings.social_health_cap <= Decimal::ZERO
            || self.ceilings.unemployment_cap_multiplier <= Decimal::ZERO
        {
            return Err(invalid_config("insurance ceilings must be positive"));
        }
        if self.allowances.self_allowance < Decimal::ZERO
            || self.allowances.per_dependant_allowance < Decimal::ZERO
        {
            return Err(invalid_config("allowances must not be negative"));
        }
        if self.zones.is_empty() {
            return Err(invalid_config(format!(
                "regime effective {} defines no zones",
                self.effective_date
            )));
        }
        if let Some((id, _)) = self
            .zones
            .iter()
            .find(|(_, zone)| zone.minimum_wage <= Decimal::ZERO)
        {
            return Err(invalid_config(format!(
                "zone '{}' must have a positive minimum wage",
                id
            )));
        }
        Ok(())
    }

    /// Looks up a zone by identifier.
    pub fn zone(&self, id: &str) -> EngineResult<&Zone> {
        self.zones.get(id).ok_or_else(|| EngineError::InvalidZone {
            zone: id.to_string(),
        })
    }
}

/// The complete jurisdiction configuration loaded from YAML files.
#[derive(Debug, Clone)]
pub struct JurisdictionConfig {
    /// Jurisdiction metadata.
    metadata: JurisdictionMetadata,
    /// Conversion limits.
    limits: ConversionLimits,
    /// Regimes by effective date (sorted oldest first).
    regimes: Vec<Regime>,
}

impl JurisdictionConfig {
    /// Creates a new JurisdictionConfig from its component parts.
    pub fn new(
        metadata: JurisdictionMetadata,
        limits: ConversionLimits,
        regimes: Vec<Regime>,
    ) -> Self {
        let mut sorted_regimes = regimes;
        sorted_regimes.sort_by(|a, b| a.effective_date.cmp(&b.effective_date));
        Self {
            metadata,
            limits,
            regimes: sorted_regimes,
        }
    }

    /// Returns the jurisdiction metadata.
    pub fn jurisdiction(&self) -> &JurisdictionMetadata {
        &self.metadata
    }

    /// Returns the conversion limits.
    pub fn limits(&self) -> &ConversionLimits {
        &self.limits
    }

    /// Returns all regimes, oldest first.
    pub fn regimes(&self) -> &[Regime] {
        &self.regimes
    }

    /// Validates the limits, every regime, and that no two regimes share an
    /// effective date.
    pub fn validate(&self) -> EngineResult<()> {
        self.limits.validate()?;
        if self.regimes.is_empty() {
            return Err(invalid_config("no regimes configured"));
        }
        for regime in &self.regimes {
            regime.validate()?;
        }
        if let Some(pair) = self
            .regimes
            .windows(2)
            .find(|pair| pair[0].effective_date == pair[1].effective_date)
        {
            return Err(invalid_config(format!(
                "more than one regime is effective from {}",
                pair[0].effective_date
            )));
        }
        Ok(())
    }
}

fn invalid_config(message: impl Into<String>) -> EngineError {
    EngineError::InvalidConfig {
        message: message.into(),
    }
}
