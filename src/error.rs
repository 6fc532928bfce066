//! Error types for the Salary Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while loading configuration or
//! converting between gross and net salary.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// The main error type for the Salary Engine.
///
/// Input validation errors are raised before any computation begins, so a
/// caller can always fix the input and re-invoke.
///
/// # Example
///
/// ```
/// use salary_engine::error::EngineError;
///
/// let error = EngineError::InvalidZone {
///     zone: "V".to_string(),
/// };
/// assert_eq!(error.to_string(), "Unknown zone: V");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Configuration parsed but violates an invariant (bracket ordering, rates, ...).
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// A description of the violated invariant.
        message: String,
    },

    /// No regime is effective on the requested date.
    #[error("No regime effective on {date}")]
    RegimeNotFound {
        /// The date for which a regime was requested.
        date: NaiveDate,
    },

    /// The salary lies outside the configured range.
    #[error("Salary {salary} is outside the allowed range [{min}, {max}]")]
    InvalidSalaryRange {
        /// The rejected salary.
        salary: Decimal,
        /// The lower bound of the allowed range.
        min: Decimal,
        /// The upper bound of the allowed range.
        max: Decimal,
    },

    /// The dependant count lies outside `[0, max]` and the regime rejects it.
    #[error("Dependant count {dependants} is outside the allowed range [0, {max}]")]
    InvalidDependentCount {
        /// The rejected dependant count.
        dependants: i32,
        /// The maximum number of dependants.
        max: u32,
    },

    /// The zone identifier is not known to the regime.
    #[error("Unknown zone: {zone}")]
    InvalidZone {
        /// The rejected zone identifier.
        zone: String,
    },

    /// The explicit insurance base is negative or exceeds the gross salary.
    #[error("Invalid insurance base {base}: {reason}")]
    InvalidInsuranceBase {
        /// The rejected insurance base.
        base: Decimal,
        /// Why the base was rejected.
        reason: String,
    },

    /// No gross salary within the plausible range reproduces the requested net.
    #[error("No gross salary in [{gross_min}, {gross_max}] produces net {target_net}: {reason}")]
    InversionUnreachable {
        /// The requested net salary.
        target_net: Decimal,
        /// The lower bound of the gross search range.
        gross_min: Decimal,
        /// The upper bound of the gross search range.
        gross_max: Decimal,
        /// Why the inversion failed.
        reason: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
