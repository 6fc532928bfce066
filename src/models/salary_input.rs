//! Salary input model and related types.
//!
//! This module defines the [`SalaryInput`] struct and [`Direction`] enum
//! describing one conversion request.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which way a conversion runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Gross salary in, net salary out.
    Forward,
    /// Net salary in, gross salary out.
    Inverse,
}

/// A single conversion request.
///
/// # Example
///
/// ```
/// use salary_engine::models::{Direction, SalaryInput};
/// use rust_decimal::Decimal;
///
/// let input = SalaryInput::forward(Decimal::from(20_000_000), 0, "I");
/// assert_eq!(input.direction, Direction::Forward);
/// assert!(input.insurance_base.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryInput {
    /// Gross salary for a forward conversion, target net for an inverse one.
    pub salary: Decimal,
    /// Number of registered dependants.
    #[serde(default)]
    pub dependants: i32,
    /// Minimum-wage region identifier.
    pub zone: String,
    /// Conversion direction.
    pub direction: Direction,
    /// Explicit insurance base; defaults to the gross salary.
    #[serde(default)]
    pub insurance_base: Option<Decimal>,
}

impl SalaryInput {
    /// Creates a gross-to-net request.
    pub fn forward(gross: Decimal, dependants: i32, zone: impl Into<String>) -> Self {
        Self {
            salary: gross,
            dependants,
            zone: zone.into(),
            direction: Direction::Forward,
            insurance_base: None,
        }
    }

    /// Creates a net-to-gross request.
    pub fn inverse(net: Decimal, dependants: i32, zone: impl Into<String>) -> Self {
        Self {
            salary: net,
            dependants,
            zone: zone.into(),
            direction: Direction::Inverse,
            insurance_base: None,
        }
    }

    /// Sets an explicit insurance base.
    pub fn with_insurance_base(mut self, base: Decimal) -> Self {
        self.insurance_base = Some(base);
        self
    }
}
