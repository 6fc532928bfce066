//! Conversion result models for the Salary Engine.
//!
//! This module contains the [`ConversionResult`] type and its associated
//! structures that capture all outputs of a gross/net conversion: insurance
//! contributions, allowances, per-bracket tax lines and an audit trace.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Direction;

/// The amounts each insurance sub-rate is applied to.
///
/// Social, health and unemployment insurance may have different ceilings,
/// so each component carries its own base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsuranceBase {
    /// Base for social insurance.
    pub social: Decimal,
    /// Base for health insurance.
    pub health: Decimal,
    /// Base for unemployment insurance.
    pub unemployment: Decimal,
}

impl InsuranceBase {
    /// Uses the same base for every component.
    ///
    /// # Example
    ///
    /// ```
    /// use salary_engine::models::InsuranceBase;
    /// use rust_decimal::Decimal;
    ///
    /// let base = InsuranceBase::uniform(Decimal::from(1000));
    /// assert_eq!(base.social, base.unemployment);
    /// ```
    pub fn uniform(amount: Decimal) -> Self {
        Self {
            social: amount,
            health: amount,
            unemployment: amount,
        }
    }
}

/// Insurance contributions of one payer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsuranceContributions {
    /// Social insurance contribution.
    pub social: Decimal,
    /// Health insurance contribution.
    pub health: Decimal,
    /// Unemployment insurance contribution.
    pub unemployment: Decimal,
    /// Sum of the three contributions.
    pub total: Decimal,
}

/// Tax attributed to one bracket of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketTax {
    /// Inclusive lower bound of the bracket.
    pub lower_bound: Decimal,
    /// Exclusive upper bound of the bracket; `None` for the top bracket.
    pub upper_bound: Option<Decimal>,
    /// Marginal rate of the bracket.
    pub rate: Decimal,
    /// Portion of taxable income falling inside the bracket.
    pub taxable_amount: Decimal,
    /// Tax on that portion.
    pub tax: Decimal,
}

/// A single step in the audit trace recording a calculation decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// How the inverse solver reached its answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverStrategy {
    /// Segment localization followed by exact affine inversion.
    Analytic,
    /// Bounded bisection.
    Bisection,
}

/// Record of an inverse solve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverTrace {
    /// The strategy that produced the answer.
    pub strategy: SolverStrategy,
    /// The requested net salary.
    pub target_net: Decimal,
    /// Gross bounds of the segment or final bisection interval.
    pub segment: (Decimal, Decimal),
    /// Number of forward evaluations performed.
    pub evaluations: u32,
}

/// The complete audit trace for a conversion.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps of the final forward pass.
    pub steps: Vec<AuditStep>,
    /// Solver details, present for inverse conversions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solver: Option<SolverTrace>,
}

/// The complete result of one conversion.
///
/// Forward and inverse conversions produce the same shape. Values are exact
/// decimals; only the gross is rounded to the currency unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionResult {
    /// The direction of the request that produced this result.
    pub direction: Direction,
    /// Gross salary.
    pub gross: Decimal,
    /// Net salary.
    pub net: Decimal,
    /// Bases the insurance rates were applied to.
    pub insurance_base: InsuranceBase,
    /// Contributions deducted from the employee.
    pub employee_insurance: InsuranceContributions,
    /// Contributions paid by the employer.
    pub employer_insurance: InsuranceContributions,
    /// Gross minus employee insurance.
    pub pre_tax_income: Decimal,
    /// Personal allowance.
    pub self_allowance: Decimal,
    /// Allowance for all dependants.
    pub dependant_allowance: Decimal,
    /// Dependant count after clamping.
    pub dependants_applied: u32,
    /// Pre-tax income minus allowances, floored at zero.
    pub taxable_income: Decimal,
    /// Tax per bracket, aligned with the bracket table.
    pub bracket_taxes: Vec<BracketTax>,
    /// Sum of all bracket taxes.
    pub total_tax: Decimal,
    /// Gross plus employer contributions.
    pub total_employment_cost: Decimal,
    /// Audit trace of the conversion.
    pub audit_trace: AuditTrace,
}

impl ConversionResult {
    /// Total allowance deducted before tax.
    pub fn total_allowance(&self) -> Decimal {
        self.self_allowance + self.dependant_allowance
    }
}
