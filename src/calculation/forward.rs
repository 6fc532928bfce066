//! Gross-to-net conversion.
//!
//! This module composes the insurance, allowance and tax calculations into
//! the forward pipeline:
//!
//! ```text
//! gross -> insurance base -> insurance -> pre-tax -> taxable -> tax -> net
//! ```
//!
//! Net is monotonically non-decreasing and piecewise linear in gross, with
//! breakpoints where taxable income crosses a bracket boundary and, when the
//! insurance base follows gross, where a contribution ceiling is reached.

use rust_decimal::Decimal;

use crate::config::{InsuranceCeilings, Regime, Zone};
use crate::models::{AuditStep, AuditTrace, ConversionResult, Direction, InsuranceBase};

use super::{compute_allowance, compute_insurance, compute_tax};

/// Validated, resolved parameters shared by every evaluation of one conversion.
#[derive(Debug, Clone, Copy)]
pub struct ConversionParams<'a> {
    /// The regime in force.
    pub regime: &'a Regime,
    /// The employee's minimum-wage zone.
    pub zone: &'a Zone,
    /// Requested dependant count (clamped by the allowance calculator).
    pub dependants: i32,
    /// Explicit insurance base; `None` means the base follows gross.
    pub insurance_base: Option<Decimal>,
}

impl ConversionParams<'_> {
    /// Returns true when the insurance base varies with gross.
    pub fn base_follows_gross(&self) -> bool {
        self.insurance_base.is_none()
    }
}

/// Returns the cap on the unemployment insurance base for a zone.
pub fn unemployment_cap(ceilings: &InsuranceCeilings, zone: &Zone) -> Decimal {
    ceilings.unemployment_cap_multiplier * zone.minimum_wage
}

/// Resolves the per-component insurance base.
///
/// The raw base is `explicit` when supplied, otherwise `gross`. Social and
/// health bases are capped at `social_health_cap`; the unemployment base is
/// capped at the zone's unemployment ceiling.
///
/// # Examples
///
/// ```
/// use salary_engine::calculation::resolve_insurance_base;
/// use salary_engine::config::{InsuranceCeilings, Zone};
/// use rust_decimal::Decimal;
///
/// let ceilings = InsuranceCeilings {
///     social_health_cap: Decimal::from(46_800_000),
///     unemployment_cap_multiplier: Decimal::from(20),
/// };
/// let zone = Zone { name: "Region I".to_string(), minimum_wage: Decimal::from(4_960_000) };
///
/// let base = resolve_insurance_base(Decimal::from(120_000_000), None, &ceilings, &zone);
/// assert_eq!(base.social, Decimal::from(46_800_000));
/// assert_eq!(base.unemployment, Decimal::from(99_200_000));
/// ```
pub fn resolve_insurance_base(
    gross: Decimal,
    explicit: Option<Decimal>,
    ceilings: &InsuranceCeilings,
    zone: &Zone,
) -> InsuranceBase {
    let raw = explicit.unwrap_or(gross).max(Decimal::ZERO);
    let social_health = raw.min(ceilings.social_health_cap);
    InsuranceBase {
        social: social_health,
        health: social_health,
        unemployment: raw.min(unemployment_cap(ceilings, zone)),
    }
}

/// Returns the gross values at which an insurance ceiling starts to bind.
///
/// Empty when the base is explicit, since the contributions are then
/// constant in gross.
pub fn insurance_breakpoints(params: &ConversionParams<'_>) -> Vec<Decimal> {
    if !params.base_follows_gross() {
        return Vec::new();
    }
    let ceilings = &params.regime.ceilings;
    let mut caps = vec![
        ceilings.social_health_cap,
        unemployment_cap(ceilings, params.zone),
    ];
    caps.sort();
    caps.dedup();
    caps
}

/// Converts a gross salary into net salary with a full breakdown.
///
/// The gross is used exactly as given; callers round it to the currency
/// unit beforehand.
pub fn gross_to_net(gross: Decimal, params: &ConversionParams<'_>) -> ConversionResult {
    let regime = params.regime;
    let ceilings = &regime.ceilings;

    let insurance_base = resolve_insurance_base(gross, params.insurance_base, ceilings, params.zone);
    let base_step = AuditStep {
        step_number: 1,
        rule_id: "insurance_base".to_string(),
        rule_name: "Insurance Base".to_string(),
        input: serde_json::json!({
            "gross": gross.normalize().to_string(),
            "explicit_base": params.insurance_base.map(|b| b.normalize().to_string()),
            "social_health_cap": ceilings.social_health_cap.normalize().to_string(),
            "unemployment_cap": unemployment_cap(ceilings, params.zone).normalize().to_string()
        }),
        output: serde_json::json!({
            "social": insurance_base.social.normalize().to_string(),
            "health": insurance_base.health.normalize().to_string(),
            "unemployment": insurance_base.unemployment.normalize().to_string()
        }),
        reasoning: format!(
            "{} base {} capped to {} (social/health) and {} (unemployment, zone {})",
            if params.insurance_base.is_some() {
                "Explicit"
            } else {
                "Gross"
            },
            params.insurance_base.unwrap_or(gross).normalize(),
            insurance_base.social.normalize(),
            insurance_base.unemployment.normalize(),
            params.zone.name
        ),
    };

    let insurance = compute_insurance(&insurance_base, &regime.insurance, 2);
    let pre_tax_income = gross - insurance.employee.total;

    let allowance = compute_allowance(params.dependants, &regime.allowances, 3);
    let taxable_income = (pre_tax_income - allowance.total).max(Decimal::ZERO);

    let tax = compute_tax(taxable_income, &regime.tax_brackets, 4);
    let net = pre_tax_income - tax.total;

    let net_step = AuditStep {
        step_number: 5,
        rule_id: "net_salary".to_string(),
        rule_name: "Net Salary".to_string(),
        input: serde_json::json!({
            "pre_tax_income": pre_tax_income.normalize().to_string(),
            "total_tax": tax.total.normalize().to_string()
        }),
        output: serde_json::json!({
            "net": net.normalize().to_string()
        }),
        reasoning: format!(
            "{} - {} insurance = {} pre-tax; {} - {} tax = {} net",
            gross.normalize(),
            insurance.employee.total.normalize(),
            pre_tax_income.normalize(),
            pre_tax_income.normalize(),
            tax.total.normalize(),
            net.normalize()
        ),
    };

    ConversionResult {
        direction: Direction::Forward,
        gross,
        net,
        insurance_base,
        employee_insurance: insurance.employee,
        employer_insurance: insurance.employer,
        pre_tax_income,
        self_allowance: allowance.self_allowance,
        dependant_allowance: allowance.dependant_allowance,
        dependants_applied: allowance.dependants_applied,
        taxable_income,
        bracket_taxes: tax.bracket_taxes,
        total_tax: tax.total,
        total_employment_cost: gross + insurance.employer.total,
        audit_trace: AuditTrace {
            steps: vec![
                base_step,
                insurance.audit_step,
                allowance.audit_step,
                tax.audit_step,
                net_step,
            ],
            solver: None,
        },
    }
}
