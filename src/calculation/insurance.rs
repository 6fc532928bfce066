//! Insurance contribution calculation.
//!
//! This module applies employee and employer insurance rates to an
//! insurance base. Capping the base is the caller's job; see
//! [`resolve_insurance_base`](super::resolve_insurance_base).

use crate::config::{InsuranceRates, SubRates};
use crate::models::{AuditStep, InsuranceBase, InsuranceContributions};

/// The result of an insurance calculation, including both payers and the audit step.
#[derive(Debug, Clone)]
pub struct InsuranceResult {
    /// Contributions deducted from the employee.
    pub employee: InsuranceContributions,
    /// Contributions paid by the employer.
    pub employer: InsuranceContributions,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Computes employee and employer insurance contributions.
///
/// Each contribution is `base component × sub-rate`. No capping is applied
/// here; employer contributions never affect the employee's net.
///
/// # Examples
///
/// ```
/// use salary_engine::calculation::compute_insurance;
/// use salary_engine::config::{InsuranceRates, SubRates};
/// use salary_engine::models::InsuranceBase;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let d = |s: &str| Decimal::from_str(s).unwrap();
/// let rates = InsuranceRates {
///     employee: SubRates { social: d("0.08"), health: d("0.015"), unemployment: d("0.01") },
///     employer: SubRates { social: d("0.175"), health: d("0.03"), unemployment: d("0.01") },
/// };
///
/// let result = compute_insurance(&InsuranceBase::uniform(d("20000000")), &rates, 1);
/// assert_eq!(result.employee.total, d("2100000"));
/// ```
pub fn compute_insurance(
    base: &InsuranceBase,
    rates: &InsuranceRates,
    step_number: u32,
) -> InsuranceResult {
    let employee = contributions(base, &rates.employee);
    let employer = contributions(base, &rates.employer);

    let audit_step = AuditStep {
        step_number,
        rule_id: "insurance".to_string(),
        rule_name: "Social, Health and Unemployment Insurance".to_string(),
        input: serde_json::json!({
            "social_base": base.social.normalize().to_string(),
            "health_base": base.health.normalize().to_string(),
            "unemployment_base": base.unemployment.normalize().to_string()
        }),
        output: serde_json::json!({
            "employee_total": employee.total.normalize().to_string(),
            "employer_total": employer.total.normalize().to_string()
        }),
        reasoning: format!(
            "Employee: {} + {} + {} = {}; employer: {} + {} + {} = {}",
            employee.social.normalize(),
            employee.health.normalize(),
            employee.unemployment.normalize(),
            employee.total.normalize(),
            employer.social.normalize(),
            employer.health.normalize(),
            employer.unemployment.normalize(),
            employer.total.normalize()
        ),
    };

    InsuranceResult {
        employee,
        employer,
        audit_step,
    }
}

fn contributions(base: &InsuranceBase, rates: &SubRates) -> InsuranceContributions {
    let social = base.social * rates.social;
    let health = base.health * rates.health;
    let unemployment = base.unemployment * rates.unemployment;
    InsuranceContributions {
        social,
        health,
        unemployment,
        total: social + health + unemployment,
    }
}
