//! Personal and dependant allowance calculation.

use rust_decimal::Decimal;

use crate::config::AllowanceConfig;
use crate::models::AuditStep;

/// The result of an allowance calculation, including the audit step.
#[derive(Debug, Clone)]
pub struct AllowanceResult {
    /// Personal allowance.
    pub self_allowance: Decimal,
    /// Allowance for all counted dependants.
    pub dependant_allowance: Decimal,
    /// Dependant count after clamping into `[0, max_dependants]`.
    pub dependants_applied: u32,
    /// Sum of personal and dependant allowance.
    pub total: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Clamps a dependant count into `[0, config.max_dependants]`.
pub fn clamp_dependants(dependants: i32, config: &AllowanceConfig) -> u32 {
    u32::try_from(dependants.max(0))
        .unwrap_or(0)
        .min(config.max_dependants)
}

/// Computes the total allowance for a dependant count.
///
/// Out-of-range counts are silently clamped. Rejecting them instead is a
/// validation concern handled before this is called.
///
/// # Examples
///
/// ```
/// use salary_engine::calculation::compute_allowance;
/// use salary_engine::config::{AllowanceConfig, DependantPolicy};
/// use rust_decimal::Decimal;
///
/// let config = AllowanceConfig {
///     self_allowance: Decimal::from(11_000_000),
///     per_dependant_allowance: Decimal::from(4_400_000),
///     max_dependants: 10,
///     dependant_policy: DependantPolicy::Clamp,
/// };
///
/// let result = compute_allowance(2, &config, 1);
/// assert_eq!(result.total, Decimal::from(19_800_000));
/// ```
pub fn compute_allowance(dependants: i32, config: &AllowanceConfig, step_number: u32) -> AllowanceResult {
    let applied = clamp_dependants(dependants, config);
    let dependant_allowance = Decimal::from(applied) * config.per_dependant_allowance;
    let total = config.self_allowance + dependant_allowance;

    let reasoning = if i64::from(applied) == i64::from(dependants) {
        format!(
            "{} + {} dependants × {} = {}",
            config.self_allowance.normalize(),
            applied,
            config.per_dependant_allowance.normalize(),
            total.normalize()
        )
    } else {
        format!(
            "{} + {} dependants × {} = {} (requested {} clamped to [0, {}])",
            config.self_allowance.normalize(),
            applied,
            config.per_dependant_allowance.normalize(),
            total.normalize(),
            dependants,
            config.max_dependants
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "allowance".to_string(),
        rule_name: "Personal and Dependant Allowance".to_string(),
        input: serde_json::json!({
            "dependants": dependants,
            "max_dependants": config.max_dependants
        }),
        output: serde_json::json!({
            "dependants_applied": applied,
            "self_allowance": config.self_allowance.normalize().to_string(),
            "dependant_allowance": dependant_allowance.normalize().to_string(),
            "total": total.normalize().to_string()
        }),
        reasoning,
    };

    AllowanceResult {
        self_allowance: config.self_allowance,
        dependant_allowance,
        dependants_applied: applied,
        total,
        audit_step,
    }
}
