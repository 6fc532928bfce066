//! Progressive income tax calculation.
//!
//! This module applies a [`TaxBracketTable`] to a taxable income, keeping
//! the tax attributed to every bracket for breakdown reporting.

use rust_decimal::Decimal;

use crate::config::TaxBracketTable;
use crate::models::{AuditStep, BracketTax};

/// The result of a tax calculation, including the per-bracket lines and audit step.
#[derive(Debug, Clone)]
pub struct TaxResult {
    /// Tax per bracket, in table order.
    pub bracket_taxes: Vec<BracketTax>,
    /// Sum of all bracket taxes.
    pub total: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Computes progressive tax on a taxable income.
///
/// Negative income is clamped to zero. For each bracket the amount inside
/// it is `max(0, min(taxable, upper) - lower)`; the top bracket has no upper
/// clamp. The total equals the closed-form `base + rate × excess` value.
///
/// # Examples
///
/// ```
/// use salary_engine::calculation::compute_tax;
/// use salary_engine::config::{TaxBracket, TaxBracketTable};
/// use rust_decimal::Decimal;
///
/// let table = TaxBracketTable::new(vec![
///     TaxBracket { lower_bound: Decimal::ZERO, upper_bound: Some(Decimal::from(5_000_000)), rate: Decimal::new(5, 2) },
///     TaxBracket { lower_bound: Decimal::from(5_000_000), upper_bound: None, rate: Decimal::new(10, 2) },
/// ]).unwrap();
///
/// let result = compute_tax(Decimal::from(6_900_000), &table, 1);
/// assert_eq!(result.total, Decimal::from(440_000));
/// assert_eq!(result.bracket_taxes[0].tax, Decimal::from(250_000));
/// assert_eq!(result.bracket_taxes[1].tax, Decimal::from(190_000));
/// ```
pub fn compute_tax(taxable_income: Decimal, table: &TaxBracketTable, step_number: u32) -> TaxResult {
    let taxable = taxable_income.max(Decimal::ZERO);

    let bracket_taxes: Vec<BracketTax> = table
        .brackets()
        .iter()
        .map(|bracket| {
            let ceiling = match bracket.upper_bound {
                Some(upper) => taxable.min(upper),
                None => taxable,
            };
            let taxable_amount = (ceiling - bracket.lower_bound).max(Decimal::ZERO);
            BracketTax {
                lower_bound: bracket.lower_bound,
                upper_bound: bracket.upper_bound,
                rate: bracket.rate,
                taxable_amount,
                tax: taxable_amount * bracket.rate,
            }
        })
        .collect();

    let total: Decimal = bracket_taxes.iter().map(|line| line.tax).sum();

    let parts: Vec<String> = bracket_taxes
        .iter()
        .filter(|line| line.taxable_amount > Decimal::ZERO)
        .map(|line| {
            format!(
                "{} @ {}% = {}",
                line.taxable_amount.normalize(),
                (line.rate * Decimal::ONE_HUNDRED).normalize(),
                line.tax.normalize()
            )
        })
        .collect();
    let reasoning = if parts.is_empty() {
        "No taxable income - no tax payable".to_string()
    } else {
        format!("{}; total {}", parts.join(" + "), total.normalize())
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "income_tax".to_string(),
        rule_name: "Progressive Income Tax".to_string(),
        input: serde_json::json!({
            "taxable_income": taxable.normalize().to_string(),
            "brackets": table.len()
        }),
        output: serde_json::json!({
            "bracket_taxes": bracket_taxes
                .iter()
                .map(|line| line.tax.normalize().to_string())
                .collect::<Vec<_>>(),
            "total_tax": total.normalize().to_string()
        }),
        reasoning,
    };

    TaxResult {
        bracket_taxes,
        total,
        audit_step,
    }
}
