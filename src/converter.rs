//! The conversion entry point.
//!
//! [`convert`] validates a [`SalaryInput`] against a regime and the
//! conversion limits, then runs the forward converter or the inverse
//! solver. All validation happens before any computation.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::calculation::{ConversionParams, gross_to_net, net_to_gross, round_to_unit};
use crate::config::{ConfigLoader, ConversionLimits, DependantPolicy, Regime};
use crate::error::{EngineError, EngineResult};
use crate::models::{ConversionResult, Direction, SalaryInput};

/// Converts a salary in the direction the input asks for.
///
/// # Errors
///
/// - `InvalidSalaryRange` if a forward gross is outside the salary range, or
///   an inverse target net exceeds the range maximum
/// - `InvalidDependentCount` if the count is out of range and the regime rejects it
/// - `InvalidZone` if the zone is unknown
/// - `InvalidInsuranceBase` if the explicit base is negative, or exceeds a forward gross
/// - `InversionUnreachable` if no gross in the salary range produces the target
///   net, including any target of zero or below
///
/// # Example
///
/// ```no_run
/// use salary_engine::config::ConfigLoader;
/// use salary_engine::converter::convert;
/// use salary_engine::models::SalaryInput;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let loader = ConfigLoader::load("./config/vn")?;
/// let regime = loader.regime_for(NaiveDate::from_ymd_opt(2024, 8, 1).unwrap())?;
///
/// let input = SalaryInput::forward(Decimal::from(20_000_000), 0, "I");
/// let result = convert(&input, regime, loader.limits())?;
/// assert_eq!(result.net, Decimal::from(17_460_000));
/// # Ok::<(), salary_engine::error::EngineError>(())
/// ```
pub fn convert(
    input: &SalaryInput,
    regime: &Regime,
    limits: &ConversionLimits,
) -> EngineResult<ConversionResult> {
    let params = validate(input, regime, limits).inspect_err(|err| {
        warn!(
            direction = ?input.direction,
            zone = %input.zone,
            error = %err,
            "Rejected salary input"
        );
    })?;

    let result = match input.direction {
        Direction::Forward => {
            let gross = round_to_unit(input.salary, limits.solver.currency_decimals);
            gross_to_net(gross, &params)
        }
        Direction::Inverse => net_to_gross(
            input.salary,
            &params,
            limits.salary_range.min,
            limits.salary_range.max,
            &limits.solver,
        )?,
    };

    info!(
        direction = ?input.direction,
        zone = %input.zone,
        dependants = result.dependants_applied,
        gross = %result.gross,
        net = %result.net,
        "Conversion completed"
    );
    Ok(result)
}

/// Checks every input field, in order, and resolves the conversion parameters.
fn validate<'a>(
    input: &SalaryInput,
    regime: &'a Regime,
    limits: &ConversionLimits,
) -> EngineResult<ConversionParams<'a>> {
    let range = limits.salary_range;
    let salary_ok = match input.direction {
        Direction::Forward => range.contains(input.salary),
        // reachability of an inverse target is left to the solver
        Direction::Inverse => input.salary <= range.max,
    };
    if !salary_ok {
        return Err(EngineError::InvalidSalaryRange {
            salary: input.salary,
            min: range.min,
            max: range.max,
        });
    }

    let allowances = &regime.allowances;
    let dependants_in_range = input.dependants >= 0
        && u32::try_from(input.dependants).is_ok_and(|n| n <= allowances.max_dependants);
    if !dependants_in_range && allowances.dependant_policy == DependantPolicy::Reject {
        return Err(EngineError::InvalidDependentCount {
            dependants: input.dependants,
            max: allowances.max_dependants,
        });
    }

    let zone = regime.zone(&input.zone)?;

    let insurance_base = match input.insurance_base {
        Some(base) if base < Decimal::ZERO => {
            return Err(EngineError::InvalidInsuranceBase {
                base,
                reason: "must not be negative".to_string(),
            });
        }
        Some(base) if input.direction == Direction::Forward && base > input.salary => {
            return Err(EngineError::InvalidInsuranceBase {
                base,
                reason: format!("must not exceed the gross salary {}", input.salary),
            });
        }
        Some(base) => Some(round_to_unit(base, limits.solver.currency_decimals)),
        None => None,
    };

    Ok(ConversionParams {
        regime,
        zone,
        dependants: input.dependants,
        insurance_base,
    })
}

impl ConfigLoader {
    /// Converts a salary using the regime in force on `date`.
    pub fn convert(&self, input: &SalaryInput, date: NaiveDate) -> EngineResult<ConversionResult> {
        let regime = self.regime_for(date)?;
        convert(input, regime, self.limits())
    }
}
