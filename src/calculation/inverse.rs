//! Net-to-gross inversion.
//!
//! The forward function is monotonic and piecewise linear in gross, so the
//! solver works in two phases:
//!
//! 1. **Segment localization.** Candidate breakpoints are built from the
//!    insurance ceilings and from each bracket lower bound translated back
//!    through the allowance and insurance offsets. The forward converter is
//!    evaluated at each one and the segment whose net range contains the
//!    target is found by binary search.
//! 2. **Affine inversion.** Inside a segment net is `a × gross + b`, so the
//!    gross is solved directly.
//!
//! If the analytic answer does not reproduce the target within tolerance,
//! a bounded bisection takes over. Either way the number of forward
//! evaluations is bounded.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::config::SolverConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{ConversionResult, Direction, SolverStrategy, SolverTrace};

use super::forward::{ConversionParams, gross_to_net, insurance_breakpoints};
use super::{compute_allowance, currency_unit, round_to_unit};

/// A forward evaluation at one gross value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Breakpoint {
    /// Gross salary.
    pub gross: Decimal,
    /// Pre-tax income at that gross.
    pub pre_tax: Decimal,
    /// Net salary at that gross.
    pub net: Decimal,
}

/// Outcome of a bounded bisection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BisectionOutcome {
    /// The evaluated gross whose net was closest to the target.
    pub gross: Decimal,
    /// Net at `gross`.
    pub net: Decimal,
    /// Final bracketing interval.
    pub interval: (Decimal, Decimal),
    /// Number of oracle calls made.
    pub evaluations: u32,
    /// True if `net` lies within tolerance of the target.
    pub converged: bool,
}

/// Counts forward evaluations made on behalf of one solve.
struct Oracle<'a> {
    params: &'a ConversionParams<'a>,
    evaluations: u32,
}

impl<'a> Oracle<'a> {
    fn new(params: &'a ConversionParams<'a>) -> Self {
        Self {
            params,
            evaluations: 0,
        }
    }

    fn evaluate(&mut self, gross: Decimal) -> Breakpoint {
        self.evaluations += 1;
        let result = gross_to_net(gross, self.params);
        Breakpoint {
            gross,
            pre_tax: result.pre_tax_income,
            net: result.net,
        }
    }
}

/// Finds the gross salary whose net equals `target_net`.
///
/// The search is limited to `[gross_min, gross_max]`; with an explicit
/// insurance base the lower limit is raised to that base. The returned
/// gross is rounded to the currency unit and the result is the forward
/// conversion of that gross, re-validated against the target.
///
/// # Errors
///
/// Returns `InversionUnreachable` if the target lies outside the nets
/// achievable in the range, or if neither the analytic path nor the
/// bisection fallback reproduces it within `solver.tolerance`.
pub fn net_to_gross(
    target_net: Decimal,
    params: &ConversionParams<'_>,
    gross_min: Decimal,
    gross_max: Decimal,
    solver: &SolverConfig,
) -> EngineResult<ConversionResult> {
    let gross_min = match params.insurance_base {
        Some(base) => gross_min.max(base),
        None => gross_min,
    };
    let unreachable_error = |reason: String| EngineError::InversionUnreachable {
        target_net,
        gross_min,
        gross_max,
        reason,
    };
    if gross_min > gross_max {
        return Err(unreachable_error(
            "insurance base exceeds the maximum gross".to_string(),
        ));
    }

    let mut oracle = Oracle::new(params);
    let lowest = oracle.evaluate(gross_min);
    let highest = oracle.evaluate(gross_max);

    if target_net < lowest.net {
        warn!(target_net = %target_net, min_net = %lowest.net, "Target net below achievable range");
        return Err(unreachable_error(format!(
            "target is below the net {} at the minimum gross",
            lowest.net.normalize()
        )));
    }
    if target_net > highest.net {
        warn!(target_net = %target_net, max_net = %highest.net, "Target net above achievable range");
        return Err(unreachable_error(format!(
            "target is above the net {} at the maximum gross",
            highest.net.normalize()
        )));
    }

    let points = segment_breakpoints(&mut oracle, lowest, highest);
    debug!(
        target_net = %target_net,
        breakpoints = points.len(),
        "Localizing gross segment"
    );

    let (segment, exact_gross) = solve_in_segment(&points, target_net);
    let candidate = round_to_unit(exact_gross, solver.currency_decimals).clamp(gross_min, gross_max);
    let analytic = gross_to_net(candidate, params);
    oracle.evaluations += 1;

    if (analytic.net - target_net).abs() <= solver.tolerance {
        debug!(
            gross = %candidate,
            segment_lo = %segment.0,
            segment_hi = %segment.1,
            evaluations = oracle.evaluations,
            "Solved gross analytically"
        );
        return Ok(finish(
            analytic,
            SolverTrace {
                strategy: SolverStrategy::Analytic,
                target_net,
                segment,
                evaluations: oracle.evaluations,
            },
        ));
    }

    debug!(
        gross = %candidate,
        net = %analytic.net,
        "Analytic gross missed tolerance, falling back to bisection"
    );
    let analytic_evaluations = oracle.evaluations;
    let outcome = bisect(
        |gross| oracle.evaluate(gross).net,
        target_net,
        gross_min,
        gross_max,
        solver,
    );
    let evaluations = analytic_evaluations + outcome.evaluations;

    if !outcome.converged {
        warn!(
            target_net = %target_net,
            best_gross = %outcome.gross,
            best_net = %outcome.net,
            evaluations,
            "Bisection did not converge"
        );
        return Err(unreachable_error(format!(
            "no gross within tolerance {} after {} evaluations",
            solver.tolerance.normalize(),
            evaluations
        )));
    }

    Ok(finish(
        gross_to_net(outcome.gross, params),
        SolverTrace {
            strategy: SolverStrategy::Bisection,
            target_net,
            segment: outcome.interval,
            evaluations,
        },
    ))
}

fn finish(mut result: ConversionResult, trace: SolverTrace) -> ConversionResult {
    result.direction = Direction::Inverse;
    result.audit_trace.solver = Some(trace);
    result
}

/// Builds the ordered breakpoints of the forward function on `[lowest, highest]`.
///
/// Insurance ceilings are breakpoints directly. Pre-tax income is affine
/// between them, so each bracket lower bound (offset by the allowance) is
/// mapped back to gross by linear interpolation over those knots. The
/// result has at most `brackets + caps + 2` points.
fn segment_breakpoints(oracle: &mut Oracle<'_>, lowest: Breakpoint, highest: Breakpoint) -> Vec<Breakpoint> {
    let params = oracle.params;

    let mut knots = vec![lowest];
    for cap in insurance_breakpoints(params) {
        if cap > lowest.gross && cap < highest.gross {
            knots.push(oracle.evaluate(cap));
        }
    }
    knots.push(highest);

    let allowance = compute_allowance(params.dependants, &params.regime.allowances, 0).total;
    let mut points = knots.clone();

    // The zero lower bound maps to where taxable income first leaves zero.
    for bracket in params.regime.tax_brackets.brackets() {
        let pre_tax_target = allowance + bracket.lower_bound;
        let crossing = knots.windows(2).find_map(|pair| {
            let (lo, hi) = (pair[0], pair[1]);
            if pre_tax_target <= lo.pre_tax || pre_tax_target >= hi.pre_tax {
                return None;
            }
            Some(lo.gross + (pre_tax_target - lo.pre_tax) * (hi.gross - lo.gross) / (hi.pre_tax - lo.pre_tax))
        });
        if let Some(gross) = crossing {
            points.push(oracle.evaluate(gross));
        }
    }

    points.sort_by(|a, b| a.gross.cmp(&b.gross));
    points.dedup_by(|a, b| a.gross == b.gross);
    points
}

/// Locates the segment containing `target_net` and inverts it exactly.
///
/// `points` must be sorted by gross with non-decreasing net, and the target
/// must lie within the net range of the first and last point.
fn solve_in_segment(points: &[Breakpoint], target_net: Decimal) -> ((Decimal, Decimal), Decimal) {
    let index = points.partition_point(|p| p.net < target_net);

    if index == 0 {
        let first = points[0];
        return ((first.gross, first.gross), first.gross);
    }
    let hi = points[index.min(points.len() - 1)];
    let lo = points[index - 1];

    if hi.net == lo.net {
        return ((lo.gross, hi.gross), lo.gross);
    }
    let gross = lo.gross + (target_net - lo.net) * (hi.gross - lo.gross) / (hi.net - lo.net);
    ((lo.gross, hi.gross), gross)
}

/// Bisects `[lower, upper]` for a gross whose net is within tolerance of `target_net`.
///
/// `net_at` must be non-decreasing. Midpoints are rounded to the currency
/// unit and at most `solver.max_iterations` oracle calls are made. The
/// closest evaluation found is always returned.
///
/// # Examples
///
/// ```
/// use salary_engine::calculation::bisect;
/// use salary_engine::config::SolverConfig;
/// use rust_decimal::Decimal;
///
/// let outcome = bisect(
///     |g| g * g / Decimal::from(1_000_000),
///     Decimal::from(2_500),
///     Decimal::ZERO,
///     Decimal::from(1_000_000),
///     &SolverConfig::default(),
/// );
/// assert!(outcome.converged);
/// assert!((outcome.gross - Decimal::from(50_000)).abs() <= Decimal::from(10));
/// ```
pub fn bisect<F>(
    mut net_at: F,
    target_net: Decimal,
    lower: Decimal,
    upper: Decimal,
    solver: &SolverConfig,
) -> BisectionOutcome
where
    F: FnMut(Decimal) -> Decimal,
{
    let unit = currency_unit(solver.currency_decimals);
    let mut lo = lower;
    let mut hi = upper;
    let mut evaluations = 0u32;
    let mut best: Option<(Decimal, Decimal)> = None;

    let mut pending = vec![upper, lower];
    while evaluations < solver.max_iterations {
        let gross = match pending.pop() {
            Some(endpoint) => endpoint,
            None => {
                if hi - lo <= unit {
                    break;
                }
                let mid = round_to_unit((lo + hi) / Decimal::TWO, solver.currency_decimals);
                if mid <= lo || mid >= hi {
                    break;
                }
                mid
            }
        };

        let net = net_at(gross);
        evaluations += 1;

        let closer = best.is_none_or(|(_, best_net)| {
            (net - target_net).abs() < (best_net - target_net).abs()
        });
        if closer {
            best = Some((gross, net));
        }
        if (net - target_net).abs() <= solver.tolerance {
            break;
        }
        if gross != lower && gross != upper {
            if net < target_net {
                lo = gross;
            } else {
                hi = gross;
            }
        }
    }

    let (gross, net) = best.unwrap_or((lower, target_net - solver.tolerance - Decimal::ONE));
    BisectionOutcome {
        gross,
        net,
        interval: (lo, hi),
        evaluations,
        converged: evaluations > 0 && (net - target_net).abs() <= solver.tolerance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Regime;
    use crate::config::fixtures::{dec, sample_limits, sample_regime};

    fn params(regime: &Regime, dependants: i32, base: Option<Decimal>) -> ConversionParams<'_> {
        ConversionParams {
            regime,
            zone: regime.zone("I").unwrap(),
            dependants,
            insurance_base: base,
        }
    }

    fn solve(regime: &Regime, target: &str, dependants: i32) -> EngineResult<ConversionResult> {
        let limits = sample_limits();
        net_to_gross(
            dec(target),
            &params(regime, dependants, None),
            limits.salary_range.min,
            limits.salary_range.max,
            &limits.solver,
        )
    }

    /// IV-001: inverse of the documented boundary sample
    #[test]
    fn test_inverts_boundary_sample() {
        let regime = sample_regime();
        let result = solve(&regime, "17460000", 0).unwrap();

        assert_eq!(result.gross, dec("20000000"));
        assert_eq!(result.net, dec("17460000"));
        assert_eq!(result.direction, Direction::Inverse);

        let trace = result.audit_trace.solver.unwrap();
        assert_eq!(trace.strategy, SolverStrategy::Analytic);
        assert_eq!(trace.target_net, dec("17460000"));
        assert!(trace.segment.0 <= dec("20000000") && dec("20000000") <= trace.segment.1);
    }

    /// IV-002: target in the untaxed segment
    #[test]
    fn test_inverts_below_allowance() {
        let regime = sample_regime();
        let result = solve(&regime, "8950000", 0).unwrap();

        assert_eq!(result.gross, dec("10000000"));
        assert_eq!(result.total_tax, Decimal::ZERO);
        assert_eq!(
            result.audit_trace.solver.unwrap().strategy,
            SolverStrategy::Analytic
        );
    }

    /// IV-007: targets on either side of the allowance crossing
    #[test]
    fn test_inverts_around_allowance_crossing_analytically() {
        let regime = sample_regime();
        for (gross, dependants) in [("14000000", 0), ("1123457", 0), ("19508380", 3)] {
            let p = params(&regime, dependants, None);
            let expected = gross_to_net(dec(gross), &p);
            let result = solve(&regime, &expected.net.to_string(), dependants).unwrap();

            assert_eq!(result.gross, dec(gross));
            assert_eq!(result.net, expected.net);
            assert_eq!(
                result.audit_trace.solver.unwrap().strategy,
                SolverStrategy::Analytic,
                "gross {} fell back to bisection",
                gross
            );
        }
    }

    /// IV-003: target above both insurance ceilings
    #[test]
    fn test_inverts_above_insurance_ceilings() {
        let regime = sample_regime();
        let result = solve(&regime, "88165300", 0).unwrap();

        assert_eq!(result.gross, dec("120000000"));
    }

    /// IV-004: target below the net at the minimum gross
    #[test]
    fn test_target_below_minimum_net_is_unreachable() {
        let regime = sample_regime();

        match solve(&regime, "500000", 3) {
            Err(EngineError::InversionUnreachable {
                target_net, reason, ..
            }) => {
                assert_eq!(target_net, dec("500000"));
                assert!(reason.contains("below"));
            }
            other => panic!("Expected InversionUnreachable error, got {:?}", other),
        }
    }

    /// IV-005: target above the net at the maximum gross
    #[test]
    fn test_target_above_maximum_net_is_unreachable() {
        let regime = sample_regime();

        match solve(&regime, "1999000000", 0) {
            Err(EngineError::InversionUnreachable { reason, .. }) => {
                assert!(reason.contains("above"));
            }
            other => panic!("Expected InversionUnreachable error, got {:?}", other),
        }
    }

    /// IV-006: explicit base raises the lower search limit
    #[test]
    fn test_explicit_base_inverts_forward_result() {
        let regime = sample_regime();
        let limits = sample_limits();
        let p = params(&regime, 0, Some(dec("5000000")));

        let result = net_to_gross(
            dec("18877500"),
            &p,
            limits.salary_range.min,
            limits.salary_range.max,
            &limits.solver,
        )
        .unwrap();

        assert_eq!(result.gross, dec("20000000"));
        assert_eq!(result.employee_insurance.total, dec("525000"));
    }

    #[test]
    fn test_round_trip_across_every_segment() {
        let regime = sample_regime();
        let p = params(&regime, 1, None);
        for gross in [
            "1000000", "15400000", "21000000", "33333333", "46800000", "50000000", "75000000",
            "99200000", "99200001", "150000000", "987654321",
        ] {
            let forward = gross_to_net(dec(gross), &p);
            let limits = sample_limits();
            let inverse = net_to_gross(
                forward.net,
                &p,
                limits.salary_range.min,
                limits.salary_range.max,
                &limits.solver,
            )
            .unwrap();
            assert!(
                (inverse.gross - dec(gross)).abs() <= limits.solver.tolerance,
                "gross {} came back as {}",
                gross,
                inverse.gross
            );
            assert_eq!(
                inverse.audit_trace.solver.unwrap().strategy,
                SolverStrategy::Analytic
            );
        }
    }

    #[test]
    fn test_analytic_path_uses_few_evaluations() {
        let regime = sample_regime();
        let result = solve(&regime, "30000000", 2).unwrap();

        let trace = result.audit_trace.solver.unwrap();
        assert_eq!(trace.strategy, SolverStrategy::Analytic);
        // endpoints + two ceilings + seven bracket crossings + final pass
        let bound = regime.tax_brackets.len() as u32 + 2 + 3;
        assert!(trace.evaluations <= bound, "evaluations {}", trace.evaluations);
    }

    #[test]
    fn test_breakpoints_are_sorted_and_include_ceilings() {
        let regime = sample_regime();
        let p = params(&regime, 0, None);
        let mut oracle = Oracle::new(&p);
        let lowest = oracle.evaluate(dec("1000000"));
        let highest = oracle.evaluate(dec("2000000000"));

        let points = segment_breakpoints(&mut oracle, lowest, highest);

        assert!(points.windows(2).all(|w| w[0].gross < w[1].gross));
        assert!(points.windows(2).all(|w| w[0].net <= w[1].net));
        assert!(points.iter().any(|p| p.gross == dec("46800000")));
        assert!(points.iter().any(|p| p.gross == dec("99200000")));
        // taxable income leaves zero when pre-tax reaches the 11M allowance
        let allowance_crossing = dec("11000000") / dec("0.895");
        assert!(points.iter().any(|p| (p.gross - allowance_crossing).abs() < dec("0.000001")));
        // taxable income reaches 5M when pre-tax reaches 16M: gross = 16M / 0.895
        let first_crossing = dec("16000000") / dec("0.895");
        assert!(points.iter().any(|p| (p.gross - first_crossing).abs() < dec("0.000001")));
    }

    #[test]
    fn test_solve_in_segment_interpolates_linearly() {
        let points = [
            Breakpoint {
                gross: dec("0"),
                pre_tax: dec("0"),
                net: dec("0"),
            },
            Breakpoint {
                gross: dec("100"),
                pre_tax: dec("100"),
                net: dec("80"),
            },
            Breakpoint {
                gross: dec("200"),
                pre_tax: dec("200"),
                net: dec("140"),
            },
        ];

        let (segment, gross) = solve_in_segment(&points, dec("110"));
        assert_eq!(segment, (dec("100"), dec("200")));
        assert_eq!(gross, dec("150"));

        let (_, gross) = solve_in_segment(&points, dec("0"));
        assert_eq!(gross, dec("0"));
    }

    #[test]
    fn test_bisect_converges_on_nonlinear_oracle() {
        let outcome = bisect(
            |g| g * g / dec("1000000"),
            dec("2500"),
            dec("0"),
            dec("1000000"),
            &SolverConfig::default(),
        );

        assert!(outcome.converged);
        assert!((outcome.net - dec("2500")).abs() <= Decimal::ONE);
        assert!(outcome.evaluations <= 64);
    }

    #[test]
    fn test_bisect_respects_iteration_cap() {
        let solver = SolverConfig {
            max_iterations: 3,
            ..SolverConfig::default()
        };
        let outcome = bisect(|g| g, dec("400000"), dec("0"), dec("1000000"), &solver);

        assert_eq!(outcome.evaluations, 3);
        assert!(!outcome.converged);
        // the midpoint 500000 is the closest of 0, 1000000 and 500000
        assert_eq!(outcome.gross, dec("500000"));
    }

    #[test]
    fn test_bisect_reports_unreachable_target() {
        let outcome = bisect(
            |g| g / Decimal::TWO,
            dec("900"),
            dec("0"),
            dec("1000"),
            &SolverConfig::default(),
        );

        assert!(!outcome.converged);
        assert_eq!(outcome.gross, dec("1000"));
    }
}
