//! Integration tests for the Salary Engine.
//!
//! This test suite loads the shipped Viet Nam configuration and covers:
//! - The documented 20,000,000 boundary sample
//! - Forward conversion across insurance ceilings and zones
//! - Inverse conversion and round trips
//! - Effective-dated regime selection
//! - Error cases

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

use salary_engine::config::ConfigLoader;
use salary_engine::convert;
use salary_engine::error::EngineError;
use salary_engine::models::{Direction, SalaryInput, SolverStrategy};

// =============================================================================
// Test Helpers
// =============================================================================

fn loader() -> ConfigLoader {
    ConfigLoader::load("./config/vn").expect("Failed to load config")
}

fn decimal(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn current() -> NaiveDate {
    date(2024, 8, 1)
}

// =============================================================================
// Forward conversion
// =============================================================================

#[test]
fn test_boundary_sample_breakdown() {
    let loader = loader();
    let input = SalaryInput::forward(decimal("20000000"), 0, "I");
    let result = loader.convert(&input, current()).unwrap();

    assert_eq!(result.employee_insurance.social, decimal("1600000"));
    assert_eq!(result.employee_insurance.health, decimal("300000"));
    assert_eq!(result.employee_insurance.unemployment, decimal("200000"));
    assert_eq!(result.employee_insurance.total, decimal("2100000"));
    assert_eq!(result.pre_tax_income, decimal("17900000"));
    assert_eq!(result.self_allowance, decimal("11000000"));
    assert_eq!(result.dependant_allowance, Decimal::ZERO);
    assert_eq!(result.taxable_income, decimal("6900000"));
    assert_eq!(result.bracket_taxes.len(), 7);
    assert_eq!(result.bracket_taxes[0].tax, decimal("250000"));
    assert_eq!(result.bracket_taxes[1].tax, decimal("190000"));
    assert_eq!(result.total_tax, decimal("440000"));
    assert_eq!(result.net, decimal("17460000"));
}

#[test]
fn test_employer_contributions_and_total_cost() {
    let loader = loader();
    let input = SalaryInput::forward(decimal("20000000"), 0, "I");
    let result = loader.convert(&input, current()).unwrap();

    assert_eq!(result.employer_insurance.social, decimal("3500000"));
    assert_eq!(result.employer_insurance.health, decimal("600000"));
    assert_eq!(result.employer_insurance.unemployment, decimal("200000"));
    assert_eq!(result.employer_insurance.total, decimal("4300000"));
    assert_eq!(result.total_employment_cost, decimal("24300000"));
}

#[test]
fn test_unemployment_ceiling_depends_on_zone() {
    let loader = loader();
    let zone_i = loader
        .convert(&SalaryInput::forward(decimal("80000000"), 0, "I"), current())
        .unwrap();
    let zone_iv = loader
        .convert(&SalaryInput::forward(decimal("80000000"), 0, "IV"), current())
        .unwrap();

    // Zone I cap is 99.2M (not binding), zone IV cap is 69M
    assert_eq!(zone_i.insurance_base.unemployment, decimal("80000000"));
    assert_eq!(zone_iv.insurance_base.unemployment, decimal("69000000"));
    assert_eq!(
        zone_i.employee_insurance.unemployment - zone_iv.employee_insurance.unemployment,
        decimal("110000")
    );
    assert!(zone_iv.net > zone_i.net);
}

#[test]
fn test_older_regime_uses_lower_social_health_cap() {
    let loader = loader();
    let input = SalaryInput::forward(decimal("40000000"), 0, "I");

    let old = loader.convert(&input, date(2024, 1, 1)).unwrap();
    let new = loader.convert(&input, date(2024, 8, 1)).unwrap();

    assert_eq!(old.insurance_base.social, decimal("36000000"));
    assert_eq!(new.insurance_base.social, decimal("40000000"));
    assert!(old.net > new.net);
}

#[test]
fn test_dependants_reduce_tax() {
    let loader = loader();
    let none = loader
        .convert(&SalaryInput::forward(decimal("35000000"), 0, "II"), current())
        .unwrap();
    let two = loader
        .convert(&SalaryInput::forward(decimal("35000000"), 2, "II"), current())
        .unwrap();

    assert_eq!(two.dependant_allowance, decimal("8800000"));
    assert_eq!(none.taxable_income - two.taxable_income, decimal("8800000"));
    assert!(two.total_tax < none.total_tax);
    assert!(two.net > none.net);
}

#[test]
fn test_result_serializes_to_json() {
    let loader = loader();
    let result = loader
        .convert(&SalaryInput::forward(decimal("20000000"), 0, "I"), current())
        .unwrap();

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["direction"], "forward");
    assert_eq!(decimal(json["net"].as_str().unwrap()), decimal("17460000"));
    assert_eq!(json["bracket_taxes"].as_array().unwrap().len(), 7);
    assert!(json["audit_trace"]["steps"].is_array());
}

// =============================================================================
// Inverse conversion
// =============================================================================

#[test]
fn test_inverse_boundary_sample() {
    let loader = loader();
    let input = SalaryInput::inverse(decimal("17460000"), 0, "I");
    let result = loader.convert(&input, current()).unwrap();

    assert_eq!(result.direction, Direction::Inverse);
    assert_eq!(result.gross, decimal("20000000"));
    assert_eq!(result.net, decimal("17460000"));
    assert_eq!(
        result.audit_trace.solver.as_ref().unwrap().strategy,
        SolverStrategy::Analytic
    );
}

#[test]
fn test_inverse_reproduces_target_within_tolerance() {
    let loader = loader();
    let tolerance = loader.limits().solver.tolerance;
    for (target, dependants, zone) in [
        ("12345678", 0, "I"),
        ("25000000", 1, "II"),
        ("54321987", 3, "III"),
        ("150000000", 0, "IV"),
    ] {
        let input = SalaryInput::inverse(decimal(target), dependants, zone);
        let result = loader.convert(&input, current()).unwrap();

        assert!(
            (result.net - decimal(target)).abs() <= tolerance,
            "target {} reproduced as {}",
            target,
            result.net
        );
        assert_eq!(result.gross, result.gross.round());
    }
}

#[test]
fn test_inverse_with_explicit_insurance_base() {
    let loader = loader();
    let forward = SalaryInput::forward(decimal("30000000"), 1, "I")
        .with_insurance_base(decimal("10000000"));
    let net = loader.convert(&forward, current()).unwrap().net;

    let inverse = SalaryInput::inverse(net, 1, "I").with_insurance_base(decimal("10000000"));
    let result = loader.convert(&inverse, current()).unwrap();

    assert_eq!(result.gross, decimal("30000000"));
    assert_eq!(result.employee_insurance.total, decimal("1050000"));
}

#[test]
fn test_inversion_unreachable_below_minimum_net() {
    let loader = loader();
    // Net at the 1,000,000 minimum gross is 895,000
    let input = SalaryInput::inverse(decimal("100000"), 4, "I");

    match loader.convert(&input, current()) {
        Err(EngineError::InversionUnreachable {
            target_net,
            gross_min,
            ..
        }) => {
            assert_eq!(target_net, decimal("100000"));
            assert_eq!(gross_min, decimal("1000000"));
        }
        other => panic!("Expected InversionUnreachable error, got {:?}", other),
    }
}

#[test]
fn test_zero_target_net_is_unreachable() {
    let loader = loader();
    let input = SalaryInput::inverse(Decimal::ZERO, 4, "I");

    match loader.convert(&input, current()) {
        Err(EngineError::InversionUnreachable { target_net, .. }) => {
            assert_eq!(target_net, Decimal::ZERO);
        }
        other => panic!("Expected InversionUnreachable error, got {:?}", other),
    }
}

#[test]
fn test_inverse_low_salary_is_solved_analytically() {
    let loader = loader();
    let forward = loader
        .convert(&SalaryInput::forward(decimal("14000000"), 0, "I"), current())
        .unwrap();

    let input = SalaryInput::inverse(forward.net, 0, "I");
    let result = loader.convert(&input, current()).unwrap();

    assert_eq!(result.gross, decimal("14000000"));
    assert_eq!(
        result.audit_trace.solver.as_ref().unwrap().strategy,
        SolverStrategy::Analytic
    );
}

// =============================================================================
// Error cases
// =============================================================================

#[test]
fn test_unknown_zone() {
    let loader = loader();
    let input = SalaryInput::forward(decimal("20000000"), 0, "Z");

    assert!(matches!(
        loader.convert(&input, current()),
        Err(EngineError::InvalidZone { .. })
    ));
}

#[test]
fn test_date_before_any_regime() {
    let loader = loader();
    let input = SalaryInput::forward(decimal("20000000"), 0, "I");

    assert!(matches!(
        loader.convert(&input, date(2020, 1, 1)),
        Err(EngineError::RegimeNotFound { .. })
    ));
}

#[test]
fn test_salary_out_of_range() {
    let loader = loader();
    let input = SalaryInput::forward(decimal("500"), 0, "I");

    assert!(matches!(
        loader.convert(&input, current()),
        Err(EngineError::InvalidSalaryRange { .. })
    ));
}

#[test]
fn test_free_function_matches_loader_convenience() {
    let loader = loader();
    let input = SalaryInput::forward(decimal("45000000"), 2, "III");

    let regime = loader.regime_for(current()).unwrap();
    let direct = convert(&input, regime, loader.limits()).unwrap();
    let via_loader = loader.convert(&input, current()).unwrap();

    assert_eq!(direct, via_loader);
}
