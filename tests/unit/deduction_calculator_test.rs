// Scenario tests for single-rule evaluation: method dispatch, base
// resolution, clamping, rounding and the non-applicable result paths.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use payrules::modules::deductions::services::deduction_calculator::{
    CalculationInput, DeductionCalculator,
};
use payrules::modules::rules::models::{
    Applicability, CalcMethod, DeductionRule, DeductionType, TaxBand,
};
use payrules::InMemoryRuleRepository;

fn make_rule(code: &str, calc_method: CalcMethod) -> DeductionRule {
    DeductionRule {
        id: 1,
        region_code: "NG".to_string(),
        code: code.to_string(),
        name: format!("{} rule", code),
        deduction_type: DeductionType::Tax,
        is_statutory: true,
        applicability: Applicability::Employee,
        calc_method,
        min_base: None,
        max_base: None,
        floor_amount: None,
        cap_amount: None,
        employee_share: None,
        employer_share: None,
        employment_types: Vec::new(),
        min_service_months: 0,
        effective_from: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
        effective_to: None,
        is_active: true,
        display_order: 0,
    }
}

fn calculator() -> DeductionCalculator {
    DeductionCalculator::new(Arc::new(InMemoryRuleRepository::new()), dec!(12))
}

/// The six-band progressive schedule used across these tests
fn spec_bands() -> Vec<TaxBand> {
    vec![
        TaxBand::new(1, 1, dec!(0), Some(dec!(300000)), dec!(0.07)),
        TaxBand::new(1, 2, dec!(300000), Some(dec!(600000)), dec!(0.11)),
        TaxBand::new(1, 3, dec!(600000), Some(dec!(1100000)), dec!(0.15)),
        TaxBand::new(1, 4, dec!(1100000), Some(dec!(1600000)), dec!(0.19)),
        TaxBand::new(1, 5, dec!(1600000), Some(dec!(3200000)), dec!(0.21)),
        TaxBand::new(1, 6, dec!(3200000), None, dec!(0.24)),
    ]
}

fn components(pairs: &[(&str, Decimal)]) -> BTreeMap<String, Decimal> {
    pairs
        .iter()
        .map(|(name, amount)| (name.to_string(), *amount))
        .collect()
}

#[test]
fn test_progressive_monthly_100k() {
    // annual 1,200,000: 300000*7% + 300000*11% + 500000*15% + 100000*19%
    // = 148,000 annual, 12,333.33 monthly after half-up rounding
    let rule = make_rule(
        "PAYE",
        CalcMethod::Progressive {
            base_components: vec![],
        },
    );
    let input = CalculationInput::new(components(&[("basic", dec!(100000))]));

    let result = calculator().calculate_rule(&rule, &spec_bands(), &input);

    assert!(result.is_applicable);
    assert_eq!(result.amount, dec!(12333.33));
    assert_eq!(
        result.calc_details["annualized_base"].as_str().unwrap(),
        "1200000"
    );
    assert_eq!(
        result.calc_details["annual_tax"]
            .as_str()
            .unwrap()
            .parse::<Decimal>()
            .unwrap(),
        dec!(148000)
    );
}

#[test]
fn test_progressive_income_inside_first_band() {
    let rule = make_rule(
        "PAYE",
        CalcMethod::Progressive {
            base_components: vec![],
        },
    );
    // annual 240,000, entirely inside the 7% band
    let input = CalculationInput::new(components(&[("basic", dec!(20000))]));

    let result = calculator().calculate_rule(&rule, &spec_bands(), &input);

    assert_eq!(result.amount, dec!(1400));
}

#[test]
fn test_progressive_zero_income() {
    let rule = make_rule(
        "PAYE",
        CalcMethod::Progressive {
            base_components: vec![],
        },
    );
    let input = CalculationInput::new(components(&[("basic", dec!(0))]));

    let result = calculator().calculate_rule(&rule, &spec_bands(), &input);

    assert!(result.is_applicable);
    assert_eq!(result.amount, Decimal::ZERO);
}

#[test]
fn test_progressive_without_annualization() {
    let rule = make_rule(
        "PAYE",
        CalcMethod::Progressive {
            base_components: vec![],
        },
    );
    let mut input = CalculationInput::new(components(&[("income", dec!(1200000))]));
    input.annualize = false;

    let result = calculator().calculate_rule(&rule, &spec_bands(), &input);

    // same annual base as the monthly-100k scenario, no de-annualization
    assert_eq!(result.amount, dec!(148000));
}

#[test]
fn test_progressive_with_no_bands_is_soft_failure() {
    let rule = make_rule(
        "BROKEN",
        CalcMethod::Progressive {
            base_components: vec![],
        },
    );
    let input = CalculationInput::new(components(&[("basic", dec!(100000))]));

    let result = calculator().calculate_rule(&rule, &[], &input);

    assert!(!result.is_applicable);
    assert_eq!(result.amount, Decimal::ZERO);
    assert!(result
        .skip_reason
        .unwrap()
        .contains("no configured bands"));
}

#[test]
fn test_flat_amount_clamped_by_cap() {
    let mut rule = make_rule("LEVY", CalcMethod::Flat { amount: dec!(5000) });
    rule.cap_amount = Some(dec!(4000));
    let input = CalculationInput::new(components(&[("basic", dec!(100000))]));

    let result = calculator().calculate_rule(&rule, &[], &input);

    assert_eq!(result.amount, dec!(4000));
}

#[test]
fn test_flat_amount_raised_to_floor() {
    let mut rule = make_rule("LEVY", CalcMethod::Flat { amount: dec!(50) });
    rule.floor_amount = Some(dec!(200));
    let input = CalculationInput::new(components(&[("basic", dec!(100000))]));

    let result = calculator().calculate_rule(&rule, &[], &input);

    assert_eq!(result.amount, dec!(200));
}

#[test]
fn test_percentage_with_pattern_base() {
    let rule = make_rule(
        "PENSION",
        CalcMethod::Percentage {
            rate: dec!(0.08),
            base_components: vec![
                "basic".to_string(),
                "housing".to_string(),
                "transport".to_string(),
            ],
        },
    );
    let input = CalculationInput::new(components(&[
        ("basic", dec!(500000)),
        ("housing", dec!(100000)),
        ("transport", dec!(50000)),
        ("other", dec!(20000)),
    ]));

    let result = calculator().calculate_rule(&rule, &[], &input);

    // base 650,000 (the "other" component does not match any pattern)
    assert_eq!(result.amount, dec!(52000.00));
    assert_eq!(result.calc_details["base"].as_str().unwrap(), "650000");
}

#[test]
fn test_percentage_base_clamped_to_max_base() {
    let mut rule = make_rule(
        "NSITF",
        CalcMethod::Percentage {
            rate: dec!(0.10),
            base_components: vec![],
        },
    );
    rule.max_base = Some(dec!(400000));
    let input = CalculationInput::new(components(&[("basic", dec!(900000))]));

    let result = calculator().calculate_rule(&rule, &[], &input);

    assert_eq!(result.amount, dec!(40000));
    assert_eq!(result.calc_details["base"].as_str().unwrap(), "400000");
    assert_eq!(
        result.calc_details["unclamped_base"].as_str().unwrap(),
        "900000"
    );
}

#[test]
fn test_percentage_rounds_half_up() {
    let rule = make_rule(
        "ROUND",
        CalcMethod::Percentage {
            rate: dec!(0.015),
            base_components: vec![],
        },
    );
    let input = CalculationInput::new(components(&[("basic", dec!(443))]));

    let result = calculator().calculate_rule(&rule, &[], &input);

    // 443 * 0.015 = 6.645 -> half-up 6.65 (banker's would give 6.64)
    assert_eq!(result.amount, dec!(6.65));
}

#[test]
fn test_ineligible_employment_type_is_skipped() {
    let mut rule = make_rule("PAYE", CalcMethod::Flat { amount: dec!(100) });
    rule.employment_types = vec!["PERMANENT".to_string()];
    let mut input = CalculationInput::new(components(&[("basic", dec!(100000))]));
    input.employment_type = Some("CONTRACT".to_string());

    let result = calculator().calculate_rule(&rule, &[], &input);

    assert!(!result.is_applicable);
    assert_eq!(result.amount, Decimal::ZERO);
    assert!(result.skip_reason.unwrap().contains("not in allowed types"));
}

#[test]
fn test_eligible_employment_type_case_insensitive() {
    let mut rule = make_rule("PAYE", CalcMethod::Flat { amount: dec!(100) });
    rule.employment_types = vec!["PERMANENT".to_string()];
    let mut input = CalculationInput::new(components(&[("basic", dec!(100000))]));
    input.employment_type = Some("Permanent".to_string());

    let result = calculator().calculate_rule(&rule, &[], &input);

    assert!(result.is_applicable);
    assert_eq!(result.amount, dec!(100));
}

#[test]
fn test_insufficient_service_is_skipped() {
    let mut rule = make_rule("GRATUITY", CalcMethod::Flat { amount: dec!(100) });
    rule.min_service_months = 12;
    let mut input = CalculationInput::new(components(&[("basic", dec!(100000))]));
    input.months_of_service = 5;

    let result = calculator().calculate_rule(&rule, &[], &input);

    assert!(!result.is_applicable);
    assert!(result
        .skip_reason
        .unwrap()
        .contains("requires 12 months service, has 5"));
}

#[tokio::test]
async fn test_unknown_rule_code_is_not_an_error() {
    let repo = Arc::new(InMemoryRuleRepository::new());
    let calc = DeductionCalculator::new(repo, dec!(12));
    let input = CalculationInput::new(components(&[("basic", dec!(100000))]));

    let result = calc
        .calculate(
            "NG",
            "MISSING",
            &input,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        )
        .await
        .unwrap();

    assert!(!result.is_applicable);
    assert!(result.skip_reason.unwrap().contains("not found"));
}

#[tokio::test]
async fn test_rule_before_effective_from_is_not_found() {
    let rule = make_rule("PAYE", CalcMethod::Flat { amount: dec!(100) });
    let repo = Arc::new(
        InMemoryRuleRepository::new()
            .with_rule(rule)
            .unwrap(),
    );
    let calc = DeductionCalculator::new(repo, dec!(12));
    let input = CalculationInput::new(components(&[("basic", dec!(100000))]));

    let before = calc
        .calculate(
            "NG",
            "PAYE",
            &input,
            NaiveDate::from_ymd_opt(2019, 12, 31).unwrap(),
        )
        .await
        .unwrap();
    assert!(!before.is_applicable);

    let on_start = calc
        .calculate(
            "NG",
            "PAYE",
            &input,
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
        )
        .await
        .unwrap();
    assert!(on_start.is_applicable);
    assert_eq!(on_start.amount, dec!(100));
}
