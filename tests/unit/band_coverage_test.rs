// Property-based tests for the progressive band evaluator.
//
// The band coverage invariant is the highest-risk correctness property in
// the engine: for any contiguous band configuration and any non-negative
// income, the per-band taxable slices must partition the annualized base
// exactly, and the per-band tax contributions must sum to the reported
// total. A malformed configuration must never yield a nonzero amount.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use payrules::core::money::round_half_up;
use payrules::modules::deductions::services::deduction_calculator::{
    CalculationInput, DeductionCalculator,
};
use payrules::modules::rules::models::{
    Applicability, CalcMethod, DeductionRule, DeductionType, TaxBand,
};
use payrules::InMemoryRuleRepository;

fn progressive_rule() -> DeductionRule {
    DeductionRule {
        id: 1,
        region_code: "XX".to_string(),
        code: "TAX".to_string(),
        name: "Progressive Tax".to_string(),
        deduction_type: DeductionType::Tax,
        is_statutory: true,
        applicability: Applicability::Employee,
        calc_method: CalcMethod::Progressive {
            base_components: vec![],
        },
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

/// Builds a contiguous band chain from widths and percentage rates; the
/// final band is always unbounded.
fn bands_from(widths: &[u32], rates: &[u8]) -> Vec<TaxBand> {
    let mut bands = Vec::with_capacity(widths.len() + 1);
    let mut lower = Decimal::ZERO;

    for (i, (&width, &rate)) in widths.iter().zip(rates.iter()).enumerate() {
        let upper = lower + Decimal::from(width);
        bands.push(TaxBand::new(
            1,
            i as i32 + 1,
            lower,
            Some(upper),
            Decimal::from(rate) / Decimal::from(100),
        ));
        lower = upper;
    }

    let last_rate = *rates.last().unwrap_or(&0);
    bands.push(TaxBand::new(
        1,
        widths.len() as i32 + 1,
        lower,
        None,
        Decimal::from(last_rate) / Decimal::from(100),
    ));

    bands
}

fn detail_decimals(result: &payrules::DeductionResult, field: &str) -> Vec<Decimal> {
    result.calc_details["bands"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| Decimal::from_str(b[field].as_str().unwrap()).unwrap())
        .collect()
}

proptest! {
    #[test]
    fn band_slices_partition_the_annualized_base(
        widths in prop::collection::vec(1u32..500_000, 1..6),
        rates in prop::collection::vec(0u8..=45, 6),
        monthly_base in 1u64..2_000_000,
    ) {
        let bands = bands_from(&widths, &rates[..widths.len()]);
        let rule = progressive_rule();
        let input = CalculationInput::new(BTreeMap::from([
            ("basic".to_string(), Decimal::from(monthly_base)),
        ]));

        let result = calculator().calculate_rule(&rule, &bands, &input);
        prop_assert!(result.is_applicable);

        let annual_base = Decimal::from(monthly_base) * dec!(12);
        let slices = detail_decimals(&result, "taxable");
        let slice_sum: Decimal = slices.iter().copied().sum();

        prop_assert_eq!(slice_sum, annual_base,
            "slices must partition the annualized base exactly");
    }

    #[test]
    fn band_taxes_sum_to_reported_total(
        widths in prop::collection::vec(1u32..500_000, 1..6),
        rates in prop::collection::vec(0u8..=45, 6),
        monthly_base in 0u64..2_000_000,
    ) {
        let bands = bands_from(&widths, &rates[..widths.len()]);
        let rule = progressive_rule();
        let input = CalculationInput::new(BTreeMap::from([
            ("basic".to_string(), Decimal::from(monthly_base)),
        ]));

        let result = calculator().calculate_rule(&rule, &bands, &input);
        prop_assert!(result.is_applicable);

        let taxes = detail_decimals(&result, "tax");
        let tax_sum: Decimal = taxes.iter().copied().sum();
        let annual_tax =
            Decimal::from_str(result.calc_details["annual_tax"].as_str().unwrap()).unwrap();

        prop_assert_eq!(tax_sum, annual_tax);
        prop_assert_eq!(result.amount, round_half_up(annual_tax / dec!(12)));
    }

    #[test]
    fn total_matches_independent_marginal_walk(
        widths in prop::collection::vec(1u32..500_000, 1..6),
        rates in prop::collection::vec(0u8..=45, 6),
        monthly_base in 0u64..2_000_000,
    ) {
        let bands = bands_from(&widths, &rates[..widths.len()]);
        let rule = progressive_rule();
        let input = CalculationInput::new(BTreeMap::from([
            ("basic".to_string(), Decimal::from(monthly_base)),
        ]));

        let result = calculator().calculate_rule(&rule, &bands, &input);

        // reference walk computed a different way: clamp income into each
        // band and accumulate
        let annual = Decimal::from(monthly_base) * dec!(12);
        let mut expected = Decimal::ZERO;
        for band in &bands {
            let upper = band.upper_limit.unwrap_or(annual);
            let taxable = (annual.min(upper) - band.lower_limit).max(Decimal::ZERO);
            expected += taxable * band.rate;
        }

        prop_assert_eq!(result.amount, round_half_up(expected / dec!(12)));
    }

    #[test]
    fn malformed_bands_never_produce_nonzero_amount(
        widths in prop::collection::vec(1u32..500_000, 2..6),
        rates in prop::collection::vec(1u8..=45, 6),
        monthly_base in 1u64..2_000_000,
        gap in 1u32..1_000,
    ) {
        let mut bands = bands_from(&widths, &rates[..widths.len()]);
        // break contiguity: shift the second band's lower limit into a gap
        bands[1].lower_limit += Decimal::from(gap);

        let rule = progressive_rule();
        let input = CalculationInput::new(BTreeMap::from([
            ("basic".to_string(), Decimal::from(monthly_base)),
        ]));

        let result = calculator().calculate_rule(&rule, &bands, &input);

        prop_assert!(!result.is_applicable);
        prop_assert_eq!(result.amount, Decimal::ZERO);
        prop_assert!(result.skip_reason.is_some());
    }

    #[test]
    fn empty_band_list_never_produces_nonzero_amount(
        monthly_base in 0u64..2_000_000,
    ) {
        let rule = progressive_rule();
        let input = CalculationInput::new(BTreeMap::from([
            ("basic".to_string(), Decimal::from(monthly_base)),
        ]));

        let result = calculator().calculate_rule(&rule, &[], &input);

        prop_assert!(!result.is_applicable);
        prop_assert_eq!(result.amount, Decimal::ZERO);
    }
}
