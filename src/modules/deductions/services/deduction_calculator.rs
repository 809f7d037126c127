use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{json, Map, Value};
use tracing::warn;

use crate::core::money::{clamp_to_range, round_half_up};
use crate::core::Result;
use crate::modules::deductions::models::DeductionResult;
use crate::modules::deductions::services::base_resolver::BaseAmountResolver;
use crate::modules::deductions::services::eligibility_filter::EligibilityFilter;
use crate::modules::rules::models::{validate_bands, CalcMethod, DeductionRule, TaxBand};
use crate::modules::rules::repositories::RuleRepository;

/// Per-employee inputs to a single rule evaluation
#[derive(Debug, Clone)]
pub struct CalculationInput {
    pub components: BTreeMap<String, Decimal>,
    pub employment_type: Option<String>,
    pub months_of_service: u32,
    /// Annualize the base for progressive band evaluation; callers supply
    /// an already-annual base by disabling this
    pub annualize: bool,
}

impl CalculationInput {
    pub fn new(components: BTreeMap<String, Decimal>) -> Self {
        Self {
            components,
            employment_type: None,
            months_of_service: 0,
            annualize: true,
        }
    }
}

/// Evaluates one rule end-to-end: eligibility, base resolution, method
/// dispatch, floor/cap clamping, final rounding
pub struct DeductionCalculator {
    repository: Arc<dyn RuleRepository>,
    annualization_factor: Decimal,
    eligibility: EligibilityFilter,
    resolver: BaseAmountResolver,
}

impl DeductionCalculator {
    pub fn new(repository: Arc<dyn RuleRepository>, annualization_factor: Decimal) -> Self {
        Self {
            repository,
            annualization_factor,
            eligibility: EligibilityFilter::new(),
            resolver: BaseAmountResolver::new(),
        }
    }

    /// Calculate a single rule by code (rate-preview / testing entrypoint)
    ///
    /// Never errors for "rule not found" or "not eligible"; both become a
    /// non-applicable result carrying the reason.
    pub async fn calculate(
        &self,
        region_code: &str,
        rule_code: &str,
        input: &CalculationInput,
        as_of: NaiveDate,
    ) -> Result<DeductionResult> {
        let rule = match self
            .repository
            .find_rule(region_code, rule_code, as_of)
            .await?
        {
            Some(rule) => rule,
            None => {
                return Ok(DeductionResult::not_found(
                    rule_code,
                    format!(
                        "rule {} not found for region {} as of {}",
                        rule_code, region_code, as_of
                    ),
                ))
            }
        };

        let bands = match rule.calc_method {
            CalcMethod::Progressive { .. } => self.repository.bands_for_rule(rule.id).await?,
            _ => Vec::new(),
        };

        Ok(self.calculate_rule(&rule, &bands, input))
    }

    /// Pure per-rule evaluation over already-resolved configuration
    pub fn calculate_rule(
        &self,
        rule: &DeductionRule,
        bands: &[TaxBand],
        input: &CalculationInput,
    ) -> DeductionResult {
        if let Some(reason) =
            self.eligibility
                .check(rule, input.employment_type.as_deref(), input.months_of_service)
        {
            return DeductionResult::skipped(rule, reason);
        }

        let mut details = Map::new();
        details.insert("method".to_string(), json!(rule.calc_method.name()));

        // Exhaustive dispatch: adding a method must break compilation here
        let raw_amount = match &rule.calc_method {
            CalcMethod::Flat { amount } => {
                details.insert("flat_amount".to_string(), decimal_value(*amount));
                *amount
            }
            CalcMethod::Percentage { rate, base_components } => {
                let base = self.resolved_base(rule, base_components, input, &mut details);
                details.insert("rate".to_string(), decimal_value(*rate));
                base * rate
            }
            CalcMethod::Progressive { base_components } => {
                let base = self.resolved_base(rule, base_components, input, &mut details);
                match self.progressive_amount(rule, bands, base, input.annualize, &mut details) {
                    Ok(amount) => amount,
                    Err(reason) => {
                        warn!(
                            rule_code = %rule.code,
                            region = %rule.region_code,
                            %reason,
                            "progressive rule misconfigured, returning zero"
                        );
                        details.insert("warning".to_string(), json!(reason));
                        let mut result = DeductionResult::skipped(rule, reason);
                        result.calc_details = details;
                        return result;
                    }
                }
            }
        };

        let amount = round_half_up(clamp_to_range(
            raw_amount,
            rule.floor_amount,
            rule.cap_amount,
        ));

        DeductionResult {
            rule_code: rule.code.clone(),
            rule_name: rule.name.clone(),
            deduction_type: rule.deduction_type,
            applicability: rule.applicability,
            amount,
            is_applicable: true,
            skip_reason: None,
            calc_details: details,
        }
    }

    /// Base resolution plus min/max clamping, recorded in the audit trail
    fn resolved_base(
        &self,
        rule: &DeductionRule,
        patterns: &[String],
        input: &CalculationInput,
        details: &mut Map<String, Value>,
    ) -> Decimal {
        let resolved = self.resolver.resolve_base(patterns, &input.components);
        let clamped = clamp_to_range(resolved, rule.min_base, rule.max_base);

        details.insert("base".to_string(), decimal_value(clamped));
        if clamped != resolved {
            details.insert("unclamped_base".to_string(), decimal_value(resolved));
        }

        clamped
    }

    /// Walk the ordered bands over the annualized base
    ///
    /// Per-band contributions accumulate at full precision; the only
    /// rounding happens on the caller's final amount. Returns the reason
    /// string when the band configuration is invalid.
    fn progressive_amount(
        &self,
        rule: &DeductionRule,
        bands: &[TaxBand],
        base: Decimal,
        annualize: bool,
        details: &mut Map<String, Value>,
    ) -> std::result::Result<Decimal, String> {
        validate_bands(bands).map_err(|reason| format!("rule {}: {}", rule.code, reason))?;

        let factor = if annualize {
            self.annualization_factor
        } else {
            Decimal::ONE
        };
        let annual_base = base * factor;
        details.insert("annualized_base".to_string(), decimal_value(annual_base));

        let mut annual_tax = Decimal::ZERO;
        let mut band_details = Vec::new();

        for band in bands {
            let upper = band.upper_limit.unwrap_or(annual_base);
            let slice = upper.min(annual_base) - band.lower_limit;
            if slice <= Decimal::ZERO {
                continue;
            }

            let band_tax = slice * band.rate;
            annual_tax += band_tax;

            band_details.push(json!({
                "lower": band.lower_limit.to_string(),
                "upper": band.upper_limit.map(|u| u.to_string()),
                "rate": band.rate.to_string(),
                "taxable": slice.to_string(),
                "tax": band_tax.to_string(),
            }));
        }

        details.insert("bands".to_string(), Value::Array(band_details));
        details.insert("annual_tax".to_string(), decimal_value(annual_tax));

        Ok(annual_tax / factor)
    }
}

fn decimal_value(value: Decimal) -> Value {
    Value::String(value.to_string())
}
