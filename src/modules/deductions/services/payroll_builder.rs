use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde_json::json;
use tracing::info;

use crate::config::EngineConfig;
use crate::core::money::round_half_up;
use crate::core::{AppError, Result};
use crate::modules::deductions::models::{DeductionResult, PayrollDeductionsResult};
use crate::modules::deductions::services::deduction_calculator::{
    CalculationInput, DeductionCalculator,
};
use crate::modules::rules::models::{Applicability, CalcMethod, DeductionRule};
use crate::modules::rules::repositories::RuleRepository;

/// One payroll calculation request
#[derive(Debug, Clone)]
pub struct PayrollRequest {
    /// Named salary components, e.g. {"basic": 500000, "housing": 100000}
    pub components: BTreeMap<String, Decimal>,
    pub employment_type: Option<String>,
    pub months_of_service: u32,
    /// Defaults to today
    pub calc_date: Option<NaiveDate>,
    pub only_statutory: bool,
}

impl PayrollRequest {
    pub fn new(components: BTreeMap<String, Decimal>) -> Self {
        Self {
            components,
            employment_type: None,
            months_of_service: 0,
            calc_date: None,
            only_statutory: false,
        }
    }
}

/// Composition root: iterates every active, eligible rule for a region and
/// date, classifies results by who bears the cost, aggregates totals and
/// computes net pay
pub struct PayrollBuilder {
    repository: Arc<dyn RuleRepository>,
    calculator: DeductionCalculator,
}

impl PayrollBuilder {
    pub fn new(repository: Arc<dyn RuleRepository>, config: &EngineConfig) -> Self {
        let calculator =
            DeductionCalculator::new(repository.clone(), config.annualization_factor);
        Self {
            repository,
            calculator,
        }
    }

    /// Single-rule preview entrypoint (rate-calculator use cases)
    pub fn calculator(&self) -> &DeductionCalculator {
        &self.calculator
    }

    /// Active rule set for introspection/configuration UIs
    pub async fn active_rules(
        &self,
        region_code: &str,
        as_of: NaiveDate,
    ) -> Result<Vec<DeductionRule>> {
        self.repository.active_rules(region_code, as_of).await
    }

    /// Calculate all deductions and contributions for one payroll slip
    pub async fn calculate_deductions(
        &self,
        region_code: &str,
        request: PayrollRequest,
    ) -> Result<PayrollDeductionsResult> {
        let region = self
            .repository
            .find_region(region_code)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Region {} not found", region_code)))?;

        let calc_date = request
            .calc_date
            .unwrap_or_else(|| Utc::now().date_naive());
        let gross_pay: Decimal = request.components.values().copied().sum();

        info!(
            region = %region.code,
            %calc_date,
            %gross_pay,
            only_statutory = request.only_statutory,
            "calculating payroll deductions"
        );

        let rules = self.repository.active_rules(region_code, calc_date).await?;

        let input = CalculationInput {
            components: request.components,
            employment_type: request.employment_type,
            months_of_service: request.months_of_service,
            annualize: true,
        };

        let mut employee_deductions = Vec::new();
        let mut employer_contributions = Vec::new();
        let mut skipped = Vec::new();

        for rule in rules {
            if request.only_statutory && !rule.is_statutory {
                continue;
            }

            let bands = match rule.calc_method {
                CalcMethod::Progressive { .. } => {
                    self.repository.bands_for_rule(rule.id).await?
                }
                _ => Vec::new(),
            };

            let result = self.calculator.calculate_rule(&rule, &bands, &input);

            if !result.is_applicable || result.amount == Decimal::ZERO {
                skipped.push(result);
                continue;
            }

            match rule.applicability {
                Applicability::Employee => employee_deductions.push(result),
                Applicability::Employer => employer_contributions.push(result),
                Applicability::Both => {
                    let (employee_result, employer_result) = Self::split_result(&rule, result);
                    employee_deductions.push(employee_result);
                    employer_contributions.push(employer_result);
                }
            }
        }

        let total_employee_deductions: Decimal =
            employee_deductions.iter().map(|d| d.amount).sum();
        let total_employer_contributions: Decimal =
            employer_contributions.iter().map(|d| d.amount).sum();
        let net_pay = gross_pay - total_employee_deductions;

        Ok(PayrollDeductionsResult {
            region_code: region.code,
            gross_pay,
            employee_deductions,
            employer_contributions,
            total_employee_deductions,
            total_employer_contributions,
            net_pay,
            calc_date,
            skipped,
        })
    }

    /// Split a shared-cost result into employee and employer sides
    ///
    /// The employer side carries the remainder so the two always sum back
    /// to the computed total exactly.
    fn split_result(
        rule: &DeductionRule,
        result: DeductionResult,
    ) -> (DeductionResult, DeductionResult) {
        let (employee_share, employer_share) = rule.shares();
        let total = result.amount;
        let (employee_amount, employer_amount) = split_shared_amount(total, employee_share);

        let mut employee_result = result.clone();
        employee_result.amount = employee_amount;
        employee_result
            .calc_details
            .insert("total_amount".to_string(), json!(total.to_string()));
        employee_result.calc_details.insert(
            "employee_share".to_string(),
            json!(employee_share.to_string()),
        );

        let mut employer_result = result;
        employer_result.rule_code = format!("{}_ER", rule.code);
        employer_result.rule_name = format!("{} (Employer)", rule.name);
        employer_result.amount = employer_amount;
        employer_result
            .calc_details
            .insert("total_amount".to_string(), json!(total.to_string()));
        employer_result.calc_details.insert(
            "employer_share".to_string(),
            json!(employer_share.to_string()),
        );

        (employee_result, employer_result)
    }
}

/// Splits a total into (employee, employer) portions
///
/// The employee portion is rounded half-up; the employer portion is the
/// remainder, never an independently rounded multiplication, so
/// `employee + employer == total` holds for every input.
pub fn split_shared_amount(total: Decimal, employee_share: Decimal) -> (Decimal, Decimal) {
    let employee_amount = round_half_up(total * employee_share);
    (employee_amount, total - employee_amount)
}
