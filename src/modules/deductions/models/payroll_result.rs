use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::deduction_result::{DeductionResult, DeductionResultResponse};

/// Aggregated outcome of one payroll builder invocation
///
/// Ephemeral; persisting it onto a payroll slip or ledger is the caller's
/// responsibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollDeductionsResult {
    pub region_code: String,
    /// Sum of all supplied salary components
    pub gross_pay: Decimal,
    pub employee_deductions: Vec<DeductionResult>,
    pub employer_contributions: Vec<DeductionResult>,
    pub total_employee_deductions: Decimal,
    pub total_employer_contributions: Decimal,
    pub net_pay: Decimal,
    pub calc_date: NaiveDate,
    /// Rules that did not contribute (ineligible, not effective, zero
    /// amount, misconfigured), kept for the audit trail
    pub skipped: Vec<DeductionResult>,
}

impl PayrollDeductionsResult {
    /// Convert to serialization DTO with exact decimal-string amounts
    pub fn to_response(&self) -> PayrollDeductionsResponse {
        PayrollDeductionsResponse {
            region_code: self.region_code.clone(),
            gross_pay: self.gross_pay.to_string(),
            net_pay: self.net_pay.to_string(),
            total_employee_deductions: self.total_employee_deductions.to_string(),
            total_employer_contributions: self.total_employer_contributions.to_string(),
            calc_date: self.calc_date.to_string(),
            employee_deductions: self
                .employee_deductions
                .iter()
                .map(DeductionResult::to_response)
                .collect(),
            employer_contributions: self
                .employer_contributions
                .iter()
                .map(DeductionResult::to_response)
                .collect(),
            skipped: self.skipped.iter().map(DeductionResult::to_response).collect(),
        }
    }
}

/// Serialized payroll breakdown for downstream consumption
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollDeductionsResponse {
    pub region_code: String,
    pub gross_pay: String,
    pub net_pay: String,
    pub total_employee_deductions: String,
    pub total_employer_contributions: String,
    pub calc_date: String,
    pub employee_deductions: Vec<DeductionResultResponse>,
    pub employer_contributions: Vec<DeductionResultResponse>,
    pub skipped: Vec<DeductionResultResponse>,
}
