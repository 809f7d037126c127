use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::modules::rules::models::{Applicability, DeductionRule, DeductionType};

/// Outcome of evaluating one rule for one employee
///
/// Ephemeral and immutable once built; "rule not found" and "not eligible"
/// are represented here as non-applicable results, never as errors, so the
/// payroll builder can iterate rules uniformly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeductionResult {
    pub rule_code: String,
    pub rule_name: String,
    pub deduction_type: DeductionType,
    pub applicability: Applicability,
    pub amount: Decimal,
    pub is_applicable: bool,
    pub skip_reason: Option<String>,
    /// Audit trail: method used, base, rate, band breakdown, warnings
    pub calc_details: Map<String, Value>,
}

impl DeductionResult {
    /// Non-applicable result for a rule we could resolve
    pub fn skipped(rule: &DeductionRule, reason: impl Into<String>) -> Self {
        Self {
            rule_code: rule.code.clone(),
            rule_name: rule.name.clone(),
            deduction_type: rule.deduction_type,
            applicability: rule.applicability,
            amount: Decimal::ZERO,
            is_applicable: false,
            skip_reason: Some(reason.into()),
            calc_details: Map::new(),
        }
    }

    /// Non-applicable result when no rule version exists for the date
    pub fn not_found(rule_code: impl Into<String>, reason: impl Into<String>) -> Self {
        let rule_code = rule_code.into();
        Self {
            rule_name: rule_code.clone(),
            rule_code,
            deduction_type: DeductionType::Other,
            applicability: Applicability::Employee,
            amount: Decimal::ZERO,
            is_applicable: false,
            skip_reason: Some(reason.into()),
            calc_details: Map::new(),
        }
    }

    /// Convert to serialization DTO with exact decimal-string amounts
    pub fn to_response(&self) -> DeductionResultResponse {
        DeductionResultResponse {
            code: self.rule_code.clone(),
            name: self.rule_name.clone(),
            deduction_type: self.deduction_type.to_string(),
            amount: self.amount.to_string(),
            skip_reason: self.skip_reason.clone(),
            details: self.calc_details.clone(),
        }
    }
}

/// Serialized form consumed by the HTTP layer or payroll-slip writer
///
/// Monetary fields are decimal strings, never binary floating point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeductionResultResponse {
    pub code: String,
    pub name: String,
    #[serde(rename = "type")]
    pub deduction_type: String,
    pub amount: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<String>,
    pub details: Map<String, Value>,
}
