use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

use crate::core::{AppError, Result};

/// Kind of deduction; informational only and must never change behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR(20)", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DeductionType {
    Tax,
    Pension,
    Insurance,
    Levy,
    Other,
}

impl fmt::Display for DeductionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeductionType::Tax => "tax",
            DeductionType::Pension => "pension",
            DeductionType::Insurance => "insurance",
            DeductionType::Levy => "levy",
            DeductionType::Other => "other",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for DeductionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tax" => Ok(DeductionType::Tax),
            "pension" => Ok(DeductionType::Pension),
            "insurance" => Ok(DeductionType::Insurance),
            "levy" => Ok(DeductionType::Levy),
            "other" => Ok(DeductionType::Other),
            _ => Err(format!("Invalid deduction type: {}", s)),
        }
    }
}

/// Who bears the cost of a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR(10)", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Applicability {
    Employee,
    Employer,
    Both,
}

impl fmt::Display for Applicability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Applicability::Employee => "employee",
            Applicability::Employer => "employer",
            Applicability::Both => "both",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for Applicability {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "employee" => Ok(Applicability::Employee),
            "employer" => Ok(Applicability::Employer),
            "both" => Ok(Applicability::Both),
            _ => Err(format!("Invalid applicability: {}", s)),
        }
    }
}

/// Calculation method, closed over the three supported shapes
///
/// A tagged enum rather than a string field so that adding a method forces
/// every match site to handle it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum CalcMethod {
    Flat {
        amount: Decimal,
    },
    Percentage {
        rate: Decimal,
        /// Component-name patterns the base is resolved from; empty = whole gross
        base_components: Vec<String>,
    },
    Progressive {
        base_components: Vec<String>,
    },
}

impl CalcMethod {
    pub fn name(&self) -> &'static str {
        match self {
            CalcMethod::Flat { .. } => "flat",
            CalcMethod::Percentage { .. } => "percentage",
            CalcMethod::Progressive { .. } => "progressive",
        }
    }

    /// Patterns the base-amount resolver matches against; empty for flat
    pub fn base_component_patterns(&self) -> &[String] {
        match self {
            CalcMethod::Flat { .. } => &[],
            CalcMethod::Percentage { base_components, .. } => base_components,
            CalcMethod::Progressive { base_components } => base_components,
        }
    }
}

/// A single configured deduction/contribution rule for a region
///
/// Long-lived configuration, created and versioned out-of-band via
/// `effective_from`/`effective_to`; the engine only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeductionRule {
    pub id: i64,
    pub region_code: String,
    /// Stable code, unique per region
    pub code: String,
    pub name: String,
    pub deduction_type: DeductionType,
    /// Drives the only-statutory filter; deduction_type is informational
    pub is_statutory: bool,
    pub applicability: Applicability,
    pub calc_method: CalcMethod,
    /// Clamp the base before rate application
    pub min_base: Option<Decimal>,
    pub max_base: Option<Decimal>,
    /// Clamp the final amount
    pub floor_amount: Option<Decimal>,
    pub cap_amount: Option<Decimal>,
    /// Required when applicability = both; must sum to exactly 1
    pub employee_share: Option<Decimal>,
    pub employer_share: Option<Decimal>,
    /// Allow-list of employment types; empty = applies to all
    pub employment_types: Vec<String>,
    pub min_service_months: u32,
    pub effective_from: NaiveDate,
    /// None = open-ended
    pub effective_to: Option<NaiveDate>,
    pub is_active: bool,
    pub display_order: i32,
}

impl DeductionRule {
    /// Whether this rule version is in force on the given date
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.is_active
            && self.effective_from <= date
            && self.effective_to.map_or(true, |to| to >= date)
    }

    /// Employee/employer share pair for a `both` rule
    ///
    /// Only meaningful when `applicability == Both`; validation guarantees
    /// both shares are present and sum to exactly 1 by the time a rule is
    /// returned from any repository.
    pub fn shares(&self) -> (Decimal, Decimal) {
        (
            self.employee_share.unwrap_or(Decimal::ONE),
            self.employer_share.unwrap_or(Decimal::ZERO),
        )
    }

    /// Validate rule configuration
    ///
    /// Repositories must refuse to return a rule that fails this check, so
    /// an invalid share split can never silently misallocate cost.
    pub fn validate(&self) -> Result<()> {
        if self.code.trim().is_empty() {
            return Err(AppError::validation("Rule code cannot be empty"));
        }

        if self.applicability == Applicability::Both {
            let (employee, employer) = match (self.employee_share, self.employer_share) {
                (Some(a), Some(b)) => (a, b),
                _ => {
                    return Err(AppError::validation(format!(
                        "Rule {}: applicability 'both' requires employee_share and employer_share",
                        self.code
                    )))
                }
            };

            if employee < Decimal::ZERO || employer < Decimal::ZERO {
                return Err(AppError::validation(format!(
                    "Rule {}: shares cannot be negative",
                    self.code
                )));
            }

            if employee + employer != Decimal::ONE {
                return Err(AppError::validation(format!(
                    "Rule {}: employee_share + employer_share must equal 1, got {}",
                    self.code,
                    employee + employer
                )));
            }
        }

        if let (Some(min), Some(max)) = (self.min_base, self.max_base) {
            if min > max {
                return Err(AppError::validation(format!(
                    "Rule {}: min_base {} exceeds max_base {}",
                    self.code, min, max
                )));
            }
        }

        if let CalcMethod::Percentage { rate, .. } = &self.calc_method {
            if *rate < Decimal::ZERO {
                return Err(AppError::validation(format!(
                    "Rule {}: rate cannot be negative",
                    self.code
                )));
            }
        }

        Ok(())
    }
}

/// Raw storage row for a deduction rule
///
/// Method parameters live in nullable columns and JSON-array strings; the
/// `TryFrom` conversion is the single place a row becomes a typed rule,
/// and it rejects rows that violate the configuration invariants.
#[derive(Debug, Clone, FromRow)]
pub struct DeductionRuleRow {
    pub id: i64,
    pub region_code: String,
    pub code: String,
    pub name: String,
    pub deduction_type: String,
    pub is_statutory: bool,
    pub applicability: String,
    pub calc_method: String,
    pub flat_amount: Option<Decimal>,
    pub rate: Option<Decimal>,
    /// JSON array of component-name patterns
    pub base_components: Option<String>,
    pub min_base: Option<Decimal>,
    pub max_base: Option<Decimal>,
    pub floor_amount: Option<Decimal>,
    pub cap_amount: Option<Decimal>,
    pub employee_share: Option<Decimal>,
    pub employer_share: Option<Decimal>,
    /// JSON array of allowed employment types
    pub employment_types: Option<String>,
    pub min_service_months: i32,
    pub effective_from: NaiveDate,
    pub effective_to: Option<NaiveDate>,
    pub is_active: bool,
    pub display_order: i32,
}

fn parse_string_list(column: &str, value: Option<&str>) -> Result<Vec<String>> {
    match value {
        None => Ok(Vec::new()),
        Some(raw) if raw.trim().is_empty() => Ok(Vec::new()),
        Some(raw) => serde_json::from_str(raw).map_err(|e| {
            AppError::validation(format!("Invalid JSON in {}: {}", column, e))
        }),
    }
}

impl TryFrom<DeductionRuleRow> for DeductionRule {
    type Error = AppError;

    fn try_from(row: DeductionRuleRow) -> Result<Self> {
        let deduction_type: DeductionType = row
            .deduction_type
            .parse()
            .map_err(AppError::Validation)?;
        let applicability: Applicability =
            row.applicability.parse().map_err(AppError::Validation)?;

        let base_components = parse_string_list("base_components", row.base_components.as_deref())?;
        let employment_types =
            parse_string_list("employment_types", row.employment_types.as_deref())?;

        let calc_method = match row.calc_method.to_lowercase().as_str() {
            "flat" => CalcMethod::Flat {
                amount: row.flat_amount.ok_or_else(|| {
                    AppError::validation(format!("Rule {}: flat method requires flat_amount", row.code))
                })?,
            },
            "percentage" => CalcMethod::Percentage {
                rate: row.rate.ok_or_else(|| {
                    AppError::validation(format!("Rule {}: percentage method requires rate", row.code))
                })?,
                base_components,
            },
            "progressive" => CalcMethod::Progressive { base_components },
            other => {
                return Err(AppError::validation(format!(
                    "Rule {}: unknown calc method '{}'",
                    row.code, other
                )))
            }
        };

        if row.min_service_months < 0 {
            return Err(AppError::validation(format!(
                "Rule {}: min_service_months cannot be negative",
                row.code
            )));
        }

        let rule = DeductionRule {
            id: row.id,
            region_code: row.region_code,
            code: row.code,
            name: row.name,
            deduction_type,
            is_statutory: row.is_statutory,
            applicability,
            calc_method,
            min_base: row.min_base,
            max_base: row.max_base,
            floor_amount: row.floor_amount,
            cap_amount: row.cap_amount,
            employee_share: row.employee_share,
            employer_share: row.employer_share,
            employment_types,
            min_service_months: row.min_service_months as u32,
            effective_from: row.effective_from,
            effective_to: row.effective_to,
            is_active: row.is_active,
            display_order: row.display_order,
        };

        rule.validate()?;

        Ok(rule)
    }
}
