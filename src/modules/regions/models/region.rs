use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

use crate::core::{AppError, Result};

/// Default pay frequency for a jurisdiction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR(20)", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PayFrequency {
    Monthly,
    Weekly,
    Biweekly,
    Semimonthly,
}

impl fmt::Display for PayFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayFrequency::Monthly => write!(f, "monthly"),
            PayFrequency::Weekly => write!(f, "weekly"),
            PayFrequency::Biweekly => write!(f, "biweekly"),
            PayFrequency::Semimonthly => write!(f, "semimonthly"),
        }
    }
}

impl std::str::FromStr for PayFrequency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "monthly" => Ok(PayFrequency::Monthly),
            "weekly" => Ok(PayFrequency::Weekly),
            "biweekly" => Ok(PayFrequency::Biweekly),
            "semimonthly" => Ok(PayFrequency::Semimonthly),
            _ => Err(format!("Invalid pay frequency: {}", s)),
        }
    }
}

/// A jurisdiction the engine can calculate deductions for
///
/// Owned and mutated only by configuration tooling; the engine treats a
/// region as immutable for the duration of one calculation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Region {
    /// Stable jurisdiction code, e.g. "NG", "KE-01"
    pub code: String,
    pub name: String,
    /// ISO 4217 currency code; free-form because the engine is
    /// jurisdiction-agnostic and never converts between currencies
    pub currency: String,
    pub pay_frequency: PayFrequency,
    /// Month the fiscal year starts (1-12)
    pub fiscal_year_start_month: u32,
    pub is_active: bool,
}

impl Region {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            currency: currency.into(),
            pay_frequency: PayFrequency::Monthly,
            fiscal_year_start_month: 1,
            is_active: true,
        }
    }

    /// Validate region configuration
    pub fn validate(&self) -> Result<()> {
        if self.code.trim().is_empty() {
            return Err(AppError::validation("Region code cannot be empty"));
        }

        if !(1..=12).contains(&self.fiscal_year_start_month) {
            return Err(AppError::validation(format!(
                "Fiscal year start month must be 1-12, got: {}",
                self.fiscal_year_start_month
            )));
        }

        Ok(())
    }
}
