use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::MySqlPool;

use crate::core::error::AppError;
use crate::modules::regions::models::Region;
use crate::modules::rules::models::{DeductionRule, DeductionRuleRow, TaxBand};

/// Read-side contract against the configuration store
///
/// The engine's only external dependency. A rule is "active as of" a date
/// when its `is_active` flag is set, `effective_from <= date` and
/// `effective_to` is null or `>= date`; configuration for past dates is
/// append-only versioned, so repeated reads for a historical date always
/// agree.
#[async_trait]
pub trait RuleRepository: Send + Sync {
    /// Look up a region by code
    async fn find_region(&self, code: &str) -> Result<Option<Region>, AppError>;

    /// Look up one rule by code, restricted to versions active as of the date
    async fn find_rule(
        &self,
        region_code: &str,
        rule_code: &str,
        as_of: NaiveDate,
    ) -> Result<Option<DeductionRule>, AppError>;

    /// All rules active for the region as of the date, ordered by
    /// `display_order` then `code` for reproducible breakdowns
    async fn active_rules(
        &self,
        region_code: &str,
        as_of: NaiveDate,
    ) -> Result<Vec<DeductionRule>, AppError>;

    /// Ordered band list for a progressive rule
    async fn bands_for_rule(&self, rule_id: i64) -> Result<Vec<TaxBand>, AppError>;
}

pub struct MySqlRuleRepository {
    pool: MySqlPool,
}

impl MySqlRuleRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RuleRepository for MySqlRuleRepository {
    async fn find_region(&self, code: &str) -> Result<Option<Region>, AppError> {
        let region = sqlx::query_as::<_, Region>(
            r#"
            SELECT code, name, currency, pay_frequency, fiscal_year_start_month, is_active
            FROM regions
            WHERE code = ? AND is_active = TRUE
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(region)
    }

    async fn find_rule(
        &self,
        region_code: &str,
        rule_code: &str,
        as_of: NaiveDate,
    ) -> Result<Option<DeductionRule>, AppError> {
        let row = sqlx::query_as::<_, DeductionRuleRow>(
            r#"
            SELECT id, region_code, code, name, deduction_type, is_statutory,
                   applicability, calc_method, flat_amount, rate, base_components,
                   min_base, max_base, floor_amount, cap_amount,
                   employee_share, employer_share, employment_types,
                   min_service_months, effective_from, effective_to,
                   is_active, display_order
            FROM deduction_rules
            WHERE region_code = ? AND code = ? AND is_active = TRUE
              AND effective_from <= ?
              AND (effective_to IS NULL OR effective_to >= ?)
            ORDER BY effective_from DESC
            LIMIT 1
            "#,
        )
        .bind(region_code)
        .bind(rule_code)
        .bind(as_of)
        .bind(as_of)
        .fetch_optional(&self.pool)
        .await?;

        row.map(DeductionRule::try_from).transpose()
    }

    async fn active_rules(
        &self,
        region_code: &str,
        as_of: NaiveDate,
    ) -> Result<Vec<DeductionRule>, AppError> {
        let rows = sqlx::query_as::<_, DeductionRuleRow>(
            r#"
            SELECT id, region_code, code, name, deduction_type, is_statutory,
                   applicability, calc_method, flat_amount, rate, base_components,
                   min_base, max_base, floor_amount, cap_amount,
                   employee_share, employer_share, employment_types,
                   min_service_months, effective_from, effective_to,
                   is_active, display_order
            FROM deduction_rules
            WHERE region_code = ? AND is_active = TRUE
              AND effective_from <= ?
              AND (effective_to IS NULL OR effective_to >= ?)
            ORDER BY display_order, code
            "#,
        )
        .bind(region_code)
        .bind(as_of)
        .bind(as_of)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(DeductionRule::try_from).collect()
    }

    async fn bands_for_rule(&self, rule_id: i64) -> Result<Vec<TaxBand>, AppError> {
        let bands = sqlx::query_as::<_, TaxBand>(
            r#"
            SELECT id, rule_id, lower_limit, upper_limit, rate, band_order
            FROM tax_bands
            WHERE rule_id = ?
            ORDER BY band_order
            "#,
        )
        .bind(rule_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(bands)
    }
}
