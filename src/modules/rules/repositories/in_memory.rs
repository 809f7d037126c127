use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::core::error::AppError;
use crate::modules::regions::models::Region;
use crate::modules::rules::models::{DeductionRule, TaxBand};
use crate::modules::rules::repositories::rule_repository::RuleRepository;

/// In-memory configuration store
///
/// Serves tests and embedding applications that load rule sets from
/// fixtures instead of MySQL. Fixtures go through the same `validate`
/// checks as database rows, so an invalid share split is rejected here too.
#[derive(Default)]
pub struct InMemoryRuleRepository {
    regions: Vec<Region>,
    rules: Vec<DeductionRule>,
    bands: HashMap<i64, Vec<TaxBand>>,
}

impl InMemoryRuleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_region(mut self, region: Region) -> Result<Self, AppError> {
        region.validate()?;
        self.regions.push(region);
        Ok(self)
    }

    pub fn with_rule(mut self, rule: DeductionRule) -> Result<Self, AppError> {
        rule.validate()?;
        self.rules.push(rule);
        Ok(self)
    }

    pub fn with_bands(mut self, rule_id: i64, mut bands: Vec<TaxBand>) -> Self {
        bands.sort_by_key(|b| b.band_order);
        self.bands.insert(rule_id, bands);
        self
    }
}

#[async_trait]
impl RuleRepository for InMemoryRuleRepository {
    async fn find_region(&self, code: &str) -> Result<Option<Region>, AppError> {
        Ok(self
            .regions
            .iter()
            .find(|r| r.code == code && r.is_active)
            .cloned())
    }

    async fn find_rule(
        &self,
        region_code: &str,
        rule_code: &str,
        as_of: NaiveDate,
    ) -> Result<Option<DeductionRule>, AppError> {
        Ok(self
            .rules
            .iter()
            .filter(|r| r.region_code == region_code && r.code == rule_code)
            .filter(|r| r.is_active_on(as_of))
            .max_by_key(|r| r.effective_from)
            .cloned())
    }

    async fn active_rules(
        &self,
        region_code: &str,
        as_of: NaiveDate,
    ) -> Result<Vec<DeductionRule>, AppError> {
        let mut rules: Vec<DeductionRule> = self
            .rules
            .iter()
            .filter(|r| r.region_code == region_code && r.is_active_on(as_of))
            .cloned()
            .collect();

        rules.sort_by(|a, b| {
            a.display_order
                .cmp(&b.display_order)
                .then_with(|| a.code.cmp(&b.code))
        });

        Ok(rules)
    }

    async fn bands_for_rule(&self, rule_id: i64) -> Result<Vec<TaxBand>, AppError> {
        Ok(self.bands.get(&rule_id).cloned().unwrap_or_default())
    }
}
