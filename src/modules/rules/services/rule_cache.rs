use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use tracing::debug;

use crate::core::error::AppError;
use crate::modules::regions::models::Region;
use crate::modules::rules::models::{DeductionRule, TaxBand};
use crate::modules::rules::repositories::rule_repository::RuleRepository;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CacheKey {
    Region(String),
    Rule(String, String, NaiveDate),
    ActiveRules(String, NaiveDate),
    Bands(i64),
}

#[derive(Clone)]
enum CacheValue {
    Region(Option<Region>),
    Rule(Option<DeductionRule>),
    Rules(Vec<DeductionRule>),
    Bands(Vec<TaxBand>),
}

struct CacheEntry {
    stored_at: Instant,
    value: CacheValue,
}

/// TTL cache over any [`RuleRepository`]
///
/// Entries are advisory: configuration for past dates is append-only
/// versioned, so a stale entry within its TTL is still correct for any
/// historical as-of date. Entries are replaced whole under the write lock;
/// two tasks racing to repopulate an expired key at worst perform
/// redundant identical reads, never a partial entry.
pub struct CachedRuleRepository {
    inner: Arc<dyn RuleRepository>,
    ttl: Duration,
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
}

impl CachedRuleRepository {
    pub fn new(inner: Arc<dyn RuleRepository>, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    async fn lookup(&self, key: &CacheKey) -> Option<CacheValue> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        if entry.stored_at.elapsed() >= self.ttl {
            return None;
        }
        Some(entry.value.clone())
    }

    async fn store(&self, key: CacheKey, value: CacheValue) {
        let mut entries = self.entries.write().await;
        entries.insert(
            key,
            CacheEntry {
                stored_at: Instant::now(),
                value,
            },
        );
    }

    /// Drop all cached entries; configuration tooling calls this after an
    /// out-of-band change that must be visible before TTL expiry
    pub async fn invalidate_all(&self) {
        self.entries.write().await.clear();
    }
}

#[async_trait]
impl RuleRepository for CachedRuleRepository {
    async fn find_region(&self, code: &str) -> Result<Option<Region>, AppError> {
        let key = CacheKey::Region(code.to_string());
        if let Some(CacheValue::Region(region)) = self.lookup(&key).await {
            debug!(code, "region cache hit");
            return Ok(region);
        }

        let region = self.inner.find_region(code).await?;
        self.store(key, CacheValue::Region(region.clone())).await;
        Ok(region)
    }

    async fn find_rule(
        &self,
        region_code: &str,
        rule_code: &str,
        as_of: NaiveDate,
    ) -> Result<Option<DeductionRule>, AppError> {
        let key = CacheKey::Rule(region_code.to_string(), rule_code.to_string(), as_of);
        if let Some(CacheValue::Rule(rule)) = self.lookup(&key).await {
            debug!(region_code, rule_code, "rule cache hit");
            return Ok(rule);
        }

        let rule = self.inner.find_rule(region_code, rule_code, as_of).await?;
        self.store(key, CacheValue::Rule(rule.clone())).await;
        Ok(rule)
    }

    async fn active_rules(
        &self,
        region_code: &str,
        as_of: NaiveDate,
    ) -> Result<Vec<DeductionRule>, AppError> {
        let key = CacheKey::ActiveRules(region_code.to_string(), as_of);
        if let Some(CacheValue::Rules(rules)) = self.lookup(&key).await {
            debug!(region_code, "active rules cache hit");
            return Ok(rules);
        }

        let rules = self.inner.active_rules(region_code, as_of).await?;
        self.store(key, CacheValue::Rules(rules.clone())).await;
        Ok(rules)
    }

    async fn bands_for_rule(&self, rule_id: i64) -> Result<Vec<TaxBand>, AppError> {
        let key = CacheKey::Bands(rule_id);
        if let Some(CacheValue::Bands(bands)) = self.lookup(&key).await {
            return Ok(bands);
        }

        let bands = self.inner.bands_for_rule(rule_id).await?;
        self.store(key, CacheValue::Bands(bands.clone())).await;
        Ok(bands)
    }
}
