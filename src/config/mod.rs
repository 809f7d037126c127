use std::env;
use std::time::Duration;

use rust_decimal::Decimal;

use crate::core::{AppError, Result};

/// Engine configuration
///
/// Loaded once at startup by the embedding application and shared with the
/// payroll builder and the repository cache.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Time-to-live for cached configuration reads
    pub cache_ttl: Duration,
    /// Periods per year used to annualize a per-period base for
    /// progressive band evaluation (12 for monthly payroll)
    pub annualization_factor: Decimal,
}

impl EngineConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let cache_ttl_secs: u64 = env::var("PAYRULES_CACHE_TTL_SECS")
            .unwrap_or_else(|_| "300".to_string())
            .parse()
            .map_err(|_| AppError::Configuration("Invalid PAYRULES_CACHE_TTL_SECS".to_string()))?;

        let annualization_factor: Decimal = env::var("PAYRULES_ANNUALIZATION_FACTOR")
            .unwrap_or_else(|_| "12".to_string())
            .parse()
            .map_err(|_| {
                AppError::Configuration("Invalid PAYRULES_ANNUALIZATION_FACTOR".to_string())
            })?;

        let config = EngineConfig {
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            annualization_factor,
        };
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.annualization_factor <= Decimal::ZERO {
            return Err(AppError::Configuration(
                "Annualization factor must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(300),
            annualization_factor: Decimal::from(12),
        }
    }
}
