// Rules module: deduction rule configuration read path

pub mod models;
pub mod repositories;
pub mod services;

pub use models::{Applicability, CalcMethod, DeductionRule, DeductionType, TaxBand};
pub use repositories::{InMemoryRuleRepository, MySqlRuleRepository, RuleRepository};
pub use services::CachedRuleRepository;
