pub mod rule_cache;

pub use rule_cache::CachedRuleRepository;
