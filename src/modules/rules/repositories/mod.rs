pub mod in_memory;
pub mod rule_repository;

pub use in_memory::InMemoryRuleRepository;
pub use rule_repository::{MySqlRuleRepository, RuleRepository};
