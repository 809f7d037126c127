//! payrules — jurisdiction-agnostic payroll deduction calculation engine
//!
//! Given a map of named salary components and a configured set of
//! deduction/contribution rules for a region, computes every applicable
//! deduction (flat, percentage-of-base, or progressive marginal bands),
//! splits shared costs between employee and employer, and produces an
//! auditable breakdown plus net pay. Rule resolution is effective-dated
//! and cached; arithmetic is exact decimal with half-up rounding to cents
//! applied only to final per-rule amounts.

pub mod config;
pub mod core;
pub mod modules;

// Re-export commonly used types
pub use config::EngineConfig;
pub use core::{AppError, Result};
pub use modules::deductions::{
    CalculationInput, DeductionCalculator, DeductionResult, PayrollBuilder,
    PayrollDeductionsResult, PayrollRequest,
};
pub use modules::regions::Region;
pub use modules::rules::{
    Applicability, CachedRuleRepository, CalcMethod, DeductionRule, DeductionType,
    InMemoryRuleRepository, MySqlRuleRepository, RuleRepository, TaxBand,
};
