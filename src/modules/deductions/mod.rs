// Deductions module: per-rule evaluation and payroll aggregation

pub mod models;
pub mod services;

pub use models::{DeductionResult, PayrollDeductionsResult};
pub use services::{
    BaseAmountResolver, CalculationInput, DeductionCalculator, EligibilityFilter, PayrollBuilder,
    PayrollRequest,
};
