pub mod base_resolver;
pub mod deduction_calculator;
pub mod eligibility_filter;
pub mod payroll_builder;

pub use base_resolver::BaseAmountResolver;
pub use deduction_calculator::{CalculationInput, DeductionCalculator};
pub use eligibility_filter::EligibilityFilter;
pub use payroll_builder::{split_shared_amount, PayrollBuilder, PayrollRequest};
