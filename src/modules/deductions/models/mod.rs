mod deduction_result;
mod payroll_result;

pub use deduction_result::{DeductionResult, DeductionResultResponse};
pub use payroll_result::{PayrollDeductionsResponse, PayrollDeductionsResult};
