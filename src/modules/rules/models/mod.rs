mod deduction_rule;
mod tax_band;

pub use deduction_rule::{
    Applicability, CalcMethod, DeductionRule, DeductionRuleRow, DeductionType,
};
pub use tax_band::{validate_bands, TaxBand};
