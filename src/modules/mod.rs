pub mod deductions;
pub mod regions;
pub mod rules;
