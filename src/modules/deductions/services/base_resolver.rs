use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::core::normalize::loose_contains;

/// Maps a rule's component-name patterns onto the supplied salary
/// components to produce the monetary base for a percentage or
/// progressive calculation
///
/// Matching is deliberately permissive (case-insensitive substring in
/// either direction) because component names vary across payroll
/// configurations: "Housing Allowance" must match the pattern "housing".
pub struct BaseAmountResolver;

impl BaseAmountResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolve the base amount
    ///
    /// No patterns = whole-gross basis (sum of every component). A
    /// component matching any pattern contributes its full value exactly
    /// once, however many patterns it matches.
    pub fn resolve_base(
        &self,
        patterns: &[String],
        components: &BTreeMap<String, Decimal>,
    ) -> Decimal {
        if patterns.is_empty() {
            return components.values().copied().sum();
        }

        components
            .iter()
            .filter(|(name, _)| patterns.iter().any(|p| loose_contains(name, p)))
            .map(|(_, amount)| *amount)
            .sum()
    }
}

impl Default for BaseAmountResolver {
    fn default() -> Self {
        Self::new()
    }
}
