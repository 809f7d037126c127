use crate::core::normalize::normalize_token;
use crate::modules::rules::models::DeductionRule;

/// Decides whether a rule applies to an employment context at all
///
/// Runs before any monetary work; an ineligible rule produces a
/// zero-effort, zero-amount result and never appears in totals.
pub struct EligibilityFilter;

impl EligibilityFilter {
    pub fn new() -> Self {
        Self
    }

    /// Returns None when eligible, or the skip reason
    pub fn check(
        &self,
        rule: &DeductionRule,
        employment_type: Option<&str>,
        months_of_service: u32,
    ) -> Option<String> {
        if !rule.employment_types.is_empty() {
            let allowed: Vec<String> = rule
                .employment_types
                .iter()
                .map(|t| normalize_token(t))
                .collect();

            let supplied = employment_type.map(normalize_token);
            let is_member = supplied
                .as_ref()
                .map(|t| allowed.contains(t))
                .unwrap_or(false);

            if !is_member {
                return Some(format!(
                    "employment type {} not in allowed types [{}]",
                    employment_type.unwrap_or("(none)"),
                    rule.employment_types.join(", ")
                ));
            }
        }

        if rule.min_service_months > 0 && months_of_service < rule.min_service_months {
            return Some(format!(
                "requires {} months service, has {}",
                rule.min_service_months, months_of_service
            ));
        }

        None
    }
}

impl Default for EligibilityFilter {
    fn default() -> Self {
        Self::new()
    }
}
