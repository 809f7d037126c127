//! Shared string normalization for config-driven matching.
//!
//! Employment-type allow-lists and base-component patterns both come from
//! configuration written by humans, so "Full-Time", "full_time" and
//! "FULLTIME" must compare equal. Both the eligibility filter and the
//! base-amount resolver go through these two functions so the matching
//! rules cannot drift apart.

/// Normalizes a configuration token: uppercase, separators stripped.
pub fn normalize_token(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_uppercase())
        .collect()
}

/// Case-insensitive substring match in either direction.
///
/// "Housing Allowance" matches the pattern "housing" and vice versa.
pub fn loose_contains(left: &str, right: &str) -> bool {
    let left = left.to_lowercase();
    let right = right.to_lowercase();
    left.contains(&right) || right.contains(&left)
}
