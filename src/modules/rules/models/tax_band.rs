use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A marginal-rate bracket belonging to one progressive deduction rule
///
/// Bands partition `[0, ∞)`: each band's `lower_limit` equals the previous
/// band's `upper_limit`, and only the last band may be unbounded
/// (`upper_limit = None`).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TaxBand {
    pub id: i64,
    pub rule_id: i64,
    pub lower_limit: Decimal,
    /// None = unbounded (must be the last band)
    pub upper_limit: Option<Decimal>,
    /// Marginal rate applied to the portion of income inside this band
    pub rate: Decimal,
    pub band_order: i32,
}

impl TaxBand {
    pub fn new(
        rule_id: i64,
        band_order: i32,
        lower_limit: Decimal,
        upper_limit: Option<Decimal>,
        rate: Decimal,
    ) -> Self {
        Self {
            id: 0,
            rule_id,
            lower_limit,
            upper_limit,
            rate,
            band_order,
        }
    }
}

/// Checks the contiguity invariant over an ordered band list.
///
/// Returns a human-readable reason on failure; the calculator surfaces it
/// as a skip reason instead of erroring so one broken rule cannot abort a
/// whole payroll run.
pub fn validate_bands(bands: &[TaxBand]) -> std::result::Result<(), String> {
    if bands.is_empty() {
        return Err("progressive rule has no configured bands".to_string());
    }

    if bands[0].lower_limit != Decimal::ZERO {
        return Err(format!(
            "first band must start at 0, starts at {}",
            bands[0].lower_limit
        ));
    }

    for (i, band) in bands.iter().enumerate() {
        if band.rate < Decimal::ZERO {
            return Err(format!("band {} has negative rate {}", band.band_order, band.rate));
        }

        if i > 0 && bands[i - 1].band_order >= band.band_order {
            return Err(format!(
                "bands out of order at band_order {}",
                band.band_order
            ));
        }

        match band.upper_limit {
            Some(upper) => {
                if upper <= band.lower_limit {
                    return Err(format!(
                        "band {} upper limit {} not above lower limit {}",
                        band.band_order, upper, band.lower_limit
                    ));
                }
                if let Some(next) = bands.get(i + 1) {
                    if next.lower_limit != upper {
                        return Err(format!(
                            "gap between bands: {} ends at {} but next starts at {}",
                            band.band_order, upper, next.lower_limit
                        ));
                    }
                }
            }
            None => {
                if i != bands.len() - 1 {
                    return Err(format!(
                        "unbounded band {} must be the last band",
                        band.band_order
                    ));
                }
            }
        }
    }

    Ok(())
}
