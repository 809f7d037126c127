use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places for all monetary amounts produced by the engine.
pub const MONEY_SCALE: u32 = 2;

/// Rounds a final monetary amount half-up to cents.
///
/// Statutory payroll arithmetic specifies half-up rounding, not the
/// banker's rounding `round_dp` defaults to. Applied only to the final
/// amount of each rule; intermediate values accumulate at full precision.
pub fn round_half_up(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Clamps a value into an optional `[floor, cap]` range.
///
/// Used both for base clamping (`min_base`/`max_base`) and final-amount
/// clamping (`floor_amount`/`cap_amount`).
pub fn clamp_to_range(value: Decimal, floor: Option<Decimal>, cap: Option<Decimal>) -> Decimal {
    let mut clamped = value;
    if let Some(floor) = floor {
        if clamped < floor {
            clamped = floor;
        }
    }
    if let Some(cap) = cap {
        if clamped > cap {
            clamped = cap;
        }
    }
    clamped
}
