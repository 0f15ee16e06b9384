//! Money helpers shared by balances and settlements.

/// Amounts whose magnitude is below this are treated as settled.
pub const SETTLEMENT_EPSILON: f64 = 0.01;

/// Rounds to currency-cent precision, normalizing negative zero.
pub fn round_cents(value: f64) -> f64 {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Returns `true` when `amount` is effectively zero.
pub fn is_settled(amount: f64) -> bool {
    amount.abs() < SETTLEMENT_EPSILON
}
