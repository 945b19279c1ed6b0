use num_traits::ToPrimitive;
use rust_decimal::Decimal;

use crate::errors::{Error, Result};

/// Largest amount, limit, target or quantity accepted from users (10^15).
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// Rounds half away from negative infinity, matching how percentages are
/// displayed to users (`2.5 -> 3`, `-2.5 -> -2`).
pub fn round_half_up(value: Decimal) -> Decimal {
    match value.checked_add(Decimal::new(5, 1)) {
        Some(shifted) => shifted.floor(),
        None => value.floor(),
    }
}

/// `round(numerator / denominator * 100)` as a whole percentage.
///
/// Returns 0 when the denominator is zero or negative. Ratios too large for
/// `Decimal` or `i64` saturate instead of panicking.
pub fn percentage_of(numerator: Decimal, denominator: Decimal) -> i64 {
    if denominator <= Decimal::ZERO {
        return 0;
    }
    let saturated = if numerator.is_sign_negative() {
        i64::MIN
    } else {
        i64::MAX
    };
    numerator
        .checked_div(denominator)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .and_then(|ratio| round_half_up(ratio).to_i64())
        .unwrap_or(saturated)
}

/// `a + b`, or an error when the sum leaves the `Decimal` range.
pub fn checked_sum(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_add(b)
        .ok_or_else(|| Error::Unexpected(format!("Amount overflow adding {} to {}", b, a)))
}

/// `a * b`, or an error when the product leaves the `Decimal` range.
pub fn checked_product(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_mul(b)
        .ok_or_else(|| Error::Unexpected(format!("Amount overflow multiplying {} by {}", a, b)))
}

/// Rejects amounts above [`MAX_AMOUNT`].
pub fn ensure_within_max(amount: Decimal, field: &str) -> Result<()> {
    if amount > MAX_AMOUNT {
        return Err(Error::invalid_input(format!(
            "{} must not exceed {}",
            field, MAX_AMOUNT
        )));
    }
    Ok(())
}
