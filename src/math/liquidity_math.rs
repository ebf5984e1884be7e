use crate::error::{Error, InvariantViolation};

/// Applies a signed liquidity delta to an unsigned liquidity amount.
///
/// Going below zero or above `u128::MAX` is reported as an invariant
/// violation: callers only reach it through an inconsistent ledger.
pub fn add_delta(x: u128, y: i128) -> Result<u128, Error> {
    let result = if y < 0 {
        x.checked_sub(y.unsigned_abs())
            .ok_or(InvariantViolation::LiquidityUnderflow)?
    } else {
        x.checked_add(y as u128)
            .ok_or(InvariantViolation::LiquidityOverflow)?
    };
    Ok(result)
}
