use crate::error::MathError;
use alloy_primitives::U256;

/// Index (0–255) of the most significant set bit of a 256-bit word.
///
/// A zero word has no set bit and yields `MathError::ZeroValue`; the
/// bitmap search relies on that to detect an empty masked region.
pub fn most_significant_bit(x: U256) -> Result<u8, MathError> {
    if x.is_zero() {
        return Err(MathError::ZeroValue);
    }
    Ok((U256::BITS - 1 - x.leading_zeros()) as u8)
}

/// Index (0–255) of the least significant set bit of a 256-bit word.
pub fn least_significant_bit(x: U256) -> Result<u8, MathError> {
    if x.is_zero() {
        return Err(MathError::ZeroValue);
    }
    Ok(x.trailing_zeros() as u8)
}
