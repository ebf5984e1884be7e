use crate::error::MathError;
use alloy_primitives::U256;

const U256_TWO: U256 = U256::from_limbs([2, 0, 0, 0]);
const U256_THREE: U256 = U256::from_limbs([3, 0, 0, 0]);

/// Computes `a * b / denominator` with a full 512‑bit intermediate product,
/// rounding down. Fails on division by zero or when the quotient does not
/// fit in 256 bits.
///
/// This is the `FullMath.mulDiv` routine: the product is split into
/// `prod1 * 2^256 + prod0` and divided through a modular inverse of the
/// odd part of the denominator.
pub fn mul_div(a: U256, b: U256, denominator: U256) -> Result<U256, MathError> {
    if denominator.is_zero() {
        return Err(MathError::DivisionByZero);
    }

    let mm = a.mul_mod(b, U256::MAX);
    let mut prod0 = a.wrapping_mul(b);
    let (mut prod1, borrow) = mm.overflowing_sub(prod0);
    if borrow {
        prod1 = prod1.wrapping_sub(U256::ONE);
    }

    if prod1.is_zero() {
        return Ok(prod0 / denominator);
    }

    if denominator <= prod1 {
        return Err(MathError::Overflow);
    }

    // make the division exact by subtracting the remainder from [prod1 prod0]
    let remainder = a.mul_mod(b, denominator);
    let (reduced, borrow) = prod0.overflowing_sub(remainder);
    prod0 = reduced;
    if borrow {
        prod1 = prod1.wrapping_sub(U256::ONE);
    }

    // factor powers of two out of the denominator
    let twos = denominator & denominator.wrapping_neg();
    let denominator = denominator.wrapping_div(twos);
    prod0 = prod0.wrapping_div(twos);

    // shift bits from prod1 into prod0
    let flip = twos.wrapping_neg().wrapping_div(twos).wrapping_add(U256::ONE);
    prod0 |= prod1.wrapping_mul(flip);

    // inverse of the odd denominator mod 2^256, correct to 8 bits and
    // doubled by each Newton-Raphson step
    let mut inv = U256_THREE.wrapping_mul(denominator) ^ U256_TWO;
    for _ in 0..6 {
        inv = inv.wrapping_mul(U256_TWO.wrapping_sub(denominator.wrapping_mul(inv)));
    }

    Ok(prod0.wrapping_mul(inv))
}

/// Like [`mul_div`], but rounds the result up when there is a
/// non‑zero remainder.
pub fn mul_div_rounding_up(a: U256, b: U256, denominator: U256) -> Result<U256, MathError> {
    let result = mul_div(a, b, denominator)?;

    if a.mul_mod(b, denominator).is_zero() {
        return Ok(result);
    }
    result.checked_add(U256::ONE).ok_or(MathError::Overflow)
}

/// Divides `a` by `b`, rounding up on a non‑zero remainder.
///
/// Panics when `b` is zero, like primitive integer division; callers
/// guarantee a non-zero divisor.
pub fn div_rounding_up(a: U256, b: U256) -> U256 {
    let (quotient, remainder) = a.div_rem(b);
    if remainder.is_zero() {
        quotient
    } else {
        quotient + U256::ONE
    }
}
