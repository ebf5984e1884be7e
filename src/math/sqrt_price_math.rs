use crate::error::{Error, MathError, StateError};
use crate::math::math_helpers::{div_rounding_up, mul_div, mul_div_rounding_up};
use crate::{Q96, RESOLUTION, U160_MAX};
use alloy_primitives::{I256, U256};

/// Next sqrt price after adding (`add = true`) or removing `amount` of
/// token0, rounding the price up.
pub fn get_next_sqrt_price_from_amount_0_rounding_up(
    sqrt_p_x96: U256,
    liquidity: u128,
    amount: U256,
    add: bool,
) -> Result<U256, Error> {
    if amount.is_zero() {
        return Ok(sqrt_p_x96);
    }

    let numerator1 = U256::from(liquidity) << RESOLUTION;
    let (product, product_overflowed) = amount.overflowing_mul(sqrt_p_x96);

    if add {
        if !product_overflowed {
            let (denominator, sum_overflowed) = numerator1.overflowing_add(product);
            if !sum_overflowed {
                return Ok(mul_div_rounding_up(numerator1, sqrt_p_x96, denominator)?);
            }
        }
        // L / (L / sqrtP + amount), only reached for very large amounts
        let denominator = (numerator1 / sqrt_p_x96)
            .checked_add(amount)
            .ok_or(MathError::Overflow)?;
        Ok(div_rounding_up(numerator1, denominator))
    } else {
        if product_overflowed || numerator1 <= product {
            return Err(StateError::InsufficientReserves.into());
        }
        let next = mul_div_rounding_up(numerator1, sqrt_p_x96, numerator1 - product)?;
        if next > U160_MAX {
            return Err(MathError::Overflow.into());
        }
        Ok(next)
    }
}

/// Next sqrt price after adding or removing `amount` of token1, rounding
/// the price down.
pub fn get_next_sqrt_price_from_amount_1_rounding_down(
    sqrt_p_x96: U256,
    liquidity: u128,
    amount: U256,
    add: bool,
) -> Result<U256, Error> {
    let liquidity = U256::from(liquidity);
    if add {
        let quotient = if amount <= U160_MAX {
            (amount << RESOLUTION) / liquidity
        } else {
            mul_div(amount, Q96, liquidity)?
        };

        let result = sqrt_p_x96
            .checked_add(quotient)
            .ok_or(MathError::Overflow)?;
        if result > U160_MAX {
            return Err(MathError::Overflow.into());
        }
        Ok(result)
    } else {
        let quotient = if amount <= U160_MAX {
            div_rounding_up(amount << RESOLUTION, liquidity)
        } else {
            mul_div_rounding_up(amount, Q96, liquidity)?
        };

        if sqrt_p_x96 <= quotient {
            return Err(StateError::InsufficientReserves.into());
        }
        Ok(sqrt_p_x96 - quotient)
    }
}

/// Token0 needed (or released) to move between two sqrt prices at a
/// fixed liquidity: `L * (sqrtB - sqrtA) / (sqrtA * sqrtB)`.
pub fn get_amount_0_delta_base(
    mut sqrt_ratio_a_x96: U256,
    mut sqrt_ratio_b_x96: U256,
    liquidity: u128,
    round_up: bool,
) -> Result<U256, Error> {
    if sqrt_ratio_a_x96 > sqrt_ratio_b_x96 {
        (sqrt_ratio_a_x96, sqrt_ratio_b_x96) = (sqrt_ratio_b_x96, sqrt_ratio_a_x96);
    }

    if sqrt_ratio_a_x96.is_zero() {
        return Err(StateError::SqrtRatioIsZero.into());
    }

    let numerator1 = U256::from(liquidity) << RESOLUTION;
    let numerator2 = sqrt_ratio_b_x96 - sqrt_ratio_a_x96;

    if round_up {
        Ok(div_rounding_up(
            mul_div_rounding_up(numerator1, numerator2, sqrt_ratio_b_x96)?,
            sqrt_ratio_a_x96,
        ))
    } else {
        Ok(mul_div(numerator1, numerator2, sqrt_ratio_b_x96)? / sqrt_ratio_a_x96)
    }
}

/// Token1 needed (or released) to move between two sqrt prices at a
/// fixed liquidity: `L * (sqrtB - sqrtA)`.
pub fn get_amount_1_delta_base(
    mut sqrt_ratio_a_x96: U256,
    mut sqrt_ratio_b_x96: U256,
    liquidity: u128,
    round_up: bool,
) -> Result<U256, MathError> {
    if sqrt_ratio_a_x96 > sqrt_ratio_b_x96 {
        (sqrt_ratio_a_x96, sqrt_ratio_b_x96) = (sqrt_ratio_b_x96, sqrt_ratio_a_x96);
    }
    let liquidity = U256::from(liquidity);

    if round_up {
        mul_div_rounding_up(liquidity, sqrt_ratio_b_x96 - sqrt_ratio_a_x96, Q96)
    } else {
        mul_div(liquidity, sqrt_ratio_b_x96 - sqrt_ratio_a_x96, Q96)
    }
}

/// Signed token0 delta for a signed liquidity change. Added liquidity is
/// owed to the pool and rounds up; removed liquidity is paid out and
/// rounds down.
pub fn get_amount_0_delta(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    liquidity: i128,
) -> Result<I256, Error> {
    let amount = get_amount_0_delta_base(
        sqrt_ratio_a_x96,
        sqrt_ratio_b_x96,
        liquidity.unsigned_abs(),
        liquidity >= 0,
    )?;
    signed_amount(amount, liquidity < 0)
}

/// Signed token1 delta for a signed liquidity change.
pub fn get_amount_1_delta(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    liquidity: i128,
) -> Result<I256, Error> {
    let amount = get_amount_1_delta_base(
        sqrt_ratio_a_x96,
        sqrt_ratio_b_x96,
        liquidity.unsigned_abs(),
        liquidity >= 0,
    )?;
    signed_amount(amount, liquidity < 0)
}

fn signed_amount(amount: U256, negative: bool) -> Result<I256, Error> {
    let signed = I256::try_from(amount).map_err(|_| MathError::Overflow)?;
    Ok(if negative { -signed } else { signed })
}

/// Next sqrt price when `amount_in` of the input token enters the pool.
pub fn get_next_sqrt_price_from_input(
    sqrt_p_x96: U256,
    liquidity: u128,
    amount_in: U256,
    zero_for_one: bool,
) -> Result<U256, Error> {
    if sqrt_p_x96.is_zero() {
        return Err(StateError::SqrtPriceIsZero.into());
    }
    if liquidity == 0 {
        return Err(StateError::LiquidityIsZero.into());
    }

    if zero_for_one {
        get_next_sqrt_price_from_amount_0_rounding_up(sqrt_p_x96, liquidity, amount_in, true)
    } else {
        get_next_sqrt_price_from_amount_1_rounding_down(sqrt_p_x96, liquidity, amount_in, true)
    }
}

/// Next sqrt price when `amount_out` of the output token leaves the pool.
pub fn get_next_sqrt_price_from_output(
    sqrt_p_x96: U256,
    liquidity: u128,
    amount_out: U256,
    zero_for_one: bool,
) -> Result<U256, Error> {
    if sqrt_p_x96.is_zero() {
        return Err(StateError::SqrtPriceIsZero.into());
    }
    if liquidity == 0 {
        return Err(StateError::LiquidityIsZero.into());
    }

    if zero_for_one {
        get_next_sqrt_price_from_amount_1_rounding_down(sqrt_p_x96, liquidity, amount_out, false)
    } else {
        get_next_sqrt_price_from_amount_0_rounding_up(sqrt_p_x96, liquidity, amount_out, false)
    }
}

/// Q64.96 square root of `reserve1 / reserve0`, rounded down.
///
/// Integer-only counterpart of the usual `sqrt(r1 / r0) * 2^96` price
/// encoding; ratios above 2^64 lose the low 64 bits of precision.
pub fn encode_price_sqrt(reserve1: u128, reserve0: u128) -> Result<U256, MathError> {
    if reserve0 == 0 {
        return Err(MathError::DivisionByZero);
    }
    let reserve1 = U256::from(reserve1);
    let reserve0 = U256::from(reserve0);

    if reserve1 <= U256::from(u64::MAX) {
        Ok(integer_sqrt((reserve1 << 192) / reserve0))
    } else {
        Ok(integer_sqrt((reserve1 << 64) / reserve0) << 64)
    }
}

/// Floor square root by Newton iteration.
fn integer_sqrt(n: U256) -> U256 {
    if n < U256::from(2u8) {
        return n;
    }
    let mut x = n;
    let mut y = (n >> 1) + U256::ONE;
    while y < x {
        x = y;
        y = (x + n / x) >> 1;
    }
    x
}
