use crate::U256_E6;
use crate::error::{Error, MathError};
use crate::math::math_helpers::{mul_div, mul_div_rounding_up};
use crate::math::sqrt_price_math::{
    get_amount_0_delta_base, get_amount_1_delta_base, get_next_sqrt_price_from_input,
    get_next_sqrt_price_from_output,
};
use alloy_primitives::{I256, U256};

/// Computes one swap step from `sqrt_price_current_x96` toward
/// `sqrt_price_target_x96` at constant `liquidity`, returning
/// `(sqrt_price_next_x96, amount_in, amount_out, fee_amount)`.
///
/// The direction is implied by the two prices: token0 in when the target
/// is at or below the current price. A non‑negative `amount_remaining`
/// is an exact-input budget including fees; a negative one is the output
/// still owed. `fee_pips` is in millionths and must be below `1_000_000`.
///
/// Amounts in round up, amounts out round down, and when an exact-input
/// step stops short of the target the entire leftover becomes fee.
pub fn compute_swap_step(
    sqrt_price_current_x96: U256,
    sqrt_price_target_x96: U256,
    liquidity: u128,
    amount_remaining: I256,
    fee_pips: u32,
) -> Result<(U256, U256, U256, U256), Error> {
    if fee_pips >= 1_000_000 {
        return Err(MathError::OutOfBounds.into());
    }

    let zero_for_one = sqrt_price_current_x96 >= sqrt_price_target_x96;
    let exact_in = !amount_remaining.is_negative();
    let fee = U256::from(fee_pips);
    let fee_complement = U256_E6 - fee;

    let mut amount_in = U256::ZERO;
    let mut amount_out = U256::ZERO;

    let sqrt_price_next_x96 = if exact_in {
        let amount_remaining_less_fee =
            mul_div(amount_remaining.into_raw(), fee_complement, U256_E6)?;

        amount_in = if zero_for_one {
            get_amount_0_delta_base(
                sqrt_price_target_x96,
                sqrt_price_current_x96,
                liquidity,
                true,
            )?
        } else {
            get_amount_1_delta_base(
                sqrt_price_current_x96,
                sqrt_price_target_x96,
                liquidity,
                true,
            )?
        };

        if amount_remaining_less_fee >= amount_in {
            sqrt_price_target_x96
        } else {
            get_next_sqrt_price_from_input(
                sqrt_price_current_x96,
                liquidity,
                amount_remaining_less_fee,
                zero_for_one,
            )?
        }
    } else {
        amount_out = if zero_for_one {
            get_amount_1_delta_base(
                sqrt_price_target_x96,
                sqrt_price_current_x96,
                liquidity,
                false,
            )?
        } else {
            get_amount_0_delta_base(
                sqrt_price_current_x96,
                sqrt_price_target_x96,
                liquidity,
                false,
            )?
        };

        let amount_wanted = amount_remaining.unsigned_abs();
        if amount_wanted >= amount_out {
            sqrt_price_target_x96
        } else {
            get_next_sqrt_price_from_output(
                sqrt_price_current_x96,
                liquidity,
                amount_wanted,
                zero_for_one,
            )?
        }
    };

    let max = sqrt_price_target_x96 == sqrt_price_next_x96;

    if zero_for_one {
        if !(max && exact_in) {
            amount_in = get_amount_0_delta_base(
                sqrt_price_next_x96,
                sqrt_price_current_x96,
                liquidity,
                true,
            )?;
        }
        if !(max && !exact_in) {
            amount_out = get_amount_1_delta_base(
                sqrt_price_next_x96,
                sqrt_price_current_x96,
                liquidity,
                false,
            )?;
        }
    } else {
        if !(max && exact_in) {
            amount_in = get_amount_1_delta_base(
                sqrt_price_current_x96,
                sqrt_price_next_x96,
                liquidity,
                true,
            )?;
        }
        if !(max && !exact_in) {
            amount_out = get_amount_0_delta_base(
                sqrt_price_current_x96,
                sqrt_price_next_x96,
                liquidity,
                false,
            )?;
        }
    }

    // the output can never exceed what an exact-output swap asked for
    if !exact_in {
        amount_out = amount_out.min(amount_remaining.unsigned_abs());
    }

    let fee_amount = if exact_in && sqrt_price_next_x96 != sqrt_price_target_x96 {
        amount_remaining.into_raw() - amount_in
    } else {
        mul_div_rounding_up(amount_in, fee, fee_complement)?
    };

    Ok((sqrt_price_next_x96, amount_in, amount_out, fee_amount))
}
