use crate::Q128;
use crate::error::{Error, MathError, ValidationError};
use crate::math::liquidity_math::add_delta;
use crate::math::math_helpers::mul_div;
use crate::math::swap_math::compute_swap_step;
use crate::math::tick_math::{
    MAX_SQRT_PRICE_LIMIT, MAX_SQRT_RATIO, MAX_TICK, MIN_SQRT_PRICE_LIMIT, MIN_SQRT_RATIO,
    MIN_TICK, get_sqrt_ratio_at_tick, get_tick_at_sqrt_ratio,
};
use crate::pool::core_pool::{CorePool, Slot0};
use alloy_primitives::{I256, U256};
use tracing::{debug, instrument, trace, warn};

/// Outcome of a swap, from the caller's point of view.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SwapResult {
    /// Token0 delta: positive is owed to the pool, negative is paid out.
    pub amount0: I256,
    /// Token1 delta, same sign convention.
    pub amount1: I256,
    /// Price after the swap.
    pub sqrt_price_x96: U256,
    pub tick: i32,
    /// In-range liquidity after the swap.
    pub liquidity: u128,
    /// Total fee charged on the input token.
    pub fee_amount: U256,
}

// the top level state of the swap, the results of which are recorded in storage at the end
struct SwapState {
    // the amount remaining to be swapped in/out of the input/output asset
    amount_specified_remaining: I256,
    // the amount already swapped out/in of the output/input asset
    amount_calculated: I256,
    sqrt_price_x96: U256,
    tick: i32,
    // the current liquidity in range
    liquidity: u128,
    // global fee growth of the input token
    fee_growth_global_x128: U256,
    fee_amount: U256,
}

#[derive(Default)]
struct StepComputations {
    // the price at the beginning of the step
    sqrt_price_start_x96: U256,
    // the next tick to swap to from the current tick in the swap direction
    tick_next: i32,
    // whether tick_next is initialized or not
    initialized: bool,
    // sqrt(price) for the next tick (1/0)
    sqrt_price_next_x96: U256,
    amount_in: U256,
    amount_out: U256,
    fee_amount: U256,
}

/// A tick the swap moved across, with the global fee growth at that
/// moment. Applied to the tick ledger only once the whole swap succeeds.
#[derive(Copy, Clone, Debug)]
struct TickCrossing {
    tick: i32,
    fee_growth_global_0_x128: U256,
    fee_growth_global_1_x128: U256,
}

/// Everything a swap writes, computed without touching the pool.
struct SwapOutcome {
    result: SwapResult,
    fee_growth_global_x128: U256,
    crossings: Vec<TickCrossing>,
}

fn to_signed(value: U256) -> Result<I256, Error> {
    I256::try_from(value).map_err(|_| MathError::Overflow.into())
}

impl CorePool {
    /// Swaps against the pool and commits the result.
    ///
    /// `amount_specified` selects the mode by its sign: positive is an
    /// exact input amount, negative an exact output amount. The swap stops
    /// when the amount is used up or the price reaches
    /// `sqrt_price_limit_x96`, which defaults to the most extreme price the
    /// pool allows in the swap direction.
    ///
    /// An exact-input swap that stops at the limit returns the partial fill.
    /// An exact-output swap that cannot be filled before the pool's price
    /// bound fails with [`Error::InsufficientLiquidity`].
    #[instrument(level = "debug", skip(self))]
    pub fn swap(
        &mut self,
        zero_for_one: bool,
        amount_specified: I256,
        sqrt_price_limit_x96: Option<U256>,
    ) -> Result<SwapResult, Error> {
        let outcome = self.compute_swap(zero_for_one, amount_specified, sqrt_price_limit_x96)?;

        for crossing in &outcome.crossings {
            self.ticks.cross(
                crossing.tick,
                crossing.fee_growth_global_0_x128,
                crossing.fee_growth_global_1_x128,
            );
        }

        let result = outcome.result;
        if zero_for_one {
            self.fee_growth_global_0_x128 = outcome.fee_growth_global_x128;
        } else {
            self.fee_growth_global_1_x128 = outcome.fee_growth_global_x128;
        }
        self.slot0 = Some(Slot0 {
            sqrt_price_x96: result.sqrt_price_x96,
            tick: result.tick,
        });
        self.liquidity = result.liquidity;

        debug!(
            zero_for_one,
            amount0 = %result.amount0,
            amount1 = %result.amount1,
            sqrt_price_x96 = %result.sqrt_price_x96,
            tick = result.tick,
            liquidity = result.liquidity,
            crossed = outcome.crossings.len(),
            "swapped"
        );
        Ok(result)
    }

    /// Runs the same computation as [`CorePool::swap`] without changing
    /// the pool.
    pub fn quote_swap(
        &self,
        zero_for_one: bool,
        amount_specified: I256,
        sqrt_price_limit_x96: Option<U256>,
    ) -> Result<SwapResult, Error> {
        self.compute_swap(zero_for_one, amount_specified, sqrt_price_limit_x96)
            .map(|outcome| outcome.result)
    }

    fn compute_swap(
        &self,
        zero_for_one: bool,
        amount_specified: I256,
        sqrt_price_limit_x96: Option<U256>,
    ) -> Result<SwapOutcome, Error> {
        let slot0 = self.slot0()?;
        if amount_specified.is_zero() {
            return Err(ValidationError::AmountSpecifiedIsZero.into());
        }

        let sqrt_price_limit_x96 = sqrt_price_limit_x96.unwrap_or(if zero_for_one {
            MIN_SQRT_PRICE_LIMIT
        } else {
            MAX_SQRT_PRICE_LIMIT
        });
        let limit_ok = if zero_for_one {
            sqrt_price_limit_x96 < slot0.sqrt_price_x96 && sqrt_price_limit_x96 > MIN_SQRT_RATIO
        } else {
            sqrt_price_limit_x96 > slot0.sqrt_price_x96 && sqrt_price_limit_x96 < MAX_SQRT_RATIO
        };
        if !limit_ok {
            return Err(ValidationError::SqrtPriceLimitOutOfBounds.into());
        }

        let exact_input = amount_specified.is_positive();

        let mut state = SwapState {
            amount_specified_remaining: amount_specified,
            amount_calculated: I256::ZERO,
            sqrt_price_x96: slot0.sqrt_price_x96,
            tick: slot0.tick,
            liquidity: self.liquidity,
            fee_growth_global_x128: if zero_for_one {
                self.fee_growth_global_0_x128
            } else {
                self.fee_growth_global_1_x128
            },
            fee_amount: U256::ZERO,
        };
        let mut crossings = Vec::new();

        while !state.amount_specified_remaining.is_zero()
            && state.sqrt_price_x96 != sqrt_price_limit_x96
        {
            let mut step = StepComputations {
                sqrt_price_start_x96: state.sqrt_price_x96,
                ..Default::default()
            };

            (step.tick_next, step.initialized) = self.bitmap.next_initialized_tick_within_one_word(
                state.tick,
                self.tick_spacing,
                zero_for_one,
            );

            // the bitmap knows nothing of the tick bounds
            step.tick_next = step.tick_next.clamp(MIN_TICK, MAX_TICK);

            step.sqrt_price_next_x96 = get_sqrt_ratio_at_tick(step.tick_next)?;

            let sqrt_price_target_x96 = if zero_for_one {
                step.sqrt_price_next_x96.max(sqrt_price_limit_x96)
            } else {
                step.sqrt_price_next_x96.min(sqrt_price_limit_x96)
            };

            (
                state.sqrt_price_x96,
                step.amount_in,
                step.amount_out,
                step.fee_amount,
            ) = compute_swap_step(
                state.sqrt_price_x96,
                sqrt_price_target_x96,
                state.liquidity,
                state.amount_specified_remaining,
                self.fee_pips,
            )?;

            let amount_in_with_fee = to_signed(step.amount_in + step.fee_amount)?;
            let amount_out = to_signed(step.amount_out)?;
            if exact_input {
                state.amount_specified_remaining -= amount_in_with_fee;
                state.amount_calculated -= amount_out;
            } else {
                state.amount_specified_remaining += amount_out;
                state.amount_calculated += amount_in_with_fee;
            }
            state.fee_amount += step.fee_amount;

            // with no liquidity in range the fee is kept by the pool unallocated
            if state.liquidity > 0 {
                state.fee_growth_global_x128 = state.fee_growth_global_x128.wrapping_add(mul_div(
                    step.fee_amount,
                    Q128,
                    U256::from(state.liquidity),
                )?);
            }

            trace!(
                tick_next = step.tick_next,
                initialized = step.initialized,
                sqrt_price_x96 = %state.sqrt_price_x96,
                amount_in = %step.amount_in,
                amount_out = %step.amount_out,
                fee_amount = %step.fee_amount,
                "swap step"
            );

            if state.sqrt_price_x96 == step.sqrt_price_next_x96 {
                if step.initialized {
                    let (fee_growth_global_0_x128, fee_growth_global_1_x128) = if zero_for_one {
                        (state.fee_growth_global_x128, self.fee_growth_global_1_x128)
                    } else {
                        (self.fee_growth_global_0_x128, state.fee_growth_global_x128)
                    };
                    crossings.push(TickCrossing {
                        tick: step.tick_next,
                        fee_growth_global_0_x128,
                        fee_growth_global_1_x128,
                    });

                    // moving left, the liquidity net applies in reverse
                    let mut liquidity_net = self.ticks.liquidity_net(step.tick_next);
                    if zero_for_one {
                        liquidity_net = liquidity_net
                            .checked_neg()
                            .ok_or(MathError::Overflow)?;
                    }
                    state.liquidity = add_delta(state.liquidity, liquidity_net)?;

                    trace!(
                        tick = step.tick_next,
                        liquidity_net,
                        liquidity = state.liquidity,
                        "crossed tick"
                    );
                }
                state.tick = if zero_for_one {
                    step.tick_next - 1
                } else {
                    step.tick_next
                };
            } else if state.sqrt_price_x96 != step.sqrt_price_start_x96 {
                state.tick = get_tick_at_sqrt_ratio(state.sqrt_price_x96)?;
            }
        }

        let price_bound = if zero_for_one {
            MIN_SQRT_PRICE_LIMIT
        } else {
            MAX_SQRT_PRICE_LIMIT
        };
        if !exact_input
            && !state.amount_specified_remaining.is_zero()
            && state.sqrt_price_x96 == price_bound
        {
            warn!(
                zero_for_one,
                amount_specified = %amount_specified,
                unfilled = %state.amount_specified_remaining,
                "exact output swap ran out of price range"
            );
            return Err(Error::InsufficientLiquidity);
        }

        let filled = amount_specified - state.amount_specified_remaining;
        let (amount0, amount1) = if zero_for_one == exact_input {
            (filled, state.amount_calculated)
        } else {
            (state.amount_calculated, filled)
        };

        Ok(SwapOutcome {
            result: SwapResult {
                amount0,
                amount1,
                sqrt_price_x96: state.sqrt_price_x96,
                tick: state.tick,
                liquidity: state.liquidity,
                fee_amount: state.fee_amount,
            },
            fee_growth_global_x128: state.fee_growth_global_x128,
            crossings,
        })
    }
}
