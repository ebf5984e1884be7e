use thiserror::Error;

use crate::registry::PoolId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MathError {
    #[error("Math error - overflow")]
    Overflow,
    #[error("Math error - out of bounds")]
    OutOfBounds,
    #[error("Math error - division by zero")]
    DivisionByZero,
    #[error("BitMath error - zero input value")]
    ZeroValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("State error - sqrtPrice out of bounds")]
    SqrtPriceOutOfBounds,
    #[error("State error - sqrtPrice is 0")]
    SqrtPriceIsZero,
    #[error("State error - sqrtRatio is 0")]
    SqrtRatioIsZero,
    #[error("State error - tick out of bounds")]
    TickOutOfBounds,
    #[error("State error - liquidity is 0")]
    LiquidityIsZero,
    #[error("State error - requested amount exceeds pool reserves")]
    InsufficientReserves,
}

/// Malformed caller input. The pool is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("tick lower {lower} must be below tick upper {upper}")]
    TickOrder { lower: i32, upper: i32 },
    #[error("tick {0} outside [MIN_TICK, MAX_TICK]")]
    TickOutOfBounds(i32),
    #[error("tick {tick} is not a multiple of tick spacing {tick_spacing}")]
    TickNotAligned { tick: i32, tick_spacing: i32 },
    #[error("sqrt price outside [MIN_SQRT_RATIO, MAX_SQRT_RATIO)")]
    SqrtPriceOutOfBounds,
    #[error("sqrt price limit is on the wrong side of the current price or out of bounds")]
    SqrtPriceLimitOutOfBounds,
    #[error("swap amount specified is zero")]
    AmountSpecifiedIsZero,
    #[error("liquidity amount is zero")]
    ZeroLiquidity,
    #[error("position holds no liquidity")]
    EmptyPosition,
    #[error("pool is already initialized")]
    AlreadyInitialized,
    #[error("pool is not initialized")]
    NotInitialized,
    #[error("unsupported fee {0} pips")]
    UnsupportedFee(u32),
    #[error("unknown pool {0}")]
    UnknownPool(PoolId),
}

/// An internal invariant would be broken by the requested operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("liquidity would become negative")]
    LiquidityUnderflow,
    #[error("liquidity would overflow u128")]
    LiquidityOverflow,
    #[error("tick {tick} liquidity gross {gross} exceeds per-tick maximum {max}")]
    TickLiquidityCap { tick: i32, gross: u128, max: u128 },
    #[error("tick {0} liquidity net overflows i128")]
    LiquidityNetOverflow(i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    MathError(#[from] MathError),

    #[error(transparent)]
    StateError(#[from] StateError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Invariant(#[from] InvariantViolation),

    #[error("exact output swap cannot be filled within the legal price range")]
    InsufficientLiquidity,
}
