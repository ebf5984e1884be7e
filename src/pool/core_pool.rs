use crate::config::PoolConfig;
use crate::error::{Error, InvariantViolation, MathError, ValidationError};
use crate::math::liquidity_math::add_delta;
use crate::math::sqrt_price_math::{get_amount_0_delta, get_amount_1_delta};
use crate::math::tick_bitmap::TickBitmap;
use crate::math::tick_math::{
    MAX_TICK, MIN_TICK, get_sqrt_ratio_at_tick, get_tick_at_sqrt_ratio, is_valid_sqrt_price,
};
use crate::pool::position::{PositionInfo, PositionKey, PositionLedger};
use crate::pool::tick::{TickInfo, TickLedger, fee_growth_inside};
use alloy_primitives::{Address, I256, U256};
use tracing::{debug, instrument};

/// Current price and the tick it falls in.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Slot0 {
    pub sqrt_price_x96: U256,
    pub tick: i32,
}

/// Read-only copy of a pool's global state.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolSnapshot {
    pub initialized: bool,
    pub sqrt_price_x96: U256,
    pub tick: i32,
    pub liquidity: u128,
    pub fee_growth_global_0_x128: U256,
    pub fee_growth_global_1_x128: U256,
    pub fee_pips: u32,
    pub tick_spacing: i32,
}

/// A single concentrated-liquidity pool.
///
/// Every mutating operation takes `&mut self` and either completes or
/// returns an error with the pool left exactly as it was.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorePool {
    pub(crate) config: PoolConfig,
    pub(crate) fee_pips: u32,
    pub(crate) tick_spacing: i32,
    pub(crate) slot0: Option<Slot0>,
    pub(crate) liquidity: u128,
    pub(crate) fee_growth_global_0_x128: U256,
    pub(crate) fee_growth_global_1_x128: U256,
    pub(crate) ticks: TickLedger,
    pub(crate) bitmap: TickBitmap,
    pub(crate) positions: PositionLedger,
}

/// Everything a liquidity change will write, computed up front.
struct PositionChange {
    key: PositionKey,
    lower: (TickInfo, bool),
    upper: (TickInfo, bool),
    position: PositionInfo,
    liquidity: u128,
    amount0: I256,
    amount1: I256,
}

impl CorePool {
    pub fn new(config: PoolConfig) -> Self {
        let fee_pips = config.fee_pips();
        let tick_spacing = config.tick_spacing();
        Self {
            config,
            fee_pips,
            tick_spacing,
            slot0: None,
            liquidity: 0,
            fee_growth_global_0_x128: U256::ZERO,
            fee_growth_global_1_x128: U256::ZERO,
            ticks: TickLedger::new(tick_spacing),
            bitmap: TickBitmap::new(),
            positions: PositionLedger::new(),
        }
    }

    #[inline]
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    #[inline]
    pub fn fee_pips(&self) -> u32 {
        self.fee_pips
    }

    #[inline]
    pub fn tick_spacing(&self) -> i32 {
        self.tick_spacing
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.slot0.is_some()
    }

    pub fn slot0(&self) -> Result<Slot0, Error> {
        self.slot0.ok_or(ValidationError::NotInitialized.into())
    }

    pub fn snapshot(&self) -> PoolSnapshot {
        let slot0 = self.slot0.unwrap_or_default();
        PoolSnapshot {
            initialized: self.slot0.is_some(),
            sqrt_price_x96: slot0.sqrt_price_x96,
            tick: slot0.tick,
            liquidity: self.liquidity,
            fee_growth_global_0_x128: self.fee_growth_global_0_x128,
            fee_growth_global_1_x128: self.fee_growth_global_1_x128,
            fee_pips: self.fee_pips,
            tick_spacing: self.tick_spacing,
        }
    }

    pub fn tick_info(&self, tick: i32) -> Option<TickInfo> {
        self.ticks.get(tick).copied()
    }

    pub fn position(
        &self,
        owner: Address,
        tick_lower: i32,
        tick_upper: i32,
    ) -> Option<PositionInfo> {
        self.positions
            .get(&PositionKey::new(owner, tick_lower, tick_upper))
            .copied()
    }

    pub fn is_tick_initialized(&self, tick: i32) -> bool {
        self.bitmap.is_initialized(tick, self.tick_spacing)
    }

    pub fn ticks(&self) -> &TickLedger {
        &self.ticks
    }

    pub fn bitmap(&self) -> &TickBitmap {
        &self.bitmap
    }

    pub fn positions(&self) -> &PositionLedger {
        &self.positions
    }

    /// Sets the starting price. Liquidity and fee accumulators start at
    /// zero.
    #[instrument(level = "debug", skip(self))]
    pub fn initialize(&mut self, sqrt_price_x96: U256) -> Result<Slot0, Error> {
        if self.slot0.is_some() {
            return Err(ValidationError::AlreadyInitialized.into());
        }
        if !is_valid_sqrt_price(sqrt_price_x96) {
            return Err(ValidationError::SqrtPriceOutOfBounds.into());
        }

        let slot0 = Slot0 {
            sqrt_price_x96,
            tick: get_tick_at_sqrt_ratio(sqrt_price_x96)?,
        };
        self.slot0 = Some(slot0);

        debug!(tick = slot0.tick, %sqrt_price_x96, "pool initialized");
        Ok(slot0)
    }

    /// Adds `amount` of liquidity for `owner` on `[tick_lower, tick_upper)`
    /// and returns the token0 and token1 amounts the caller owes.
    #[instrument(level = "debug", skip(self))]
    pub fn mint(
        &mut self,
        owner: Address,
        tick_lower: i32,
        tick_upper: i32,
        amount: u128,
    ) -> Result<(U256, U256), Error> {
        if amount == 0 {
            return Err(ValidationError::ZeroLiquidity.into());
        }
        let delta = i128::try_from(amount).map_err(|_| InvariantViolation::LiquidityOverflow)?;

        let change = self.prepare_position_change(owner, tick_lower, tick_upper, delta)?;
        let (amount0, amount1) = (change.amount0.into_raw(), change.amount1.into_raw());
        self.apply_position_change(change, false)?;

        debug!(
            %owner, tick_lower, tick_upper, amount, %amount0, %amount1,
            liquidity = self.liquidity,
            "minted"
        );
        Ok((amount0, amount1))
    }

    /// Removes `amount` of liquidity from `owner`'s position and credits
    /// the released tokens to the position's owed balances. Nothing is paid
    /// out until [`CorePool::collect`].
    ///
    /// Burning zero refreshes the fees owed to an existing position.
    #[instrument(level = "debug", skip(self))]
    pub fn burn(
        &mut self,
        owner: Address,
        tick_lower: i32,
        tick_upper: i32,
        amount: u128,
    ) -> Result<(U256, U256), Error> {
        let delta = i128::try_from(amount)
            .map(|amount| -amount)
            .map_err(|_| InvariantViolation::LiquidityOverflow)?;

        let mut change = self.prepare_position_change(owner, tick_lower, tick_upper, delta)?;
        let (amount0, amount1) = (
            change.amount0.unsigned_abs(),
            change.amount1.unsigned_abs(),
        );
        change.position.tokens_owed_0 = change
            .position
            .tokens_owed_0
            .checked_add(amount0)
            .ok_or(MathError::Overflow)?;
        change.position.tokens_owed_1 = change
            .position
            .tokens_owed_1
            .checked_add(amount1)
            .ok_or(MathError::Overflow)?;
        self.apply_position_change(change, true)?;

        debug!(
            %owner, tick_lower, tick_upper, amount, %amount0, %amount1,
            liquidity = self.liquidity,
            "burned"
        );
        Ok((amount0, amount1))
    }

    /// Pays out up to the requested amounts of what the position is owed.
    #[instrument(level = "debug", skip(self))]
    pub fn collect(
        &mut self,
        owner: Address,
        tick_lower: i32,
        tick_upper: i32,
        amount0_requested: U256,
        amount1_requested: U256,
    ) -> Result<(U256, U256), Error> {
        self.slot0()?;
        let key = PositionKey::new(owner, tick_lower, tick_upper);
        let (amount0, amount1) = self
            .positions
            .collect(&key, amount0_requested, amount1_requested);

        debug!(%owner, tick_lower, tick_upper, %amount0, %amount1, "collected");
        Ok((amount0, amount1))
    }

    fn check_ticks(&self, tick_lower: i32, tick_upper: i32) -> Result<(), ValidationError> {
        if tick_lower >= tick_upper {
            return Err(ValidationError::TickOrder {
                lower: tick_lower,
                upper: tick_upper,
            });
        }
        for tick in [tick_lower, tick_upper] {
            if !(MIN_TICK..=MAX_TICK).contains(&tick) {
                return Err(ValidationError::TickOutOfBounds(tick));
            }
            if tick % self.tick_spacing != 0 {
                return Err(ValidationError::TickNotAligned {
                    tick,
                    tick_spacing: self.tick_spacing,
                });
            }
        }
        Ok(())
    }

    /// Validates a liquidity change and computes every value it writes.
    /// Nothing is mutated.
    fn prepare_position_change(
        &self,
        owner: Address,
        tick_lower: i32,
        tick_upper: i32,
        liquidity_delta: i128,
    ) -> Result<PositionChange, Error> {
        let slot0 = self.slot0()?;
        self.check_ticks(tick_lower, tick_upper)?;

        let key = PositionKey::new(owner, tick_lower, tick_upper);
        let (fg0, fg1) = (self.fee_growth_global_0_x128, self.fee_growth_global_1_x128);

        let lower = self
            .ticks
            .preview_update(tick_lower, slot0.tick, liquidity_delta, fg0, fg1, false)?;
        let upper = self
            .ticks
            .preview_update(tick_upper, slot0.tick, liquidity_delta, fg0, fg1, true)?;

        let (inside0, inside1) = fee_growth_inside(
            &lower.0,
            &upper.0,
            tick_lower,
            tick_upper,
            slot0.tick,
            fg0,
            fg1,
        );
        let position = self
            .positions
            .preview_update(&key, liquidity_delta, inside0, inside1)?;

        let sqrt_ratio_lower = get_sqrt_ratio_at_tick(tick_lower)?;
        let sqrt_ratio_upper = get_sqrt_ratio_at_tick(tick_upper)?;
        let mut liquidity = self.liquidity;

        let (amount0, amount1) = if liquidity_delta == 0 {
            (I256::ZERO, I256::ZERO)
        } else if slot0.tick < tick_lower {
            // range entirely above the price: all token0
            (
                get_amount_0_delta(sqrt_ratio_lower, sqrt_ratio_upper, liquidity_delta)?,
                I256::ZERO,
            )
        } else if slot0.tick < tick_upper {
            liquidity = add_delta(liquidity, liquidity_delta)?;
            (
                get_amount_0_delta(slot0.sqrt_price_x96, sqrt_ratio_upper, liquidity_delta)?,
                get_amount_1_delta(sqrt_ratio_lower, slot0.sqrt_price_x96, liquidity_delta)?,
            )
        } else {
            // range entirely below the price: all token1
            (
                I256::ZERO,
                get_amount_1_delta(sqrt_ratio_lower, sqrt_ratio_upper, liquidity_delta)?,
            )
        };

        Ok(PositionChange {
            key,
            lower,
            upper,
            position,
            liquidity,
            amount0,
            amount1,
        })
    }

    fn apply_position_change(&mut self, change: PositionChange, clear: bool) -> Result<(), Error> {
        let PositionChange {
            key,
            lower: (lower, flipped_lower),
            upper: (upper, flipped_upper),
            position,
            liquidity,
            ..
        } = change;

        if flipped_lower {
            self.bitmap.flip_tick(key.tick_lower, self.tick_spacing)?;
        }
        if flipped_upper {
            self.bitmap.flip_tick(key.tick_upper, self.tick_spacing)?;
        }

        // a flipped tick on a burn has lost its last reference
        for (tick, info, flipped) in [
            (key.tick_lower, lower, flipped_lower),
            (key.tick_upper, upper, flipped_upper),
        ] {
            if clear && flipped {
                self.ticks.clear(tick);
            } else {
                self.ticks.insert(tick, info);
            }
        }

        self.positions.insert(key, position);
        self.liquidity = liquidity;
        Ok(())
    }
}
