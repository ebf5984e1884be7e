use crate::FastMap;
use crate::error::{Error, InvariantViolation};
use crate::math::liquidity_math::add_delta;
use crate::math::tick_math::{MAX_TICK, MIN_TICK};
use alloy_primitives::U256;

/// Per-tick liquidity and fee bookkeeping.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickInfo {
    /// Total liquidity of all positions using this tick as a boundary.
    pub liquidity_gross: u128,
    /// Liquidity added when the price crosses this tick left to right.
    pub liquidity_net: i128,
    /// Fee growth on the side of the tick away from the current price.
    pub fee_growth_outside_0_x128: U256,
    pub fee_growth_outside_1_x128: U256,
    pub initialized: bool,
}

/// Largest `liquidity_gross` a single tick may carry so the pool's total
/// liquidity can never overflow `u128`.
pub fn max_liquidity_per_tick(tick_spacing: i32) -> u128 {
    let min_tick = (MIN_TICK / tick_spacing) * tick_spacing;
    let max_tick = (MAX_TICK / tick_spacing) * tick_spacing;
    let num_ticks = ((max_tick - min_tick) / tick_spacing) as u128 + 1;
    u128::MAX / num_ticks
}

/// Fee growth per unit of liquidity accrued while the price was inside
/// `[tick_lower, tick_upper)`. Values are modular, only differences of
/// two readings are meaningful.
pub fn fee_growth_inside(
    lower: &TickInfo,
    upper: &TickInfo,
    tick_lower: i32,
    tick_upper: i32,
    tick_current: i32,
    fee_growth_global_0_x128: U256,
    fee_growth_global_1_x128: U256,
) -> (U256, U256) {
    let (below_0, below_1) = if tick_current >= tick_lower {
        (lower.fee_growth_outside_0_x128, lower.fee_growth_outside_1_x128)
    } else {
        (
            fee_growth_global_0_x128.wrapping_sub(lower.fee_growth_outside_0_x128),
            fee_growth_global_1_x128.wrapping_sub(lower.fee_growth_outside_1_x128),
        )
    };

    let (above_0, above_1) = if tick_current < tick_upper {
        (upper.fee_growth_outside_0_x128, upper.fee_growth_outside_1_x128)
    } else {
        (
            fee_growth_global_0_x128.wrapping_sub(upper.fee_growth_outside_0_x128),
            fee_growth_global_1_x128.wrapping_sub(upper.fee_growth_outside_1_x128),
        )
    };

    (
        fee_growth_global_0_x128
            .wrapping_sub(below_0)
            .wrapping_sub(above_0),
        fee_growth_global_1_x128
            .wrapping_sub(below_1)
            .wrapping_sub(above_1),
    )
}

/// Sparse map of ticks referenced by at least one position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickLedger {
    ticks: FastMap<i32, TickInfo>,
    max_liquidity_per_tick: u128,
}

impl TickLedger {
    pub fn new(tick_spacing: i32) -> Self {
        Self {
            ticks: FastMap::default(),
            max_liquidity_per_tick: max_liquidity_per_tick(tick_spacing),
        }
    }

    #[inline]
    pub fn get(&self, tick: i32) -> Option<&TickInfo> {
        self.ticks.get(&tick)
    }

    pub fn max_liquidity_per_tick(&self) -> u128 {
        self.max_liquidity_per_tick
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    /// Net liquidity of `tick`, zero if it was never referenced.
    pub fn liquidity_net(&self, tick: i32) -> i128 {
        self.ticks.get(&tick).map_or(0, |info| info.liquidity_net)
    }

    /// Computes the `TickInfo` [`TickLedger::update`] would store for
    /// `tick`, and whether the tick flips, without writing anything.
    pub fn preview_update(
        &self,
        tick: i32,
        tick_current: i32,
        liquidity_delta: i128,
        fee_growth_global_0_x128: U256,
        fee_growth_global_1_x128: U256,
        upper: bool,
    ) -> Result<(TickInfo, bool), Error> {
        let mut info = self.ticks.get(&tick).copied().unwrap_or_default();

        let gross_before = info.liquidity_gross;
        let gross_after = add_delta(gross_before, liquidity_delta)?;
        if gross_after > self.max_liquidity_per_tick {
            return Err(InvariantViolation::TickLiquidityCap {
                tick,
                gross: gross_after,
                max: self.max_liquidity_per_tick,
            }
            .into());
        }

        info.liquidity_net = if upper {
            info.liquidity_net.checked_sub(liquidity_delta)
        } else {
            info.liquidity_net.checked_add(liquidity_delta)
        }
        .ok_or(InvariantViolation::LiquidityNetOverflow(tick))?;

        // a tick referenced for the first time at or below the current tick
        // assumes all fee growth so far happened below it
        if gross_before == 0 && tick <= tick_current {
            info.fee_growth_outside_0_x128 = fee_growth_global_0_x128;
            info.fee_growth_outside_1_x128 = fee_growth_global_1_x128;
        }
        info.liquidity_gross = gross_after;
        info.initialized = gross_after != 0;

        Ok((info, (gross_after == 0) != (gross_before == 0)))
    }

    /// Applies a liquidity change to `tick` as the lower (`upper = false`)
    /// or upper boundary of a position and returns whether the tick flipped
    /// between initialized and uninitialized.
    pub fn update(
        &mut self,
        tick: i32,
        tick_current: i32,
        liquidity_delta: i128,
        fee_growth_global_0_x128: U256,
        fee_growth_global_1_x128: U256,
        upper: bool,
    ) -> Result<bool, Error> {
        let (info, flipped) = self.preview_update(
            tick,
            tick_current,
            liquidity_delta,
            fee_growth_global_0_x128,
            fee_growth_global_1_x128,
            upper,
        )?;
        self.ticks.insert(tick, info);
        Ok(flipped)
    }

    /// Stores a value obtained from [`TickLedger::preview_update`].
    pub(crate) fn insert(&mut self, tick: i32, info: TickInfo) {
        self.ticks.insert(tick, info);
    }

    /// Flips the outside fee growth of `tick` as the price moves across it
    /// and returns its net liquidity.
    pub fn cross(
        &mut self,
        tick: i32,
        fee_growth_global_0_x128: U256,
        fee_growth_global_1_x128: U256,
    ) -> i128 {
        match self.ticks.get_mut(&tick) {
            Some(info) => {
                info.fee_growth_outside_0_x128 =
                    fee_growth_global_0_x128.wrapping_sub(info.fee_growth_outside_0_x128);
                info.fee_growth_outside_1_x128 =
                    fee_growth_global_1_x128.wrapping_sub(info.fee_growth_outside_1_x128);
                info.liquidity_net
            }
            None => 0,
        }
    }

    pub fn clear(&mut self, tick: i32) {
        self.ticks.remove(&tick);
    }

    /// Fee growth inside `[tick_lower, tick_upper)` from the stored ticks.
    pub fn fee_growth_inside(
        &self,
        tick_lower: i32,
        tick_upper: i32,
        tick_current: i32,
        fee_growth_global_0_x128: U256,
        fee_growth_global_1_x128: U256,
    ) -> (U256, U256) {
        fee_growth_inside(
            &self.ticks.get(&tick_lower).copied().unwrap_or_default(),
            &self.ticks.get(&tick_upper).copied().unwrap_or_default(),
            tick_lower,
            tick_upper,
            tick_current,
            fee_growth_global_0_x128,
            fee_growth_global_1_x128,
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, &TickInfo)> + '_ {
        self.ticks.iter().map(|(&tick, info)| (tick, info))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u(v: u64) -> U256 {
        U256::from(v)
    }

    #[test]
    fn max_liquidity_per_tick_for_fee_tiers() {
        assert_eq!(
            max_liquidity_per_tick(10),
            1917569901783203986719870431555990
        );
        assert_eq!(
            max_liquidity_per_tick(60),
            11505743598341114571880798222544994
        );
        assert_eq!(
            max_liquidity_per_tick(200),
            38350317471085141830651933667504588
        );
    }

    #[test]
    fn max_liquidity_per_tick_for_entire_range() {
        assert_eq!(max_liquidity_per_tick(887272), u128::MAX / 3);
    }

    #[test]
    fn fee_growth_inside_uninitialized_ticks_in_range() {
        let ledger = TickLedger::new(1);
        assert_eq!(ledger.fee_growth_inside(-2, 2, 0, u(15), u(15)), (u(15), u(15)));
    }

    #[test]
    fn fee_growth_inside_uninitialized_ticks_out_of_range() {
        let ledger = TickLedger::new(1);
        assert_eq!(ledger.fee_growth_inside(-2, 2, 4, u(15), u(15)), (U256::ZERO, U256::ZERO));
        assert_eq!(ledger.fee_growth_inside(-2, 2, -4, u(15), u(15)), (U256::ZERO, U256::ZERO));
    }

    #[test]
    fn fee_growth_inside_subtracts_outside_values() {
        let mut ledger = TickLedger::new(1);
        ledger.ticks.insert(
            2,
            TickInfo {
                fee_growth_outside_0_x128: u(2),
                fee_growth_outside_1_x128: u(3),
                liquidity_gross: 1,
                initialized: true,
                ..Default::default()
            },
        );
        assert_eq!(ledger.fee_growth_inside(-2, 2, 0, u(15), u(15)), (u(13), u(12)));

        ledger.ticks.insert(
            -2,
            TickInfo {
                fee_growth_outside_0_x128: u(2),
                fee_growth_outside_1_x128: u(3),
                liquidity_gross: 1,
                initialized: true,
                ..Default::default()
            },
        );
        assert_eq!(ledger.fee_growth_inside(-2, 2, 0, u(15), u(15)), (u(11), u(9)));
    }

    #[test]
    fn fee_growth_inside_wraps_on_underflow() {
        let mut ledger = TickLedger::new(1);
        ledger.ticks.insert(
            -2,
            TickInfo {
                fee_growth_outside_0_x128: U256::MAX - u(3),
                fee_growth_outside_1_x128: U256::MAX - u(2),
                liquidity_gross: 1,
                initialized: true,
                ..Default::default()
            },
        );
        ledger.ticks.insert(
            2,
            TickInfo {
                fee_growth_outside_0_x128: u(3),
                fee_growth_outside_1_x128: u(5),
                liquidity_gross: 1,
                initialized: true,
                ..Default::default()
            },
        );
        assert_eq!(ledger.fee_growth_inside(-2, 2, 0, u(15), u(15)), (u(16), u(13)));
    }

    #[test]
    fn update_flips_on_first_and_last_reference() {
        let mut ledger = TickLedger::new(1);
        assert!(ledger.update(0, 0, 1, U256::ZERO, U256::ZERO, false).unwrap());
        assert!(!ledger.update(0, 0, 1, U256::ZERO, U256::ZERO, false).unwrap());
        assert!(!ledger.update(0, 0, -1, U256::ZERO, U256::ZERO, false).unwrap());
        assert!(ledger.update(0, 0, -1, U256::ZERO, U256::ZERO, false).unwrap());
        assert!(!ledger.get(0).unwrap().initialized);
    }

    #[test]
    fn update_rejects_gross_above_cap() {
        let mut ledger = TickLedger {
            ticks: FastMap::default(),
            max_liquidity_per_tick: 3,
        };
        ledger.update(0, 0, 2, U256::ZERO, U256::ZERO, false).unwrap();
        ledger.update(0, 0, 1, U256::ZERO, U256::ZERO, true).unwrap();
        let err = ledger.update(0, 0, 1, U256::ZERO, U256::ZERO, false);
        assert_eq!(
            err,
            Err(Error::Invariant(InvariantViolation::TickLiquidityCap {
                tick: 0,
                gross: 4,
                max: 3
            }))
        );
        assert_eq!(ledger.get(0).unwrap().liquidity_gross, 3);
    }

    #[test]
    fn update_rejects_gross_underflow() {
        let mut ledger = TickLedger::new(1);
        ledger.update(0, 0, 2, U256::ZERO, U256::ZERO, false).unwrap();
        assert_eq!(
            ledger.update(0, 0, -3, U256::ZERO, U256::ZERO, false),
            Err(Error::Invariant(InvariantViolation::LiquidityUnderflow))
        );
    }

    #[test]
    fn update_net_for_lower_and_upper() {
        let mut ledger = TickLedger::new(1);
        ledger.update(0, 0, 2, U256::ZERO, U256::ZERO, false).unwrap();
        ledger.update(0, 0, 1, U256::ZERO, U256::ZERO, true).unwrap();
        ledger.update(0, 0, 3, U256::ZERO, U256::ZERO, true).unwrap();
        ledger.update(0, 0, 1, U256::ZERO, U256::ZERO, false).unwrap();

        let info = ledger.get(0).unwrap();
        assert_eq!(info.liquidity_gross, 7);
        assert_eq!(info.liquidity_net, 2 - 1 - 3 + 1);
    }

    #[test]
    fn update_assumes_growth_below_for_ticks_at_or_below_current() {
        let mut ledger = TickLedger::new(1);
        ledger.update(1, 1, 1, u(1), u(2), false).unwrap();
        let info = ledger.get(1).unwrap();
        assert_eq!(info.fee_growth_outside_0_x128, u(1));
        assert_eq!(info.fee_growth_outside_1_x128, u(2));

        ledger.update(2, 1, 1, u(1), u(2), false).unwrap();
        let info = ledger.get(2).unwrap();
        assert_eq!(info.fee_growth_outside_0_x128, U256::ZERO);
        assert_eq!(info.fee_growth_outside_1_x128, U256::ZERO);
    }

    #[test]
    fn update_keeps_outside_growth_of_initialized_tick() {
        let mut ledger = TickLedger::new(1);
        ledger.update(1, 1, 1, u(1), u(2), false).unwrap();
        ledger.update(1, 1, 1, u(6), u(7), false).unwrap();
        let info = ledger.get(1).unwrap();
        assert_eq!(info.fee_growth_outside_0_x128, u(1));
        assert_eq!(info.fee_growth_outside_1_x128, u(2));
    }

    #[test]
    fn cross_flips_outside_growth() {
        let mut ledger = TickLedger::new(1);
        ledger.ticks.insert(
            2,
            TickInfo {
                fee_growth_outside_0_x128: u(1),
                fee_growth_outside_1_x128: u(2),
                liquidity_gross: 3,
                liquidity_net: 4,
                initialized: true,
            },
        );
        assert_eq!(ledger.cross(2, u(7), u(9)), 4);
        let info = ledger.get(2).unwrap();
        assert_eq!(info.fee_growth_outside_0_x128, u(6));
        assert_eq!(info.fee_growth_outside_1_x128, u(7));
        assert_eq!(info.liquidity_gross, 3);

        // crossing back restores the original values
        ledger.cross(2, u(7), u(9));
        let info = ledger.get(2).unwrap();
        assert_eq!(info.fee_growth_outside_0_x128, u(1));
        assert_eq!(info.fee_growth_outside_1_x128, u(2));
    }

    #[test]
    fn preview_does_not_write() {
        let mut ledger = TickLedger::new(1);
        ledger.update(0, 0, 5, u(1), u(1), false).unwrap();
        let before = ledger.clone();

        let (info, flipped) = ledger.preview_update(0, 0, -5, u(9), u(9), false).unwrap();
        assert!(flipped);
        assert_eq!(info.liquidity_gross, 0);
        assert!(!info.initialized);
        assert_eq!(ledger, before);
    }

    #[test]
    fn clear_removes_tick() {
        let mut ledger = TickLedger::new(1);
        ledger.update(2, 0, 3, u(1), u(2), false).unwrap();
        ledger.clear(2);
        assert!(ledger.get(2).is_none());
        assert!(ledger.is_empty());
    }
}
