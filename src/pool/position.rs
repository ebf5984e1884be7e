use crate::FastMap;
use crate::Q128;
use crate::error::{Error, MathError, ValidationError};
use crate::math::liquidity_math::add_delta;
use crate::math::math_helpers::mul_div;
use alloy_primitives::{Address, U256};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PositionKey {
    pub owner: Address,
    pub tick_lower: i32,
    pub tick_upper: i32,
}

impl PositionKey {
    pub fn new(owner: Address, tick_lower: i32, tick_upper: i32) -> Self {
        Self {
            owner,
            tick_lower,
            tick_upper,
        }
    }
}

/// Liquidity held by one owner in one tick range, together with the fee
/// growth it has already been credited for.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PositionInfo {
    pub liquidity: u128,
    pub fee_growth_inside_0_last_x128: U256,
    pub fee_growth_inside_1_last_x128: U256,
    /// Tokens owed to the owner: accrued fees plus burned principal.
    pub tokens_owed_0: U256,
    pub tokens_owed_1: U256,
}

impl PositionInfo {
    /// Fees accrued since the last snapshot of inside fee growth.
    fn accrued_fees(
        &self,
        fee_growth_inside_0_x128: U256,
        fee_growth_inside_1_x128: U256,
    ) -> Result<(U256, U256), Error> {
        let liquidity = U256::from(self.liquidity);
        let fees_0 = mul_div(
            fee_growth_inside_0_x128.wrapping_sub(self.fee_growth_inside_0_last_x128),
            liquidity,
            Q128,
        )?;
        let fees_1 = mul_div(
            fee_growth_inside_1_x128.wrapping_sub(self.fee_growth_inside_1_last_x128),
            liquidity,
            Q128,
        )?;
        Ok((fees_0, fees_1))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PositionLedger {
    positions: FastMap<PositionKey, PositionInfo>,
}

impl PositionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, key: &PositionKey) -> Option<&PositionInfo> {
        self.positions.get(key)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Computes the position [`PositionLedger::update`] would store,
    /// without writing it.
    pub fn preview_update(
        &self,
        key: &PositionKey,
        liquidity_delta: i128,
        fee_growth_inside_0_x128: U256,
        fee_growth_inside_1_x128: U256,
    ) -> Result<PositionInfo, Error> {
        let current = self.positions.get(key).copied().unwrap_or_default();

        let liquidity = if liquidity_delta == 0 {
            if current.liquidity == 0 {
                return Err(ValidationError::EmptyPosition.into());
            }
            current.liquidity
        } else {
            add_delta(current.liquidity, liquidity_delta)?
        };

        let (fees_0, fees_1) =
            current.accrued_fees(fee_growth_inside_0_x128, fee_growth_inside_1_x128)?;

        Ok(PositionInfo {
            liquidity,
            fee_growth_inside_0_last_x128: fee_growth_inside_0_x128,
            fee_growth_inside_1_last_x128: fee_growth_inside_1_x128,
            tokens_owed_0: current
                .tokens_owed_0
                .checked_add(fees_0)
                .ok_or(MathError::Overflow)?,
            tokens_owed_1: current
                .tokens_owed_1
                .checked_add(fees_1)
                .ok_or(MathError::Overflow)?,
        })
    }

    /// Credits fees accrued since the last update, applies
    /// `liquidity_delta` and records the current inside fee growth.
    ///
    /// A zero delta on a position without liquidity is rejected since
    /// there is nothing to refresh.
    pub fn update(
        &mut self,
        key: PositionKey,
        liquidity_delta: i128,
        fee_growth_inside_0_x128: U256,
        fee_growth_inside_1_x128: U256,
    ) -> Result<PositionInfo, Error> {
        let next = self.preview_update(
            &key,
            liquidity_delta,
            fee_growth_inside_0_x128,
            fee_growth_inside_1_x128,
        )?;
        self.positions.insert(key, next);
        Ok(next)
    }

    /// Stores a value obtained from [`PositionLedger::preview_update`].
    pub(crate) fn insert(&mut self, key: PositionKey, info: PositionInfo) {
        self.positions.insert(key, info);
    }

    /// Pays out up to the requested amounts from the owed balances. A
    /// position that does not exist pays nothing.
    pub fn collect(
        &mut self,
        key: &PositionKey,
        amount0_requested: U256,
        amount1_requested: U256,
    ) -> (U256, U256) {
        let Some(position) = self.positions.get_mut(key) else {
            return (U256::ZERO, U256::ZERO);
        };

        let amount0 = amount0_requested.min(position.tokens_owed_0);
        let amount1 = amount1_requested.min(position.tokens_owed_1);
        position.tokens_owed_0 -= amount0;
        position.tokens_owed_1 -= amount1;

        if position.liquidity == 0
            && position.tokens_owed_0.is_zero()
            && position.tokens_owed_1.is_zero()
        {
            self.positions.remove(key);
        }

        (amount0, amount1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PositionKey, &PositionInfo)> + '_ {
        self.positions.iter()
    }
}
