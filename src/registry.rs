//! Explicitly owned collection of pools with an append-only journal.
//!
//! The registry is the persistence collaborator of the engine: it loads a
//! pool by id, records every successful mutation together with the state
//! it produced, and forks pools for branching simulations. Failed
//! operations leave both the pool and the journal untouched.

use crate::FastMap;
use crate::config::PoolConfig;
use crate::error::{Error, ValidationError};
use crate::pool::core_pool::{CorePool, PoolSnapshot};
use crate::pool::swap::SwapResult;
use alloy_primitives::{Address, I256, U256};
use core::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolId(pub u64);

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A successful operation as recorded in the journal.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PoolOperation {
    Create {
        config: PoolConfig,
    },
    Fork {
        source: PoolId,
    },
    Initialize {
        sqrt_price_x96: U256,
    },
    Mint {
        owner: Address,
        tick_lower: i32,
        tick_upper: i32,
        amount: u128,
        amount0: U256,
        amount1: U256,
    },
    Burn {
        owner: Address,
        tick_lower: i32,
        tick_upper: i32,
        amount: u128,
        amount0: U256,
        amount1: U256,
    },
    Collect {
        owner: Address,
        tick_lower: i32,
        tick_upper: i32,
        amount0: U256,
        amount1: U256,
    },
    Swap {
        zero_for_one: bool,
        amount_specified: I256,
        sqrt_price_limit_x96: Option<U256>,
        result: SwapResult,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JournalEntry {
    /// Position in the registry-wide journal, starting at zero.
    pub sequence: u64,
    pub pool_id: PoolId,
    pub operation: PoolOperation,
    /// Pool state right after the operation.
    pub snapshot: PoolSnapshot,
}

#[derive(Debug, Clone, Default)]
pub struct PoolRegistry {
    pools: FastMap<PoolId, CorePool>,
    next_id: u64,
    journal: Vec<JournalEntry>,
}

impl PoolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    pub fn pool(&self, id: PoolId) -> Option<&CorePool> {
        self.pools.get(&id)
    }

    pub fn snapshot(&self, id: PoolId) -> Result<PoolSnapshot, Error> {
        self.get(id).map(CorePool::snapshot)
    }

    pub fn journal(&self) -> &[JournalEntry] {
        &self.journal
    }

    pub fn journal_for(&self, id: PoolId) -> impl Iterator<Item = &JournalEntry> + '_ {
        self.journal.iter().filter(move |entry| entry.pool_id == id)
    }

    pub fn create_pool(&mut self, config: PoolConfig) -> PoolId {
        let id = self.allocate_id();
        let pool = CorePool::new(config.clone());
        let snapshot = pool.snapshot();
        self.pools.insert(id, pool);
        self.record(id, PoolOperation::Create { config }, snapshot);
        debug!(%id, "pool created");
        id
    }

    /// Deep-copies pool `id` under a new id. The two pools evolve
    /// independently afterwards.
    pub fn fork(&mut self, id: PoolId) -> Result<PoolId, Error> {
        let pool = self.get(id)?.clone();
        let fork_id = self.allocate_id();
        let snapshot = pool.snapshot();
        self.pools.insert(fork_id, pool);
        self.record(fork_id, PoolOperation::Fork { source: id }, snapshot);
        debug!(source = %id, fork = %fork_id, "pool forked");
        Ok(fork_id)
    }

    pub fn initialize(&mut self, id: PoolId, sqrt_price_x96: U256) -> Result<(), Error> {
        let pool = self.get_mut(id)?;
        pool.initialize(sqrt_price_x96)?;
        let snapshot = pool.snapshot();
        self.record(id, PoolOperation::Initialize { sqrt_price_x96 }, snapshot);
        Ok(())
    }

    pub fn mint(
        &mut self,
        id: PoolId,
        owner: Address,
        tick_lower: i32,
        tick_upper: i32,
        amount: u128,
    ) -> Result<(U256, U256), Error> {
        let pool = self.get_mut(id)?;
        let (amount0, amount1) = pool.mint(owner, tick_lower, tick_upper, amount)?;
        let snapshot = pool.snapshot();
        self.record(
            id,
            PoolOperation::Mint {
                owner,
                tick_lower,
                tick_upper,
                amount,
                amount0,
                amount1,
            },
            snapshot,
        );
        Ok((amount0, amount1))
    }

    pub fn burn(
        &mut self,
        id: PoolId,
        owner: Address,
        tick_lower: i32,
        tick_upper: i32,
        amount: u128,
    ) -> Result<(U256, U256), Error> {
        let pool = self.get_mut(id)?;
        let (amount0, amount1) = pool.burn(owner, tick_lower, tick_upper, amount)?;
        let snapshot = pool.snapshot();
        self.record(
            id,
            PoolOperation::Burn {
                owner,
                tick_lower,
                tick_upper,
                amount,
                amount0,
                amount1,
            },
            snapshot,
        );
        Ok((amount0, amount1))
    }

    pub fn collect(
        &mut self,
        id: PoolId,
        owner: Address,
        tick_lower: i32,
        tick_upper: i32,
        amount0_requested: U256,
        amount1_requested: U256,
    ) -> Result<(U256, U256), Error> {
        let pool = self.get_mut(id)?;
        let (amount0, amount1) = pool.collect(
            owner,
            tick_lower,
            tick_upper,
            amount0_requested,
            amount1_requested,
        )?;
        let snapshot = pool.snapshot();
        self.record(
            id,
            PoolOperation::Collect {
                owner,
                tick_lower,
                tick_upper,
                amount0,
                amount1,
            },
            snapshot,
        );
        Ok((amount0, amount1))
    }

    pub fn swap(
        &mut self,
        id: PoolId,
        zero_for_one: bool,
        amount_specified: I256,
        sqrt_price_limit_x96: Option<U256>,
    ) -> Result<SwapResult, Error> {
        let pool = self.get_mut(id)?;
        let result = pool.swap(zero_for_one, amount_specified, sqrt_price_limit_x96)?;
        let snapshot = pool.snapshot();
        self.record(
            id,
            PoolOperation::Swap {
                zero_for_one,
                amount_specified,
                sqrt_price_limit_x96,
                result,
            },
            snapshot,
        );
        Ok(result)
    }

    /// Previews a swap on pool `id`. Nothing is journaled.
    pub fn quote_swap(
        &self,
        id: PoolId,
        zero_for_one: bool,
        amount_specified: I256,
        sqrt_price_limit_x96: Option<U256>,
    ) -> Result<SwapResult, Error> {
        self.get(id)?
            .quote_swap(zero_for_one, amount_specified, sqrt_price_limit_x96)
    }

    fn get(&self, id: PoolId) -> Result<&CorePool, Error> {
        self.pools
            .get(&id)
            .ok_or(ValidationError::UnknownPool(id).into())
    }

    fn get_mut(&mut self, id: PoolId) -> Result<&mut CorePool, Error> {
        self.pools
            .get_mut(&id)
            .ok_or(ValidationError::UnknownPool(id).into())
    }

    fn allocate_id(&mut self) -> PoolId {
        let id = PoolId(self.next_id);
        self.next_id += 1;
        id
    }

    fn record(&mut self, pool_id: PoolId, operation: PoolOperation, snapshot: PoolSnapshot) {
        let sequence = self.journal.len() as u64;
        self.journal.push(JournalEntry {
            sequence,
            pool_id,
            operation,
            snapshot,
        });
    }
}
