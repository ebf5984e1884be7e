//! Tick-indexed concentrated-liquidity pool engine in pure Rust.
//!
//! This crate exposes:
//! - Low‑level integer math (`math::*`) for ticks, sqrt prices, swap steps
//!   and the tick bitmap, bit-exact with the Uniswap V3 reference contracts.
//! - A stateful [`CorePool`] implementing `initialize`, `mint`, `burn`,
//!   `collect` and `swap` with tick and position bookkeeping.
//! - A [`PoolRegistry`] that owns many pools by id, journals every
//!   successful mutation and can fork a pool for branching simulations.
//!
//! # Examples
//!
//! ## Pure math
//! ```
//! use clmm_core_pool::{math::tick_math, RESOLUTION, U256};
//!
//! let sqrt_price = tick_math::get_sqrt_ratio_at_tick(0).unwrap();
//! assert_eq!(sqrt_price, U256::from(1u8) << 96);
//! assert_eq!(RESOLUTION, 96);
//! ```
//!
//! ## Providing liquidity and swapping
//! ```
//! use clmm_core_pool::{Address, CorePool, FeeTier, PoolConfig, I256, U256};
//!
//! let mut pool = CorePool::new(PoolConfig::new(FeeTier::Medium, "USDC", "ETH"));
//! pool.initialize(U256::from(1u8) << 96).unwrap();
//!
//! let owner = Address::repeat_byte(0x11);
//! let (amount0, amount1) = pool
//!     .mint(owner, -887220, 887220, 2_000_000_000_000_000_000)
//!     .unwrap();
//! assert!(amount0 > U256::ZERO && amount1 > U256::ZERO);
//!
//! let result = pool
//!     .swap(true, I256::from_raw(U256::from(10_000_000_000_000_000u64)), None)
//!     .unwrap();
//! assert!(result.amount1.is_negative());
//! ```

pub use alloy_primitives::{Address, I256, U256};

pub mod config;
pub mod error;
mod hash;
pub mod math;
pub mod pool;
pub mod registry;

pub use config::{FeeTier, PoolConfig};
pub use error::{Error, InvariantViolation, ValidationError};
pub use hash::FastMap;
pub use pool::core_pool::{CorePool, PoolSnapshot, Slot0};
pub use pool::position::{PositionInfo, PositionKey};
pub use pool::swap::SwapResult;
pub use pool::tick::TickInfo;
pub use registry::{JournalEntry, PoolId, PoolOperation, PoolRegistry};

const U256_1: U256 = U256::from_limbs([1, 0, 0, 0]);
const U256_127: U256 = U256::from_limbs([127, 0, 0, 0]);
const U256_128: U256 = U256::from_limbs([128, 0, 0, 0]);

/// 2^160 - 1, the widest value a sqrt price may take.
const U160_MAX: U256 = U256::from_limbs([u64::MAX, u64::MAX, u32::MAX as u64, 0]);
const U256_E6: U256 = U256::from_limbs([1_000_000, 0, 0, 0]);

pub const RESOLUTION: u8 = 96;
pub const Q96: U256 = U256::from_limbs([0, 4294967296, 0, 0]);
pub const Q128: U256 = U256::from_limbs([0, 0, 1, 0]);
