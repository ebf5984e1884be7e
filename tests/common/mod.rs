#![allow(dead_code)]

use alloy_primitives::address;
use clmm_core_pool::math::sqrt_price_math::encode_price_sqrt;
use clmm_core_pool::math::tick_math::{MAX_SQRT_RATIO, MAX_TICK, MIN_SQRT_RATIO, MIN_TICK};
use clmm_core_pool::pool::tick::max_liquidity_per_tick;
use clmm_core_pool::{Address, CorePool, FeeTier, I256, PoolConfig, U256};

pub const E18: u128 = 1_000_000_000_000_000_000;
pub const OWNER: Address = address!("0x0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a");

pub fn min_tick(tick_spacing: i32) -> i32 {
    (MIN_TICK / tick_spacing) * tick_spacing
}

pub fn max_tick(tick_spacing: i32) -> i32 {
    (MAX_TICK / tick_spacing) * tick_spacing
}

pub fn price(reserve1: u128, reserve0: u128) -> U256 {
    encode_price_sqrt(reserve1, reserve0).unwrap()
}

pub fn exact_in(amount: u128) -> I256 {
    I256::try_from(amount).unwrap()
}

pub fn exact_out(amount: u128) -> I256 {
    -I256::try_from(amount).unwrap()
}

#[derive(Debug, Clone, Copy)]
pub struct PositionFixture {
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub liquidity: u128,
}

#[derive(Debug, Clone)]
pub struct PoolFixture {
    pub description: &'static str,
    pub fee_tier: FeeTier,
    pub starting_price: U256,
    pub positions: Vec<PositionFixture>,
}

impl PoolFixture {
    /// Builds the initialized pool with every position minted by [`OWNER`].
    /// Returns the pool and the token amounts deposited.
    pub fn build(&self) -> (CorePool, U256, U256) {
        let mut pool = CorePool::new(PoolConfig::new(self.fee_tier, "TOKEN0", "TOKEN1"));
        pool.initialize(self.starting_price).unwrap();
        let (mut deposited0, mut deposited1) = (U256::ZERO, U256::ZERO);
        for p in &self.positions {
            let (amount0, amount1) = pool
                .mint(OWNER, p.tick_lower, p.tick_upper, p.liquidity)
                .unwrap_or_else(|e| panic!("{}: mint {p:?} failed: {e:?}", self.description));
            deposited0 += amount0;
            deposited1 += amount1;
        }
        (pool, deposited0, deposited1)
    }

    /// Liquidity the fixture positions put in range at `tick`.
    pub fn active_liquidity(&self, tick: i32) -> u128 {
        self.positions
            .iter()
            .filter(|p| p.tick_lower <= tick && tick < p.tick_upper)
            .map(|p| p.liquidity)
            .sum()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SwapCase {
    pub description: &'static str,
    pub zero_for_one: bool,
    /// Positive for exact input, negative for exact output.
    pub amount: I256,
    pub sqrt_price_limit_x96: Option<U256>,
}

fn full_range(fee_tier: FeeTier, liquidity: u128) -> PositionFixture {
    PositionFixture {
        tick_lower: min_tick(fee_tier.tick_spacing()),
        tick_upper: max_tick(fee_tier.tick_spacing()),
        liquidity,
    }
}

fn full_range_pool(
    description: &'static str,
    fee_tier: FeeTier,
    starting_price: U256,
) -> PoolFixture {
    PoolFixture {
        description,
        fee_tier,
        starting_price,
        positions: vec![full_range(fee_tier, 2 * E18)],
    }
}

pub fn pool_fixtures() -> Vec<PoolFixture> {
    let medium = FeeTier::Medium;
    let spacing = medium.tick_spacing();
    vec![
        full_range_pool("low fee, 1:1 price, 2e18 max range liquidity", FeeTier::Low, price(1, 1)),
        full_range_pool("medium fee, 1:1 price, 2e18 max range liquidity", medium, price(1, 1)),
        full_range_pool(
            "high fee, 1:1 price, 2e18 max range liquidity",
            FeeTier::High,
            price(1, 1),
        ),
        full_range_pool("medium fee, 10:1 price, 2e18 max range liquidity", medium, price(10, 1)),
        full_range_pool("medium fee, 1:10 price, 2e18 max range liquidity", medium, price(1, 10)),
        PoolFixture {
            description: "medium fee, 1:1 price, 0 liquidity, all liquidity around current price",
            fee_tier: medium,
            starting_price: price(1, 1),
            positions: vec![
                PositionFixture {
                    tick_lower: min_tick(spacing),
                    tick_upper: -spacing,
                    liquidity: 2 * E18,
                },
                PositionFixture {
                    tick_lower: spacing,
                    tick_upper: max_tick(spacing),
                    liquidity: 2 * E18,
                },
            ],
        },
        PoolFixture {
            description: "medium fee, 1:1 price, additional liquidity around current price",
            fee_tier: medium,
            starting_price: price(1, 1),
            positions: vec![
                full_range(medium, 2 * E18),
                PositionFixture {
                    tick_lower: min_tick(spacing),
                    tick_upper: -spacing,
                    liquidity: 2 * E18,
                },
                PositionFixture {
                    tick_lower: spacing,
                    tick_upper: max_tick(spacing),
                    liquidity: 2 * E18,
                },
            ],
        },
        PoolFixture {
            description: "low fee, large liquidity around current price (stable swap)",
            fee_tier: FeeTier::Low,
            starting_price: price(1, 1),
            positions: vec![PositionFixture {
                tick_lower: -FeeTier::Low.tick_spacing(),
                tick_upper: FeeTier::Low.tick_spacing(),
                liquidity: 2 * E18,
            }],
        },
        PoolFixture {
            description: "medium fee, token0 liquidity only",
            fee_tier: medium,
            starting_price: price(1, 1),
            positions: vec![PositionFixture {
                tick_lower: 0,
                tick_upper: 2000 * spacing,
                liquidity: 2 * E18,
            }],
        },
        PoolFixture {
            description: "medium fee, token1 liquidity only",
            fee_tier: medium,
            starting_price: price(1, 1),
            positions: vec![PositionFixture {
                tick_lower: -2000 * spacing,
                tick_upper: 0,
                liquidity: 2 * E18,
            }],
        },
        full_range_pool("close to max price", medium, price(1 << 127, 1)),
        full_range_pool("close to min price", medium, price(1, 1 << 127)),
        PoolFixture {
            description: "max full range liquidity at 1:1 price with default fee",
            fee_tier: medium,
            starting_price: price(1, 1),
            positions: vec![full_range(medium, max_liquidity_per_tick(spacing))],
        },
        full_range_pool("initialized at the max ratio", medium, MAX_SQRT_RATIO - U256::from(1u8)),
        full_range_pool("initialized at the min ratio", medium, MIN_SQRT_RATIO),
    ]
}

fn case(
    description: &'static str,
    zero_for_one: bool,
    amount: I256,
    sqrt_price_limit_x96: Option<U256>,
) -> SwapCase {
    SwapCase {
        description,
        zero_for_one,
        amount,
        sqrt_price_limit_x96,
    }
}

pub fn swap_cases() -> Vec<SwapCase> {
    vec![
        // large amounts
        case("exact 1e18 token0 in", true, exact_in(E18), None),
        case("exact 1e18 token1 in", false, exact_in(E18), None),
        case("token0 for exact 1e18 token1 out", true, exact_out(E18), None),
        case("token1 for exact 1e18 token0 out", false, exact_out(E18), None),
        // large amounts with a price limit
        case("exact 1e18 token0 in to 0.5", true, exact_in(E18), Some(price(50, 100))),
        case("exact 1e18 token1 in to 2", false, exact_in(E18), Some(price(200, 100))),
        case("exact 1e18 token1 out to 0.5", true, exact_out(E18), Some(price(50, 100))),
        case("exact 1e18 token0 out to 2", false, exact_out(E18), Some(price(200, 100))),
        // small amounts
        case("exact 1000 token0 in", true, exact_in(1000), None),
        case("exact 1000 token1 in", false, exact_in(1000), None),
        case("token0 for exact 1000 token1 out", true, exact_out(1000), None),
        case("token1 for exact 1000 token0 out", false, exact_out(1000), None),
        // arbitrary input up to a price
        case("token1 in up to 2.5", false, I256::MAX, Some(price(5, 2))),
        case("token0 in down to 0.4", true, I256::MAX, Some(price(2, 5))),
        case("token0 in down to 2.5", true, I256::MAX, Some(price(5, 2))),
        case("token1 in up to 0.4", false, I256::MAX, Some(price(2, 5))),
    ]
}
