#![allow(dead_code)]

use clmm_core_pool::math::{
    bit_math, math_helpers, sqrt_price_math, swap_math, tick_bitmap::TickBitmap, tick_math,
};
use clmm_core_pool::{Address, CorePool, FeeTier, I256, PoolConfig, Q96, Q128, U256};
use criterion::{BatchSize, Criterion, black_box};

const E18: u128 = 1_000_000_000_000_000_000;

pub fn bench_tick_math(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick_math");
    group.bench_function("get_sqrt_ratio_at_tick", |b| {
        b.iter(|| tick_math::get_sqrt_ratio_at_tick(black_box(-224_701)))
    });
    let sqrt_price = U256::from(1_046_706_758_115_479_018_135_889u128);
    group.bench_function("get_tick_at_sqrt_ratio", |b| {
        b.iter(|| tick_math::get_tick_at_sqrt_ratio(black_box(sqrt_price)))
    });
    group.finish();
}

pub fn bench_sqrt_price_math(c: &mut Criterion) {
    let mut group = c.benchmark_group("sqrt_price_math");
    let price = Q96;
    let upper = tick_math::get_sqrt_ratio_at_tick(600).unwrap_or(Q96);
    group.bench_function("get_next_sqrt_price_from_input", |b| {
        b.iter(|| {
            sqrt_price_math::get_next_sqrt_price_from_input(
                black_box(price),
                black_box(E18),
                black_box(U256::from(E18 / 10)),
                true,
            )
        })
    });
    group.bench_function("get_amount_0_delta", |b| {
        b.iter(|| sqrt_price_math::get_amount_0_delta(black_box(price), black_box(upper), 1_000))
    });
    group.bench_function("get_amount_1_delta", |b| {
        b.iter(|| sqrt_price_math::get_amount_1_delta(black_box(price), black_box(upper), -1_000))
    });
    group.finish();
}

pub fn bench_swap_math(c: &mut Criterion) {
    let target = tick_math::get_sqrt_ratio_at_tick(-600).unwrap_or(Q96);
    c.bench_function("compute_swap_step", |b| {
        b.iter(|| {
            swap_math::compute_swap_step(
                black_box(Q96),
                black_box(target),
                black_box(2 * E18),
                black_box(I256::from_raw(U256::from(E18))),
                3000,
            )
        })
    });
}

pub fn bench_math_helpers(c: &mut Criterion) {
    let mut group = c.benchmark_group("math_helpers");
    let a = U256::MAX / U256::from(3u8);
    let b = Q128 + U256::from(7u8);
    group.bench_function("mul_div", |bench| {
        bench.iter(|| math_helpers::mul_div(black_box(a), black_box(b), black_box(U256::MAX)))
    });
    group.bench_function("mul_div_rounding_up", |bench| {
        bench.iter(|| {
            math_helpers::mul_div_rounding_up(black_box(a), black_box(b), black_box(U256::MAX))
        })
    });
    group.finish();
}

pub fn bench_tick_bitmap(c: &mut Criterion) {
    let mut bitmap = TickBitmap::new();
    for tick in (-100..100).step_by(7) {
        let _ = bitmap.flip_tick(tick * 60, 60);
    }
    let mut group = c.benchmark_group("tick_bitmap");
    group.bench_function("next_initialized_tick_lte", |b| {
        b.iter(|| bitmap.next_initialized_tick_within_one_word(black_box(1_234), 60, true))
    });
    group.bench_function("next_initialized_tick_gt", |b| {
        b.iter(|| bitmap.next_initialized_tick_within_one_word(black_box(-1_234), 60, false))
    });
    group.finish();
}

pub fn bench_bit_math(c: &mut Criterion) {
    let x = U256::from(0x0010_0000_0000u64) << 100;
    let mut group = c.benchmark_group("bit_math");
    group.bench_function("most_significant_bit", |b| {
        b.iter(|| bit_math::most_significant_bit(black_box(x)))
    });
    group.bench_function("least_significant_bit", |b| {
        b.iter(|| bit_math::least_significant_bit(black_box(x)))
    });
    group.finish();
}

/// Medium-tier pool at price 1 with one full-range position and a ladder
/// of narrow positions, so swaps cross many ticks.
fn laddered_pool() -> CorePool {
    let mut pool = CorePool::new(PoolConfig::new(FeeTier::Medium, "TKA", "TKB"));
    let owner = Address::repeat_byte(0xbe);
    let _ = pool.initialize(Q96);
    let _ = pool.mint(owner, -887_220, 887_220, E18);
    for i in 1..=40 {
        let _ = pool.mint(owner, -60 * i, 60 * i, E18 / 4);
    }
    pool
}

pub fn bench_pool_swap(c: &mut Criterion) {
    let pool = laddered_pool();
    let amount = I256::from_raw(U256::from(E18 / 2));
    let mut group = c.benchmark_group("core_pool");
    group.bench_function("quote_swap_crossing_ticks", |b| {
        b.iter(|| pool.quote_swap(black_box(true), black_box(amount), None))
    });
    group.bench_function("swap_crossing_ticks", |b| {
        b.iter_batched(
            || pool.clone(),
            |mut pool| pool.swap(true, amount, None),
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

pub fn bench_pool_liquidity(c: &mut Criterion) {
    let pool = laddered_pool();
    let owner = Address::repeat_byte(0x42);
    c.bench_function("core_pool/mint_then_burn", |b| {
        b.iter_batched(
            || pool.clone(),
            |mut pool| {
                let _ = pool.mint(owner, -1_200, 1_800, E18);
                pool.burn(owner, -1_200, 1_800, E18)
            },
            BatchSize::SmallInput,
        )
    });
}
