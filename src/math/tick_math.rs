use crate::error::StateError;
use crate::math::bit_math::most_significant_bit;
use crate::{U256_127, U256_128};
use alloy_primitives::{I256, U256};

pub const MIN_TICK: i32 = -887272;
pub const MAX_TICK: i32 = -MIN_TICK;

/// `get_sqrt_ratio_at_tick(MIN_TICK)`.
pub const MIN_SQRT_RATIO: U256 = U256::from_limbs([4295128739, 0, 0, 0]);
/// `get_sqrt_ratio_at_tick(MAX_TICK)`.
pub const MAX_SQRT_RATIO: U256 =
    U256::from_limbs([6743328256752651558, 17280870778742802505, 4294805859, 0]);

// log_sqrt(1.0001)(2) as a Q128 multiplier of a Q64 log2
const LOG_SQRT_10001: I256 =
    I256::from_raw(U256::from_limbs([11745905768312294533, 13863, 0, 0]));
// error bounds of the log approximation, Q128
const TICK_LOW_ERROR: I256 = I256::from_raw(U256::from_limbs([
    6552757943157144234,
    184476617836266586,
    0,
    0,
]));
const TICK_HIGH_ERROR: I256 = I256::from_raw(U256::from_limbs([
    4998474450511881007,
    15793544031827761793,
    0,
    0,
]));

const Q128_SHIFT: usize = 128;

// 1 / sqrt(1.0001)^(2^i) as Q128 values, i = 1..=19, split into (low, high) limbs
const RATIO_FACTORS: [(u64, u64); 19] = [
    (6459403834229662010, 18444899583751176498),
    (17226890335427755468, 18443055278223354162),
    (2032852871939366096, 18439367220385604838),
    (14545316742740207172, 18431993317065449817),
    (5129152022828963008, 18417254355718160513),
    (4894419605888772193, 18387811781193591352),
    (1280255884321894483, 18329067761203520168),
    (15924666964335305636, 18212142134806087854),
    (8010504389359918676, 17980523815641551639),
    (10668036004952895731, 17526086738831147013),
    (4878133418470705625, 16651378430235024244),
    (9537173718739605541, 15030750278693429944),
    (9972618978014552549, 12247334978882834399),
    (10428997489610666743, 8131365268884726200),
    (9305304367709015974, 3584323654723342297),
    (14301143598189091785, 696457651847595233),
    (7393154844743099908, 26294789957452057),
    (2209338891292245656, 37481735321082),
    (10518117631919034274, 76158723),
];

/// Returns `sqrt(1.0001^tick) * 2^96`, rounded up, or
/// `StateError::TickOutOfBounds` outside `[MIN_TICK, MAX_TICK]`.
///
/// The ratio is assembled from one precomputed Q128 factor per set bit of
/// `|tick|` and inverted for positive ticks, so the result is identical on
/// every platform.
pub fn get_sqrt_ratio_at_tick(tick: i32) -> Result<U256, StateError> {
    let abs_tick = tick.unsigned_abs();
    if abs_tick > MAX_TICK as u32 {
        return Err(StateError::TickOutOfBounds);
    }

    let mut ratio = if abs_tick & 1 != 0 {
        U256::from_limbs([12262481743371124737, 18445821805675392311, 0, 0])
    } else {
        U256::from_limbs([0, 0, 1, 0])
    };

    for (i, &(low, high)) in RATIO_FACTORS.iter().enumerate() {
        if abs_tick & (2 << i) != 0 {
            ratio = ratio.wrapping_mul(U256::from_limbs([low, high, 0, 0])) >> 128;
        }
    }

    if tick > 0 {
        ratio = U256::MAX / ratio;
    }

    // Q128.128 -> Q64.96, rounding up so the inverse lookup stays consistent
    let remainder = ratio.as_limbs()[0] & 0xFFFF_FFFF;
    Ok((ratio >> 32) + U256::from((remainder != 0) as u8))
}

/// Returns the greatest tick whose sqrt ratio is `<= sqrt_price_x96`.
///
/// Fails with `StateError::SqrtPriceOutOfBounds` unless
/// `MIN_SQRT_RATIO <= sqrt_price_x96 < MAX_SQRT_RATIO`. The integer log2
/// estimate brackets the answer between two adjacent ticks; a single
/// forward lookup picks the right one.
pub fn get_tick_at_sqrt_ratio(sqrt_price_x96: U256) -> Result<i32, StateError> {
    if sqrt_price_x96 < MIN_SQRT_RATIO || sqrt_price_x96 >= MAX_SQRT_RATIO {
        return Err(StateError::SqrtPriceOutOfBounds);
    }

    let ratio = sqrt_price_x96 << 32;
    let msb = most_significant_bit(ratio).map_err(|_| StateError::SqrtPriceIsZero)? as usize;

    let mut r = if msb >= 128 {
        ratio >> (msb - 127)
    } else {
        ratio << (127 - msb)
    };

    let mut log_2: I256 = (I256::from_raw(U256::from(msb)) - I256::from_raw(U256_128)) << 64;

    for shift in (50..=63usize).rev() {
        r = r.overflowing_mul(r).0 >> U256_127;
        let f = r >> Q128_SHIFT;
        log_2 |= I256::from_raw(f << shift);
        r >>= f;
    }

    let log_sqrt10001 = log_2.wrapping_mul(LOG_SQRT_10001);
    let tick_low = ((log_sqrt10001 - TICK_LOW_ERROR) >> Q128_SHIFT).low_i32();
    let tick_high = ((log_sqrt10001 + TICK_HIGH_ERROR) >> Q128_SHIFT).low_i32();

    Ok(if tick_low == tick_high {
        tick_low
    } else if get_sqrt_ratio_at_tick(tick_high)? <= sqrt_price_x96 {
        tick_high
    } else {
        tick_low
    })
}

/// `true` when `sqrt_price_x96` lies in `[MIN_SQRT_RATIO, MAX_SQRT_RATIO)`.
#[inline]
pub fn is_valid_sqrt_price(sqrt_price_x96: U256) -> bool {
    sqrt_price_x96 >= MIN_SQRT_RATIO && sqrt_price_x96 < MAX_SQRT_RATIO
}

/// Smallest price a swap may move to: one above the minimum ratio.
pub const MIN_SQRT_PRICE_LIMIT: U256 = U256::from_limbs([4295128740, 0, 0, 0]);
/// Largest price a swap may move to: one below the maximum ratio.
pub const MAX_SQRT_PRICE_LIMIT: U256 =
    U256::from_limbs([6743328256752651557, 17280870778742802505, 4294805859, 0]);
