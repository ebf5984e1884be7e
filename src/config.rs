use crate::error::ValidationError;
use core::fmt;

/// The fixed set of fee tiers a pool may use. Each tier implies its tick
/// spacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FeeTier {
    /// 0.05%, tick spacing 10.
    Low,
    /// 0.30%, tick spacing 60.
    Medium,
    /// 1.00%, tick spacing 200.
    High,
}

impl FeeTier {
    pub const ALL: [FeeTier; 3] = [FeeTier::Low, FeeTier::Medium, FeeTier::High];

    /// Fee in hundredths of a basis point (millionths).
    #[inline]
    pub const fn fee_pips(self) -> u32 {
        match self {
            FeeTier::Low => 500,
            FeeTier::Medium => 3000,
            FeeTier::High => 10_000,
        }
    }

    #[inline]
    pub const fn tick_spacing(self) -> i32 {
        match self {
            FeeTier::Low => 10,
            FeeTier::Medium => 60,
            FeeTier::High => 200,
        }
    }
}

impl TryFrom<u32> for FeeTier {
    type Error = ValidationError;

    fn try_from(fee_pips: u32) -> Result<Self, Self::Error> {
        match fee_pips {
            500 => Ok(FeeTier::Low),
            3000 => Ok(FeeTier::Medium),
            10_000 => Ok(FeeTier::High),
            other => Err(ValidationError::UnsupportedFee(other)),
        }
    }
}

impl fmt::Display for FeeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pips = self.fee_pips();
        write!(f, "{}.{:02}%", pips / 10_000, pips % 10_000 / 100)
    }
}

/// Immutable parameters of a pool. Token symbols are labels only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolConfig {
    pub fee_tier: FeeTier,
    pub token0: String,
    pub token1: String,
}

impl PoolConfig {
    pub fn new(fee_tier: FeeTier, token0: impl Into<String>, token1: impl Into<String>) -> Self {
        Self {
            fee_tier,
            token0: token0.into(),
            token1: token1.into(),
        }
    }

    #[inline]
    pub fn fee_pips(&self) -> u32 {
        self.fee_tier.fee_pips()
    }

    #[inline]
    pub fn tick_spacing(&self) -> i32 {
        self.fee_tier.tick_spacing()
    }
}

impl fmt::Display for PoolConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} {}", self.token0, self.token1, self.fee_tier)
    }
}
