use crate::FastMap;
use crate::U256_1;
use crate::error::{Error, ValidationError};
use crate::math::bit_math::{least_significant_bit, most_significant_bit};
use alloy_primitives::U256;

/// Maps a compressed tick (`tick / tick_spacing`, floored) to the
/// `(word, bit)` coordinates of the bitmap.
#[inline]
pub fn position(compressed: i32) -> (i16, u8) {
    ((compressed >> 8) as i16, compressed.rem_euclid(256) as u8)
}

/// `floor(tick / tick_spacing)`.
#[inline]
pub fn compress(tick: i32, tick_spacing: i32) -> i32 {
    tick.div_euclid(tick_spacing)
}

/// Sparse bitmap of initialized ticks, one bit per multiple of the tick
/// spacing, packed into 256-bit words keyed by word index.
///
/// Words that become zero are removed, so two bitmaps holding the same
/// ticks compare equal.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickBitmap {
    words: FastMap<i16, U256>,
}

impl TickBitmap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the word stored at `word_pos`, or zero if absent.
    #[inline]
    pub fn word(&self, word_pos: i16) -> U256 {
        self.words.get(&word_pos).copied().unwrap_or(U256::ZERO)
    }

    /// Number of non-empty words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn is_initialized(&self, tick: i32, tick_spacing: i32) -> bool {
        if tick % tick_spacing != 0 {
            return false;
        }
        let (word_pos, bit_pos) = position(tick / tick_spacing);
        !(self.word(word_pos) & (U256_1 << bit_pos)).is_zero()
    }

    /// Toggles the initialized bit of `tick`, which must be a multiple of
    /// `tick_spacing`.
    pub fn flip_tick(&mut self, tick: i32, tick_spacing: i32) -> Result<(), Error> {
        if tick % tick_spacing != 0 {
            return Err(ValidationError::TickNotAligned { tick, tick_spacing }.into());
        }

        let (word_pos, bit_pos) = position(tick / tick_spacing);
        let word = self.word(word_pos) ^ (U256_1 << bit_pos);
        if word.is_zero() {
            self.words.remove(&word_pos);
        } else {
            self.words.insert(word_pos, word);
        }
        Ok(())
    }

    /// Finds the next initialized tick in the same 256-bit word as `tick`.
    ///
    /// With `lte` the search covers `tick` itself and everything below it
    /// in the word; otherwise it starts strictly above `tick`. When nothing
    /// is set the word boundary in the search direction is returned with
    /// `false`, so a caller can keep stepping one word at a time.
    pub fn next_initialized_tick_within_one_word(
        &self,
        tick: i32,
        tick_spacing: i32,
        lte: bool,
    ) -> (i32, bool) {
        let compressed = compress(tick, tick_spacing);

        if lte {
            let (word_pos, bit_pos) = position(compressed);
            // all bits at or below bit_pos
            let mask = (U256_1 << bit_pos) - U256_1 + (U256_1 << bit_pos);
            let masked = self.word(word_pos) & mask;

            match most_significant_bit(masked) {
                Ok(msb) => ((compressed - (bit_pos - msb) as i32) * tick_spacing, true),
                Err(_) => ((compressed - bit_pos as i32) * tick_spacing, false),
            }
        } else {
            let (word_pos, bit_pos) = position(compressed + 1);
            // all bits at or above bit_pos
            let mask = !((U256_1 << bit_pos) - U256_1);
            let masked = self.word(word_pos) & mask;

            match least_significant_bit(masked) {
                Ok(lsb) => (
                    (compressed + 1 + (lsb - bit_pos) as i32) * tick_spacing,
                    true,
                ),
                Err(_) => (
                    (compressed + 1 + (u8::MAX - bit_pos) as i32) * tick_spacing,
                    false,
                ),
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (i16, U256)> + '_ {
        self.words.iter().map(|(&pos, &word)| (pos, word))
    }
}
