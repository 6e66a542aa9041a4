//! Fixed-width bus values and the textual token convention they are decoded from.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How the characters of a raw bus token map onto bit indices.
///
/// Waveform dumps write vectors most-significant character first (`"0001"` means
/// bit 0 is high), which is the default. `LsbFirst` exists for signals declared in
/// ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BitOrder {
    /// Rightmost character is bit 0.
    #[default]
    MsbFirst,
    /// Leftmost character is bit 0.
    LsbFirst,
}

/// A bit-vector of a fixed width (at most 64 bits).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BusValue {
    bits: u64,
    width: u8,
}

impl BusValue {
    /// Widest bus representable by a single value.
    pub const MAX_WIDTH: usize = 64;

    /// All bits low.
    pub fn zero(width: usize) -> Self {
        Self {
            bits: 0,
            width: width.min(Self::MAX_WIDTH) as u8,
        }
    }

    /// Build from a raw integer; bits above `width` are discarded.
    pub fn from_bits(bits: u64, width: usize) -> Self {
        let width = width.min(Self::MAX_WIDTH);
        Self {
            bits: bits & mask(width),
            width: width as u8,
        }
    }

    /// Decode a textual token such as `"0101"`.
    ///
    /// Decoding is lenient: a token whose length differs from `width` decodes to
    /// all-zero, and any character other than `'1'` (`x`, `z`, ...) reads as low.
    ///
    /// ```
    /// # use dutyscope::data::bus::{BitOrder, BusValue};
    /// let v = BusValue::parse("0001", 4, BitOrder::MsbFirst);
    /// assert!(v.bit(0));
    /// assert!(!v.bit(3));
    /// assert_eq!(BusValue::parse("01", 4, BitOrder::MsbFirst), BusValue::zero(4));
    /// ```
    pub fn parse(token: &str, width: usize, order: BitOrder) -> Self {
        if token.chars().count() != width || width > Self::MAX_WIDTH {
            tracing::trace!(token, width, "malformed bus token, treating as all-zero");
            return Self::zero(width);
        }
        let mut bits = 0u64;
        for (pos, c) in token.chars().enumerate() {
            if c != '1' {
                continue;
            }
            let index = match order {
                BitOrder::MsbFirst => width - 1 - pos,
                BitOrder::LsbFirst => pos,
            };
            bits |= 1 << index;
        }
        Self::from_bits(bits, width)
    }

    /// State of bit `index`; bits past the width read as low.
    #[inline]
    pub fn bit(&self, index: usize) -> bool {
        index < self.width() && (self.bits >> index) & 1 == 1
    }

    #[inline]
    pub fn bits(&self) -> u64 {
        self.bits
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width as usize
    }
}

fn mask(width: usize) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

impl fmt::Display for BusValue {
    /// Most-significant bit first, like the dump the value came from.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for index in (0..self.width()).rev() {
            f.write_str(if self.bit(index) { "1" } else { "0" })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn msb_first_maps_rightmost_char_to_bit_zero() {
        let v = BusValue::parse("1000", 4, BitOrder::MsbFirst);
        assert!(v.bit(3));
        assert_eq!(v.bits(), 0b1000);
        assert_eq!(v.to_string(), "1000");
    }

    #[test]
    fn lsb_first_maps_leftmost_char_to_bit_zero() {
        let v = BusValue::parse("1000", 4, BitOrder::LsbFirst);
        assert!(v.bit(0));
        assert_eq!(v.bits(), 0b0001);
    }

    #[test]
    fn unknown_states_read_low() {
        let v = BusValue::parse("x1z0", 4, BitOrder::MsbFirst);
        assert_eq!(v.bits(), 0b0100);
    }

    #[test]
    fn wrong_width_degrades_to_zero() {
        assert_eq!(BusValue::parse("11111", 4, BitOrder::MsbFirst), BusValue::zero(4));
        assert_eq!(BusValue::parse("", 4, BitOrder::MsbFirst), BusValue::zero(4));
    }

    #[test]
    fn full_width_mask() {
        let v = BusValue::from_bits(u64::MAX, 64);
        assert!(v.bit(63));
        assert!(!v.bit(64));
        assert_eq!(BusValue::from_bits(0xff, 4).bits(), 0xf);
    }
}
