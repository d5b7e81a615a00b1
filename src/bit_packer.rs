//! Packing pixel intensities into bytes at 1 or 4 bits per pixel.
//!
//! Binary (GS2) packs 8 values per byte with the first value in bit 0.
//! Grayscale (GS16) packs 2 values per byte with the first value in the low nibble.
//! A final partial byte is zero-padded.
//!
//! ```rust
//! use arena_pattern::bit_packer::{BitDepth, pack, unpack};
//!
//! let packed = pack(&[1, 0, 1, 1], BitDepth::Binary)?;
//! assert_eq!(packed, [0b0000_1101]);
//!
//! let packed = pack(&[0x3, 0xA, 0xF], BitDepth::Grayscale)?;
//! assert_eq!(packed, [0xA3, 0x0F]);
//! assert_eq!(unpack(&packed, 3, BitDepth::Grayscale)?, [0x3, 0xA, 0xF]);
//! # Ok::<(), arena_pattern::Error>(())
//! ```

use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::{Error, Result};

/// Pixel encoding of a pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BitDepth {
    /// GS2: 1 bit per pixel, values `0..=1`.
    Binary,
    /// GS16: 4 bits per pixel, values `0..=15`.
    Grayscale,
}

impl BitDepth {
    /// Bits per pixel.
    #[must_use]
    pub const fn bits(self) -> u8 {
        match self {
            Self::Binary => 1,
            Self::Grayscale => 4,
        }
    }

    /// Largest representable intensity, `2^bits - 1`.
    #[must_use]
    pub const fn max_value(self) -> u8 {
        match self {
            Self::Binary => 1,
            Self::Grayscale => 15,
        }
    }

    /// Number of intensity levels, as stored in headers (2 or 16).
    #[must_use]
    pub const fn gs_levels(self) -> u8 {
        match self {
            Self::Binary => 2,
            Self::Grayscale => 16,
        }
    }

    /// Parse the grayscale-level count stored in a header.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnsupportedGrayscaleLevels`] for anything but 2 or 16.
    pub const fn from_gs_levels(levels: u8) -> Result<Self> {
        match levels {
            2 => Ok(Self::Binary),
            16 => Ok(Self::Grayscale),
            _ => Err(Error::Validation(
                ValidationError::UnsupportedGrayscaleLevels { levels },
            )),
        }
    }

    /// Pixels stored per byte.
    #[must_use]
    pub const fn values_per_byte(self) -> usize {
        match self {
            Self::Binary => 8,
            Self::Grayscale => 2,
        }
    }

    /// Check one value against this depth.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValueOutOfRange`] if `value` exceeds [`Self::max_value`].
    pub const fn check(self, value: u8) -> Result<()> {
        let max = self.max_value();
        if value > max {
            return Err(Error::ValueOutOfRange { value, max });
        }
        Ok(())
    }
}

/// Bytes needed to pack `count` values.
#[must_use]
pub const fn packed_len(count: usize, bit_depth: BitDepth) -> usize {
    count.div_ceil(bit_depth.values_per_byte())
}

/// Pack `values` into a new buffer.
///
/// # Errors
///
/// Returns [`Error::ValueOutOfRange`] for the first value above `2^bits - 1`.
pub fn pack(values: &[u8], bit_depth: BitDepth) -> Result<Vec<u8>> {
    let mut packed = Vec::with_capacity(packed_len(values.len(), bit_depth));
    pack_into(values, bit_depth, &mut packed)?;
    Ok(packed)
}

/// Pack `values`, appending to `out`.
///
/// Values are range-checked before anything is appended, so `out` is untouched on error.
///
/// # Errors
///
/// Returns [`Error::ValueOutOfRange`] for the first value above `2^bits - 1`.
pub fn pack_into(values: &[u8], bit_depth: BitDepth, out: &mut Vec<u8>) -> Result<()> {
    values
        .iter()
        .try_for_each(|&value| bit_depth.check(value))?;

    let bits = bit_depth.bits();
    out.extend(
        values
            .chunks(bit_depth.values_per_byte())
            .map(|chunk| {
                chunk
                    .iter()
                    .zip((0..8).step_by(usize::from(bits)))
                    .fold(0u8, |byte, (&value, shift)| byte | (value << shift))
            }),
    );
    Ok(())
}

/// Unpack exactly `count` values; padding bits past `count` are ignored.
///
/// # Errors
///
/// Returns [`Error::TruncatedData`] if `bytes` holds fewer than `count` values.
pub fn unpack(bytes: &[u8], count: usize, bit_depth: BitDepth) -> Result<Vec<u8>> {
    let mut values = alloc::vec![0; count];
    unpack_into(bytes, bit_depth, &mut values)?;
    Ok(values)
}

/// Unpack `out.len()` values into `out`.
///
/// # Errors
///
/// Returns [`Error::TruncatedData`] if `bytes` holds fewer than `out.len()` values.
pub fn unpack_into(bytes: &[u8], bit_depth: BitDepth, out: &mut [u8]) -> Result<()> {
    let needed = packed_len(out.len(), bit_depth);
    if bytes.len() < needed {
        return Err(Error::TruncatedData {
            needed,
            available: bytes.len(),
        });
    }

    let bits = bit_depth.bits();
    let mask = bit_depth.max_value();
    let values = bytes.iter().flat_map(|&byte| {
        (0..8)
            .step_by(usize::from(bits))
            .map(move |shift| (byte >> shift) & mask)
    });
    for (slot, value) in out.iter_mut().zip(values) {
        *slot = value;
    }
    Ok(())
}
