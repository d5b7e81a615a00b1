//! Whole-pattern `.pat` encoding and decoding.
//!
//! A file is `[header][frame 0]...[frame N-1]`, frames ordered `x_index` fastest.
//! Each frame is one stretch byte followed by the arena's panel blocks, each block
//! a 1-based row id and the block's packed pixels:
//!
//! ```text
//! frame := stretch  (row_id  packed_pixels){rows * subpanels}
//! ```
//!
//! # Example
//!
//! ```rust
//! use arena_pattern::{
//!     arena::{ArenaGeometry, Generation},
//!     bit_packer::BitDepth,
//!     header::HeaderVersion,
//!     pattern::Pattern,
//!     pattern_codec::{self, PatternCodec},
//! };
//!
//! let geometry = ArenaGeometry::full(Generation::G6, 2, 10)?;
//! let mut pattern = Pattern::new(&geometry, BitDepth::Grayscale, 2, 1);
//! pattern.frame_mut(1, 0).expect("frame exists")[(0, 0)] = 15;
//!
//! let codec = PatternCodec::new(&geometry)?;
//! let bytes = codec.encode(&pattern, HeaderVersion::V2)?;
//! assert_eq!(bytes.len(), 18 + 2 * codec.frame_len(BitDepth::Grayscale)?);
//!
//! let decoded = pattern_codec::decode(&bytes, Some(Generation::G6))?;
//! assert_eq!(decoded.pattern, pattern);
//! assert_eq!(decoded.header.num_panel_cols, 10);
//! # Ok::<(), arena_pattern::Error>(())
//! ```

use alloc::vec::Vec;

use crate::arena::{ArenaGeometry, Generation};
use crate::bit_packer::{self, BitDepth};
use crate::error::ValidationError;
use crate::frame::PixelFrame;
use crate::header::{ByteReader, HeaderCodec, HeaderFamily, HeaderVersion, PatternHeader};
use crate::panel_tiler::{PanelTiler, SubpanelBlock};
use crate::pattern::Pattern;
use crate::{Error, Result};

/// A decoded file: the pattern, the header it was read from, and the geometry
/// that header implies.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedPattern {
    /// Frames, stretch values, and identifiers. `pattern_id` is always 0 here.
    pub pattern: Pattern,
    /// Header fields as stored.
    pub header: PatternHeader,
    /// Geometry rebuilt from the header (see [`PatternHeader::to_arena_config`]).
    pub geometry: ArenaGeometry,
}

/// Encoder/decoder bound to one arena.
///
/// The header layout and panel tiling are chosen from the generation once, here.
#[derive(Clone, Debug, PartialEq)]
pub struct PatternCodec {
    geometry: ArenaGeometry,
    header_family: HeaderFamily,
    tiler: PanelTiler,
}

impl PatternCodec {
    /// A codec for patterns laid out on `geometry`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedGeneration`] for G3 arenas.
    pub fn new(geometry: &ArenaGeometry) -> Result<Self> {
        let generation = geometry.generation();
        Ok(Self {
            geometry: geometry.clone(),
            header_family: HeaderFamily::for_generation(generation)?,
            tiler: PanelTiler::for_generation(generation)?,
        })
    }

    /// The arena this codec lays frames out for.
    #[must_use]
    pub const fn geometry(&self) -> &ArenaGeometry {
        &self.geometry
    }

    /// Header layout in use.
    #[must_use]
    pub const fn header_family(&self) -> HeaderFamily {
        self.header_family
    }

    /// Panel tiling in use.
    #[must_use]
    pub const fn tiler(&self) -> PanelTiler {
        self.tiler
    }

    /// Bytes in one encoded frame.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnevenSubpanels`] if the tiling does not fit the panel size.
    pub fn frame_len(&self, bit_depth: BitDepth) -> Result<usize> {
        let block_len = 1 + bit_packer::packed_len(self.tiler.block_pixel_count(&self.geometry)?, bit_depth);
        Ok(1 + self.tiler.blocks_per_frame(&self.geometry) * block_len)
    }

    /// Encode a complete file.
    ///
    /// The pattern and header are validated before any frame is encoded; on error
    /// no bytes are returned.
    ///
    /// # Errors
    ///
    /// Returns any [`Pattern::validate`] error, and any header error from
    /// [`HeaderCodec::encode_into`] (identifiers out of range, a counter-clockwise
    /// arena with a V1 header, a two-axis G6 pattern).
    pub fn encode(&self, pattern: &Pattern, version: HeaderVersion) -> Result<Vec<u8>> {
        pattern.validate(&self.geometry)?;
        let header = PatternHeader::for_pattern(pattern, &self.geometry, version);

        let frame_len = self.frame_len(pattern.bit_depth())?;
        let capacity = frame_len
            .checked_mul(pattern.num_frames())
            .and_then(|frames_len| frames_len.checked_add(self.header_family.encoded_len(version)))
            .ok_or(ValidationError::FrameCountOverflow {
                frames: pattern.num_frames(),
                max: usize::MAX / frame_len.max(1),
            })?;
        let mut out = Vec::with_capacity(capacity);
        self.header_family.encode_into(&header, &mut out)?;
        for (frame, &stretch) in pattern.frames().iter().zip(pattern.stretch()) {
            self.encode_frame_into(frame, stretch, pattern.bit_depth(), &mut out)?;
        }
        debug_assert_eq!(out.len(), capacity);
        trace!("encoded {} frames into {} bytes", pattern.num_frames(), out.len());
        Ok(out)
    }

    /// Encode frame `(x_index, y_index)` exactly as it appears inside a file, for
    /// streaming single frames to a controller.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::FrameIndexOutOfRange`] outside the pattern
    /// - [`ValidationError::FrameSizeMismatch`] if the frame does not fit the arena
    /// - [`Error::ValueOutOfRange`] for a pixel or stretch value above the bit depth
    pub fn encode_frame(&self, pattern: &Pattern, x_index: u16, y_index: u16) -> Result<Vec<u8>> {
        let out_of_range = ValidationError::FrameIndexOutOfRange {
            x_index,
            y_index,
            x_num: pattern.x_num(),
            y_num: pattern.y_num(),
        };
        let (Some(frame), Some(stretch)) = (
            pattern.frame(x_index, y_index),
            pattern.stretch_at(x_index, y_index),
        ) else {
            return Err(out_of_range.into());
        };
        let bit_depth = pattern.bit_depth();
        bit_depth.check(frame.max_value())?;
        let mut out = Vec::with_capacity(self.frame_len(bit_depth)?);
        self.encode_frame_into(frame, stretch, bit_depth, &mut out)?;
        Ok(out)
    }

    /// Decode a complete file. See [`decode`].
    ///
    /// # Errors
    ///
    /// See [`decode`].
    pub fn decode(bytes: &[u8], expected: Option<Generation>) -> Result<DecodedPattern> {
        let header_family = HeaderFamily::detect(bytes, expected)?;
        let header = header_family.decode(bytes, expected)?;
        let header_len = header_family.encoded_len(header.version);
        let geometry = ArenaGeometry::derive(&header.to_arena_config())?;
        let codec = Self::new(&geometry)?;

        let bit_depth = header.bit_depth;
        let frame_len = codec.frame_len(bit_depth)?;
        let num_frames = usize::try_from(header.num_frames()).unwrap_or(usize::MAX);
        let needed = frame_len
            .checked_mul(num_frames)
            .and_then(|frames_len| frames_len.checked_add(header_len))
            .ok_or(ValidationError::FrameCountOverflow {
                frames: num_frames,
                max: usize::MAX / frame_len.max(1),
            })?;
        if bytes.len() < needed {
            warn!("pattern truncated: {} of {} bytes", bytes.len(), needed);
            return Err(Error::TruncatedData {
                needed,
                available: bytes.len(),
            });
        }
        if bytes.len() > needed {
            warn!("ignoring {} trailing bytes after the last frame", bytes.len() - needed);
        }

        let mut reader = ByteReader::new(bytes);
        reader.take(header_len)?;
        let mut frames = Vec::with_capacity(num_frames);
        let mut stretch = Vec::with_capacity(num_frames);
        for _ in 0..num_frames {
            let (frame, frame_stretch) = codec.decode_frame(reader.take(frame_len)?, bit_depth)?;
            frames.push(frame);
            stretch.push(frame_stretch);
        }

        let pattern = Pattern::from_frames(bit_depth, header.x_num, header.y_num, frames, stretch)
            .with_generation_id(header.generation_id)
            .with_arena_id(header.arena_id)
            .with_observer_id(header.observer_id);
        Ok(DecodedPattern {
            pattern,
            header,
            geometry,
        })
    }

    /// Decode one frame produced by [`Self::encode_frame`], returning the frame and its stretch value.
    ///
    /// # Errors
    ///
    /// - [`Error::TruncatedData`] if `bytes` is shorter than [`Self::frame_len`]
    /// - [`Error::CorruptRowHeader`] if a block's row id is wrong
    /// - [`Error::ValueOutOfRange`] if the stretch value exceeds the bit depth
    pub fn decode_frame(&self, bytes: &[u8], bit_depth: BitDepth) -> Result<(PixelFrame, u8)> {
        let block_pixel_count = self.tiler.block_pixel_count(&self.geometry)?;
        let packed_len = bit_packer::packed_len(block_pixel_count, bit_depth);

        let mut reader = ByteReader::new(bytes);
        let stretch = reader.u8()?;
        bit_depth.check(stretch)?;
        let blocks = (0..self.tiler.blocks_per_frame(&self.geometry))
            .map(|_| -> Result<SubpanelBlock> {
                let row_id = reader.u8()?;
                let pixels = bit_packer::unpack(reader.take(packed_len)?, block_pixel_count, bit_depth)?;
                Ok(SubpanelBlock { row_id, pixels })
            })
            .collect::<Result<Vec<_>>>()?;
        let frame = self.tiler.untile(&blocks, &self.geometry)?;
        Ok((frame, stretch))
    }

    fn encode_frame_into(
        &self,
        frame: &PixelFrame,
        stretch: u8,
        bit_depth: BitDepth,
        out: &mut Vec<u8>,
    ) -> Result<()> {
        bit_depth.check(stretch)?;
        out.push(stretch);
        for block in self.tiler.tile(frame, &self.geometry)? {
            out.push(block.row_id);
            bit_packer::pack_into(&block.pixels, bit_depth, out)?;
        }
        Ok(())
    }
}

/// Encode `pattern` for `geometry` with a `version` header.
///
/// # Errors
///
/// See [`PatternCodec::new`] and [`PatternCodec::encode`].
pub fn encode(pattern: &Pattern, geometry: &ArenaGeometry, version: HeaderVersion) -> Result<Vec<u8>> {
    PatternCodec::new(geometry)?.encode(pattern, version)
}

/// Decode a complete `.pat` buffer.
///
/// The header family is detected from the bytes (the `G6PT` magic marks G6).
/// `expected` is the generation the caller believes the file is for; a conflict
/// with the bytes is an error, and for the G4 family it disambiguates G4 from G4.1
/// when the header does not say. Bytes after the last frame are ignored.
///
/// # Errors
///
/// - [`Error::TruncatedData`] if fewer bytes are present than the header declares
/// - [`Error::UnsupportedVersion`] for an unknown header version discriminant
/// - [`Error::UnsupportedGeneration`] if the bytes cannot be for `expected`
/// - [`Error::CorruptRowHeader`] for a wrong panel-row id
/// - [`Error::Geometry`] / [`Error::Validation`] for self-inconsistent headers
pub fn decode(bytes: &[u8], expected: Option<Generation>) -> Result<DecodedPattern> {
    PatternCodec::decode(bytes, expected)
}

/// Decode and validate only the header at the start of `bytes`.
///
/// # Errors
///
/// The header errors of [`decode`].
pub fn decode_header(bytes: &[u8], expected: Option<Generation>) -> Result<PatternHeader> {
    HeaderFamily::detect(bytes, expected)?.decode(bytes, expected)
}
