//! Fixed-size `.pat` file headers for the G4 family and G6.
//!
//! Each family has two header versions that stay mutually legible: V2 only adds
//! fields in bytes V1 leaves reserved (G4 family) or appends them after the V1
//! prefix (G6). Decoding is always "read the shared prefix, branch on the version
//! discriminant, read the version-specific suffix".
//!
//! See [`HeaderFamily`] for choosing a codec and [`PatternHeader`] for the decoded
//! fields.

mod g4;
mod g6;

pub use g4::G4HeaderCodec;
pub use g6::G6HeaderCodec;

use alloc::vec::Vec;

use crate::arena::{ArenaConfig, ArenaGeometry, ColumnList, ColumnOrder, Generation};
use crate::bit_packer::BitDepth;
use crate::pattern::Pattern;
use crate::{Error, Result};

/// Header layout version.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HeaderVersion {
    /// Legacy layout without identifiers or column order.
    V1,
    /// Self-describing layout carrying `generation_id`, `arena_id` (and `observer_id` on G6).
    #[default]
    V2,
}

/// Every field a header records, independent of its byte layout.
///
/// `num_panel_cols` counts installed columns; on G6 the installed physical
/// columns themselves are also recorded (`columns_installed`, `None` for a full
/// arena). Pattern ids are not part of any header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatternHeader {
    /// Hardware generation the frames were laid out for.
    pub generation: Generation,
    /// Layout version.
    pub version: HeaderVersion,
    /// Frames along the x axis.
    pub x_num: u16,
    /// Frames along the y axis (always 1 for G6).
    pub y_num: u16,
    /// Pixel encoding.
    pub bit_depth: BitDepth,
    /// Panel rows.
    pub num_panel_rows: u8,
    /// Installed panel columns.
    pub num_panel_cols: u8,
    /// Installed physical columns of a partial G6 arena.
    pub columns_installed: Option<ColumnList>,
    /// Traversal direction of the installed columns.
    pub column_order: ColumnOrder,
    /// Self-describing generation code (0 = unspecified).
    pub generation_id: u8,
    /// Arena identifier (0 = unspecified).
    pub arena_id: u8,
    /// Observer identifier, G6 only (0 = unspecified).
    pub observer_id: u8,
}

impl PatternHeader {
    /// Header fields for writing `pattern` laid out on `geometry`.
    ///
    /// A V1 header cannot hold identifiers, so they are dropped here.
    #[must_use]
    pub fn for_pattern(pattern: &Pattern, geometry: &ArenaGeometry, version: HeaderVersion) -> Self {
        let (generation_id, arena_id, observer_id) = match version {
            HeaderVersion::V2 => (
                pattern.generation_id(),
                pattern.arena_id(),
                pattern.observer_id(),
            ),
            HeaderVersion::V1 => {
                if pattern.generation_id() != 0 || pattern.arena_id() != 0 || pattern.observer_id() != 0
                {
                    debug!(
                        "V1 header drops generation_id {}, arena_id {}, observer_id {}",
                        pattern.generation_id(),
                        pattern.arena_id(),
                        pattern.observer_id()
                    );
                }
                (0, 0, 0)
            }
        };
        Self {
            generation: geometry.generation(),
            version,
            x_num: pattern.x_num(),
            y_num: pattern.y_num(),
            bit_depth: pattern.bit_depth(),
            num_panel_rows: geometry.num_panel_rows(),
            num_panel_cols: geometry.num_installed_cols(),
            columns_installed: geometry
                .columns_installed()
                .and_then(|columns| ColumnList::from_slice(columns).ok()),
            column_order: geometry.column_order(),
            generation_id,
            arena_id,
            observer_id,
        }
    }

    /// Total frames, `x_num * y_num`.
    #[must_use]
    pub fn num_frames(&self) -> u32 {
        u32::from(self.x_num) * u32::from(self.y_num)
    }

    /// The header family this header belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedGeneration`] for G3.
    pub const fn family(&self) -> Result<HeaderFamily> {
        HeaderFamily::for_generation(self.generation)
    }

    /// Bytes this header occupies on the wire.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedGeneration`] for G3.
    pub fn encoded_len(&self) -> Result<usize> {
        Ok(self.family()?.encoded_len(self.version))
    }

    /// An arena configuration whose derived geometry lays frames out exactly as
    /// this header describes.
    ///
    /// Headers only know installed columns, so the rebuilt grid is the narrowest one
    /// that holds them: a full arena of `num_panel_cols` columns, or (for a partial
    /// G6 arena) one ending at the last installed column.
    #[must_use]
    pub fn to_arena_config(&self) -> ArenaConfig {
        let config = ArenaConfig::new(self.generation, self.num_panel_rows, self.num_panel_cols)
            .with_column_order(self.column_order);
        match &self.columns_installed {
            Some(columns) => {
                let num_panel_cols = columns
                    .last()
                    .map_or(self.num_panel_cols, |&last| last.saturating_add(1));
                ArenaConfig {
                    num_panel_cols,
                    columns_installed: Some(columns.clone()),
                    ..config
                }
            }
            None => config,
        }
    }
}

/// One header layout family: byte encoding and version negotiation.
pub trait HeaderCodec {
    /// Bytes a header of `version` occupies.
    fn encoded_len(&self, version: HeaderVersion) -> usize;

    /// Append the encoded header to `out`. Nothing is appended on error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when `header` holds a value this layout cannot
    /// record, or [`Error::UnsupportedGeneration`] when it names another family.
    fn encode_into(&self, header: &PatternHeader, out: &mut Vec<u8>) -> Result<()>;

    /// Decode a header from the start of `bytes`; any following bytes are ignored.
    ///
    /// `expected` is the generation the caller believes the file is for (`None` to
    /// trust the header).
    ///
    /// # Errors
    ///
    /// Returns [`Error::TruncatedData`], [`Error::UnsupportedVersion`],
    /// [`Error::UnsupportedGeneration`], or [`Error::Validation`] for malformed or
    /// mismatched headers.
    fn decode(&self, bytes: &[u8], expected: Option<Generation>) -> Result<PatternHeader>;

    /// Encode into a new buffer.
    ///
    /// # Errors
    ///
    /// See [`Self::encode_into`].
    fn encode(&self, header: &PatternHeader) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.encoded_len(header.version));
        self.encode_into(header, &mut out)?;
        Ok(out)
    }
}

/// The closed set of header layouts, chosen once per generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeaderFamily {
    /// G4 and G4.1.
    G4(G4HeaderCodec),
    /// G6, recognized by its `G6PT` magic.
    G6(G6HeaderCodec),
}

impl HeaderFamily {
    /// The layout used to write `generation`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedGeneration`] for G3.
    pub const fn for_generation(generation: Generation) -> Result<Self> {
        match generation {
            Generation::G4 | Generation::G4_1 => Ok(Self::G4(G4HeaderCodec)),
            Generation::G6 => Ok(Self::G6(G6HeaderCodec)),
            Generation::G3 => Err(Error::UnsupportedGeneration {
                detail: "G3 has no pattern format",
            }),
        }
    }

    /// Pick the layout from the bytes themselves: the `G6PT` magic marks G6,
    /// anything else is read as G4 family.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedGeneration`] when `expected` names a generation
    /// the bytes cannot be (including G3).
    pub fn detect(bytes: &[u8], expected: Option<Generation>) -> Result<Self> {
        let detected = if bytes.starts_with(&G6HeaderCodec::MAGIC) {
            Self::G6(G6HeaderCodec)
        } else {
            Self::G4(G4HeaderCodec)
        };
        let Some(expected) = expected else {
            return Ok(detected);
        };
        match (Self::for_generation(expected)?, detected) {
            (Self::G4(_), Self::G4(_)) | (Self::G6(_), Self::G6(_)) => Ok(detected),
            (Self::G6(_), Self::G4(_)) => {
                warn!("expected a G6 header but the G6PT magic is missing");
                Err(Error::UnsupportedGeneration {
                    detail: "G6 header magic missing",
                })
            }
            (Self::G4(_), Self::G6(_)) => {
                warn!("expected a G4-family header but found the G6PT magic");
                Err(Error::UnsupportedGeneration {
                    detail: "G6 header where a G4-family header was expected",
                })
            }
        }
    }
}

impl HeaderCodec for HeaderFamily {
    fn encoded_len(&self, version: HeaderVersion) -> usize {
        match self {
            Self::G4(codec) => codec.encoded_len(version),
            Self::G6(codec) => codec.encoded_len(version),
        }
    }

    fn encode_into(&self, header: &PatternHeader, out: &mut Vec<u8>) -> Result<()> {
        match self {
            Self::G4(codec) => codec.encode_into(header, out),
            Self::G6(codec) => codec.encode_into(header, out),
        }
    }

    fn decode(&self, bytes: &[u8], expected: Option<Generation>) -> Result<PatternHeader> {
        match self {
            Self::G4(codec) => codec.decode(bytes, expected),
            Self::G6(codec) => codec.decode(bytes, expected),
        }
    }
}

/// Bounds-checked little-endian cursor over a header.
pub(crate) struct ByteReader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> ByteReader<'a> {
    pub(crate) const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    pub(crate) const fn position(&self) -> usize {
        self.position
    }

    pub(crate) fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.position.saturating_add(len);
        let slice = self.bytes.get(self.position..end).ok_or(Error::TruncatedData {
            needed: end,
            available: self.bytes.len(),
        })?;
        self.position = end;
        Ok(slice)
    }

    pub(crate) fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut array = [0; N];
        array.copy_from_slice(self.take(N)?);
        Ok(array)
    }

    pub(crate) fn u8(&mut self) -> Result<u8> {
        let [byte] = self.array::<1>()?;
        Ok(byte)
    }

    pub(crate) fn u16_le(&mut self) -> Result<u16> {
        self.array().map(u16::from_le_bytes)
    }

    pub(crate) fn u32_le(&mut self) -> Result<u32> {
        self.array().map(u32::from_le_bytes)
    }
}

/// Check that a non-zero `generation_id` agrees with `generation`.
fn check_generation_id(generation: Generation, generation_id: u8) -> Result<()> {
    if generation_id != 0 && generation_id != generation.id() {
        return Err(crate::error::ValidationError::GenerationIdMismatch {
            expected: generation.id(),
            found: generation_id,
        }
        .into());
    }
    Ok(())
}

/// Ensure a header is written by the family that owns its generation.
fn check_family(header: &PatternHeader, g6: bool) -> Result<()> {
    let owned = match header.generation {
        Generation::G4 | Generation::G4_1 => !g6,
        Generation::G6 => g6,
        Generation::G3 => false,
    };
    if owned {
        Ok(())
    } else {
        Err(Error::UnsupportedGeneration {
            detail: "header generation belongs to another family",
        })
    }
}
