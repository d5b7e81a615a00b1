//! G4 and G4.1 header: 14 bytes in both versions.
//!
//! ```text
//! offset  V1                 V2
//!  0..4   frame count u32    same
//!  4..6   x_num u16          same
//!  6..8   y_num u16          same
//!  8      gs levels          same
//!  9      panel rows         same
//! 10      installed columns  same
//! 11      0                  0x02, bit 7 set for counter-clockwise
//! 12      0                  generation_id
//! 13      0                  arena_id
//! ```

use alloc::vec::Vec;

use super::{ByteReader, HeaderCodec, HeaderVersion, PatternHeader, check_family, check_generation_id};
use crate::arena::{ColumnOrder, Generation};
use crate::bit_packer::BitDepth;
use crate::error::ValidationError;
use crate::{Error, Result};

const HEADER_LEN: usize = 14;
const VERSION_MASK: u8 = 0x0F;
const CCW_FLAG: u8 = 0x80;
const V1_DISCRIMINANT: u8 = 0;
const V2_DISCRIMINANT: u8 = 2;

/// Header codec for the G4 family.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct G4HeaderCodec;

impl HeaderCodec for G4HeaderCodec {
    fn encoded_len(&self, _version: HeaderVersion) -> usize {
        HEADER_LEN
    }

    fn encode_into(&self, header: &PatternHeader, out: &mut Vec<u8>) -> Result<()> {
        check_family(header, false)?;
        let (version_byte, generation_id, arena_id) = match header.version {
            HeaderVersion::V1 => {
                if header.column_order == ColumnOrder::CounterClockwise {
                    return Err(ValidationError::ColumnOrderNotRecordable.into());
                }
                (V1_DISCRIMINANT, 0, 0)
            }
            HeaderVersion::V2 => {
                check_generation_id(header.generation, header.generation_id)?;
                let ccw = match header.column_order {
                    ColumnOrder::Clockwise => 0,
                    ColumnOrder::CounterClockwise => CCW_FLAG,
                };
                (V2_DISCRIMINANT | ccw, header.generation_id, header.arena_id)
            }
        };

        out.reserve(HEADER_LEN);
        out.extend_from_slice(&header.num_frames().to_le_bytes());
        out.extend_from_slice(&header.x_num.to_le_bytes());
        out.extend_from_slice(&header.y_num.to_le_bytes());
        out.extend_from_slice(&[
            header.bit_depth.gs_levels(),
            header.num_panel_rows,
            header.num_panel_cols,
            version_byte,
            generation_id,
            arena_id,
        ]);
        Ok(())
    }

    fn decode(&self, bytes: &[u8], expected: Option<Generation>) -> Result<PatternHeader> {
        if let Some(expected) =
            expected.filter(|&expected| !matches!(expected, Generation::G4 | Generation::G4_1))
        {
            warn!("G4-family header decoded where {} was expected", expected);
            return Err(Error::UnsupportedGeneration {
                detail: "G4-family header where another generation was expected",
            });
        }
        let mut reader = ByteReader::new(bytes);

        // Shared prefix.
        let frame_count = reader.u32_le()?;
        let x_num = reader.u16_le()?;
        let y_num = reader.u16_le()?;
        let gs_levels = reader.u8()?;
        let num_panel_rows = reader.u8()?;
        let num_panel_cols = reader.u8()?;
        let version_byte = reader.u8()?;

        // Version-specific suffix.
        let (version, column_order, generation_id, arena_id) =
            match version_byte & VERSION_MASK {
                V1_DISCRIMINANT => {
                    reader.take(2)?;
                    (HeaderVersion::V1, ColumnOrder::Clockwise, 0, 0)
                }
                V2_DISCRIMINANT => {
                    let generation_id = reader.u8()?;
                    let arena_id = reader.u8()?;
                    let column_order = if version_byte & CCW_FLAG == 0 {
                        ColumnOrder::Clockwise
                    } else {
                        ColumnOrder::CounterClockwise
                    };
                    (HeaderVersion::V2, column_order, generation_id, arena_id)
                }
                version => {
                    warn!("G4 header: unknown version discriminant {}", version);
                    return Err(Error::UnsupportedVersion { version });
                }
            };
        debug_assert_eq!(reader.position(), HEADER_LEN);

        let generation = resolve_generation(generation_id, expected)?;
        let bit_depth = BitDepth::from_gs_levels(gs_levels)?;
        if x_num == 0 || y_num == 0 {
            return Err(ValidationError::EmptyFrameAxis { x_num, y_num }.into());
        }
        let axis_frames = u32::from(x_num) * u32::from(y_num);
        if frame_count != axis_frames {
            warn!(
                "G4 header: frame count {} disagrees with {} x {}",
                frame_count,
                x_num,
                y_num
            );
            return Err(ValidationError::FrameCountMismatch {
                expected: usize::try_from(axis_frames).unwrap_or(usize::MAX),
                found: usize::try_from(frame_count).unwrap_or(usize::MAX),
            }
            .into());
        }

        let header = PatternHeader {
            generation,
            version,
            x_num,
            y_num,
            bit_depth,
            num_panel_rows,
            num_panel_cols,
            columns_installed: None,
            column_order,
            generation_id,
            arena_id,
            observer_id: 0,
        };
        debug!(
            "G4 header: {} {} frames ({} x {}), {} rows x {} cols",
            header.generation,
            frame_count,
            x_num,
            y_num,
            num_panel_rows,
            num_panel_cols
        );
        Ok(header)
    }
}

/// Generation from a V2 `generation_id`, else the caller's expectation, else G4.
///
/// `expected` is already known to be G4 or G4.1.
fn resolve_generation(generation_id: u8, expected: Option<Generation>) -> Result<Generation> {
    let fallback = expected.unwrap_or(Generation::G4);
    if generation_id == 0 {
        return Ok(fallback);
    }
    match Generation::from_id(generation_id) {
        Some(generation @ (Generation::G4 | Generation::G4_1))
            if expected.is_none_or(|expected| expected == generation) =>
        {
            Ok(generation)
        }
        _ => {
            warn!("G4 header: generation_id {} is not expected here", generation_id);
            Err(ValidationError::GenerationIdMismatch {
                expected: fallback.id(),
                found: generation_id,
            }
            .into())
        }
    }
}
