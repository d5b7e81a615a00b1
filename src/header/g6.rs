//! G6 header: 17 bytes (V1) or 18 bytes (V2), starting with the `G6PT` magic.
//!
//! ```text
//! offset  V1                      V2
//!  0..4   "G6PT"                  same
//!  4      0x01                    0x02 | arena_id[5:2] << 4
//!  5      0                       arena_id[1:0] << 6 | observer_id
//!  6..8   frame count u16         same
//!  8      panel rows              same
//!  9      installed columns       same
//! 10      gs levels               same
//! 11..17  installed column mask   same
//! 17      -                       ccw << 7 | generation_id
//! ```
//!
//! Bit `c % 8` of mask byte `c / 8` is set when physical column `c` is installed;
//! a full arena writes all ones.

use alloc::vec::Vec;

use super::{ByteReader, HeaderCodec, HeaderVersion, PatternHeader, check_family, check_generation_id};
use crate::arena::{ColumnList, ColumnOrder, Generation, MAX_PANEL_COLS};
use crate::bit_packer::BitDepth;
use crate::error::{GeometryError, ValidationError};
use crate::{Error, Result};

const V1_LEN: usize = 17;
const V2_LEN: usize = 18;
const MASK_LEN: usize = MAX_PANEL_COLS / 8;
const FULL_MASK: [u8; MASK_LEN] = [0xFF; MASK_LEN];
const VERSION_MASK: u8 = 0x0F;
const V1_DISCRIMINANT: u8 = 1;
const V2_DISCRIMINANT: u8 = 2;
const ID_MAX: u8 = 0x3F;
const CCW_FLAG: u8 = 0x80;
const GENERATION_ID_MASK: u8 = 0x0F;

/// Header codec for G6.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct G6HeaderCodec;

impl G6HeaderCodec {
    /// Leading tag of every G6 header.
    pub const MAGIC: [u8; 4] = *b"G6PT";
}

impl HeaderCodec for G6HeaderCodec {
    fn encoded_len(&self, version: HeaderVersion) -> usize {
        match version {
            HeaderVersion::V1 => V1_LEN,
            HeaderVersion::V2 => V2_LEN,
        }
    }

    fn encode_into(&self, header: &PatternHeader, out: &mut Vec<u8>) -> Result<()> {
        check_family(header, true)?;
        if header.y_num != 1 {
            return Err(ValidationError::MultiAxisUnsupported { y_num: header.y_num }.into());
        }
        let column_mask = column_mask(header)?;
        let (version_byte, id_byte, trailer) = match header.version {
            HeaderVersion::V1 => {
                if header.column_order == ColumnOrder::CounterClockwise {
                    return Err(ValidationError::ColumnOrderNotRecordable.into());
                }
                (V1_DISCRIMINANT, 0, None)
            }
            HeaderVersion::V2 => {
                check_id("arena_id", header.arena_id)?;
                check_id("observer_id", header.observer_id)?;
                check_generation_id(Generation::G6, header.generation_id)?;
                let ccw = match header.column_order {
                    ColumnOrder::Clockwise => 0,
                    ColumnOrder::CounterClockwise => CCW_FLAG,
                };
                (
                    V2_DISCRIMINANT | ((header.arena_id >> 2) << 4),
                    ((header.arena_id & 0b11) << 6) | header.observer_id,
                    Some(ccw | header.generation_id),
                )
            }
        };

        out.reserve(self.encoded_len(header.version));
        out.extend_from_slice(&Self::MAGIC);
        out.extend_from_slice(&[version_byte, id_byte]);
        out.extend_from_slice(&header.x_num.to_le_bytes());
        out.extend_from_slice(&[
            header.num_panel_rows,
            header.num_panel_cols,
            header.bit_depth.gs_levels(),
        ]);
        out.extend_from_slice(&column_mask);
        out.extend(trailer);
        Ok(())
    }

    fn decode(&self, bytes: &[u8], expected: Option<Generation>) -> Result<PatternHeader> {
        if let Some(expected) = expected.filter(|&expected| expected != Generation::G6) {
            warn!("G6 header decoded where {} was expected", expected);
            return Err(Error::UnsupportedGeneration {
                detail: "G6 header where another generation was expected",
            });
        }
        let mut reader = ByteReader::new(bytes);

        // Shared prefix.
        if reader.array::<4>()? != Self::MAGIC {
            warn!("G6 header: missing magic");
            return Err(Error::UnsupportedGeneration {
                detail: "G6 header magic missing",
            });
        }
        let version_byte = reader.u8()?;
        let id_byte = reader.u8()?;
        let frame_count = reader.u16_le()?;
        let num_panel_rows = reader.u8()?;
        let num_panel_cols = reader.u8()?;
        let gs_levels = reader.u8()?;
        let column_mask = reader.array::<MASK_LEN>()?;
        debug_assert_eq!(reader.position(), V1_LEN);

        // Version-specific suffix.
        let (version, column_order, generation_id, arena_id, observer_id) =
            match version_byte & VERSION_MASK {
                V1_DISCRIMINANT => (HeaderVersion::V1, ColumnOrder::Clockwise, 0, 0, 0),
                V2_DISCRIMINANT => {
                    let trailer = reader.u8()?;
                    let arena_id = ((version_byte >> 4) << 2) | (id_byte >> 6);
                    let observer_id = id_byte & ID_MAX;
                    let column_order = if trailer & CCW_FLAG == 0 {
                        ColumnOrder::Clockwise
                    } else {
                        ColumnOrder::CounterClockwise
                    };
                    let generation_id = trailer & GENERATION_ID_MASK;
                    check_generation_id(Generation::G6, generation_id)?;
                    (
                        HeaderVersion::V2,
                        column_order,
                        generation_id,
                        arena_id,
                        observer_id,
                    )
                }
                version => {
                    warn!("G6 header: unknown version discriminant {}", version);
                    return Err(Error::UnsupportedVersion { version });
                }
            };

        let bit_depth = BitDepth::from_gs_levels(gs_levels)?;
        if frame_count == 0 {
            return Err(ValidationError::EmptyFrameAxis {
                x_num: frame_count,
                y_num: 1,
            }
            .into());
        }
        let columns_installed = installed_columns(&column_mask, num_panel_cols)?;

        let header = PatternHeader {
            generation: Generation::G6,
            version,
            x_num: frame_count,
            y_num: 1,
            bit_depth,
            num_panel_rows,
            num_panel_cols,
            columns_installed,
            column_order,
            generation_id,
            arena_id,
            observer_id,
        };
        debug!(
            "G6 header: {} frames, {} rows x {} cols, partial {}",
            frame_count,
            num_panel_rows,
            num_panel_cols,
            header.columns_installed.is_some()
        );
        Ok(header)
    }
}

fn check_id(field: &'static str, value: u8) -> Result<()> {
    if value > ID_MAX {
        return Err(ValidationError::IdOutOfRange {
            field,
            value,
            max: ID_MAX,
        }
        .into());
    }
    Ok(())
}

fn column_mask(header: &PatternHeader) -> Result<[u8; MASK_LEN]> {
    let Some(columns) = &header.columns_installed else {
        return Ok(FULL_MASK);
    };
    let mut mask = [0u8; MASK_LEN];
    for &column in columns {
        let byte = mask
            .get_mut(usize::from(column / 8))
            .ok_or(GeometryError::ColumnOutOfRange {
                column,
                num_panel_cols: u8::try_from(MAX_PANEL_COLS).unwrap_or(u8::MAX),
            })?;
        *byte |= 1u8 << (column % 8);
    }
    let installed = popcount(&mask);
    if installed != u32::from(header.num_panel_cols) {
        return Err(ValidationError::ColumnMaskMismatch {
            declared: header.num_panel_cols,
            installed,
        }
        .into());
    }
    Ok(mask)
}

fn installed_columns(mask: &[u8; MASK_LEN], num_panel_cols: u8) -> Result<Option<ColumnList>> {
    if *mask == FULL_MASK {
        return Ok(None);
    }
    let installed = popcount(mask);
    if installed != u32::from(num_panel_cols) {
        warn!(
            "G6 header: column mask has {} columns, header declares {}",
            installed,
            num_panel_cols
        );
        return Err(ValidationError::ColumnMaskMismatch {
            declared: num_panel_cols,
            installed,
        }
        .into());
    }
    // At most MAX_PANEL_COLS bits, so the list cannot overflow.
    Ok(Some(
        (0..MAX_PANEL_COLS)
            .filter(|&column| mask.get(column / 8).is_some_and(|&byte| byte & (1u8 << (column % 8)) != 0))
            .filter_map(|column| u8::try_from(column).ok())
            .collect(),
    ))
}

fn popcount(mask: &[u8]) -> u32 {
    mask.iter().map(|byte| byte.count_ones()).sum()
}
