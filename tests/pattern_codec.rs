#![cfg(feature = "host")]
#![allow(missing_docs)]
//! Host-level tests for whole-pattern encoding and decoding.

use arena_pattern::arena::{ArenaConfig, ArenaGeometry, ColumnOrder, Generation};
use arena_pattern::bit_packer::BitDepth;
use arena_pattern::frame::PixelFrame;
use arena_pattern::header::HeaderVersion;
use arena_pattern::pattern::Pattern;
use arena_pattern::pattern_codec::{self, PatternCodec};
use arena_pattern::{Error, ValidationError};
use std::error::Error as StdError;

fn filled_pattern(geometry: &ArenaGeometry, bit_depth: BitDepth, x_num: u16, y_num: u16) -> Pattern {
    let mut pattern = Pattern::new(geometry, bit_depth, x_num, y_num);
    let levels = usize::from(bit_depth.max_value()) + 1;
    for y_index in 0..y_num {
        for x_index in 0..x_num {
            let seed = usize::from(y_index) * 31 + usize::from(x_index) * 11;
            if let Some(frame) = pattern.frame_mut(x_index, y_index) {
                let width = usize::from(frame.width());
                for (index, pixel) in frame.pixels_mut().iter_mut().enumerate() {
                    let (x, y) = (index % width, index / width);
                    *pixel = ((x * 3 + y * 5 + x * y / 7 + seed) % levels) as u8;
                }
            }
            pattern.set_stretch(x_index, y_index, ((seed / 11) % levels) as u8);
        }
    }
    pattern
}

fn with_ids_for(pattern: Pattern, geometry: &ArenaGeometry) -> Pattern {
    pattern
        .with_generation_id(geometry.generation().id())
        .with_arena_id(21)
        .with_observer_id(if geometry.generation() == Generation::G6 { 5 } else { 0 })
}

fn without_ids(pattern: Pattern) -> Pattern {
    pattern.with_generation_id(0).with_arena_id(0).with_observer_id(0)
}

#[test]
fn g6_two_by_ten_grayscale_round_trip() -> Result<(), Box<dyn StdError>> {
    let config = ArenaConfig::new(Generation::G6, 2, 10).with_pixels_per_panel(20);
    let geometry = ArenaGeometry::derive(&config)?;
    let mut pattern = Pattern::new(&geometry, BitDepth::Grayscale, 2, 1);
    if let Some(frame) = pattern.frame_mut(0, 0) {
        for y_index in 0..40 {
            for x_index in 0..200 {
                frame[(x_index, y_index)] = (x_index % 16) as u8;
            }
        }
    }
    if let Some(frame) = pattern.frame_mut(1, 0) {
        for y_index in 0..40 {
            for x_index in 0..200 {
                frame[(x_index, y_index)] = ((y_index + 2 * x_index) % 16) as u8;
            }
        }
    }
    assert_ne!(pattern.frame(0, 0), pattern.frame(1, 0));

    let codec = PatternCodec::new(&geometry)?;
    assert_eq!(codec.frame_len(BitDepth::Grayscale)?, 4003);
    for (version, header_len) in [(HeaderVersion::V1, 17), (HeaderVersion::V2, 18)] {
        let bytes = codec.encode(&pattern, version)?;
        assert_eq!(bytes.len(), header_len + 2 * 4003);

        let decoded = pattern_codec::decode(&bytes, Some(Generation::G6))?;
        assert_eq!(decoded.pattern, pattern);
        let frame = decoded.pattern.frame(1, 0).ok_or("missing frame")?;
        assert_eq!((frame.width(), frame.height()), (200, 40));
        assert_eq!(decoded.header.num_panel_rows, 2);
        assert_eq!(decoded.header.num_panel_cols, 10);
        assert_eq!(decoded.header.bit_depth.gs_levels(), 16);
        assert_eq!(decoded.header.num_frames(), 2);
        assert_eq!(decoded.header.version, version);
        assert_eq!(decoded.geometry, geometry);
    }
    Ok(())
}

#[test]
fn round_trip_every_generation_and_bit_depth() -> Result<(), Box<dyn StdError>> {
    let arenas = [
        (ArenaGeometry::full(Generation::G4, 3, 12)?, 3, 2),
        (ArenaGeometry::full(Generation::G4_1, 4, 12)?, 2, 2),
        (ArenaGeometry::full(Generation::G6, 2, 10)?, 3, 1),
    ];
    for (geometry, x_num, y_num) in &arenas {
        for bit_depth in [BitDepth::Binary, BitDepth::Grayscale] {
            let pattern = with_ids_for(filled_pattern(geometry, bit_depth, *x_num, *y_num), geometry);
            let expected_generation = Some(geometry.generation());

            let v2 = pattern_codec::encode(&pattern, geometry, HeaderVersion::V2)?;
            let decoded = pattern_codec::decode(&v2, expected_generation)?;
            assert_eq!(decoded.pattern, pattern);
            assert_eq!(decoded.header.generation, geometry.generation());

            let v1 = pattern_codec::encode(&pattern, geometry, HeaderVersion::V1)?;
            let decoded = pattern_codec::decode(&v1, expected_generation)?;
            assert_eq!(decoded.pattern, without_ids(pattern.clone()));
            assert_eq!(decoded.header.generation, geometry.generation());
        }
    }
    Ok(())
}

#[test]
fn v2_generation_id_identifies_g4_1_without_a_hint() -> Result<(), Box<dyn StdError>> {
    let geometry = ArenaGeometry::full(Generation::G4_1, 2, 4)?;
    let pattern = with_ids_for(filled_pattern(&geometry, BitDepth::Binary, 2, 1), &geometry);
    let bytes = pattern_codec::encode(&pattern, &geometry, HeaderVersion::V2)?;
    let decoded = pattern_codec::decode(&bytes, None)?;
    assert_eq!(decoded.header.generation, Generation::G4_1);
    assert_eq!(decoded.pattern.generation_id(), 3);
    assert_eq!(decoded.pattern.arena_id(), 21);
    Ok(())
}

#[test]
fn v1_never_fabricates_ids() -> Result<(), Box<dyn StdError>> {
    for geometry in [
        ArenaGeometry::full(Generation::G4, 2, 4)?,
        ArenaGeometry::full(Generation::G6, 1, 4)?,
    ] {
        let pattern = filled_pattern(&geometry, BitDepth::Grayscale, 2, 1)
            .with_arena_id(9)
            .with_observer_id(3);
        let bytes = pattern_codec::encode(&pattern, &geometry, HeaderVersion::V1)?;
        let decoded = pattern_codec::decode(&bytes, None)?;
        assert_eq!(decoded.pattern.generation_id(), 0);
        assert_eq!(decoded.pattern.arena_id(), 0);
        assert_eq!(decoded.pattern.observer_id(), 0);
        assert_eq!(decoded.header.version, HeaderVersion::V1);
    }
    Ok(())
}

#[test]
fn g4_row_id_bytes_are_one_based_panel_rows() -> Result<(), Box<dyn StdError>> {
    let geometry = ArenaGeometry::full(Generation::G4, 3, 12)?;
    let pattern = filled_pattern(&geometry, BitDepth::Binary, 1, 1);
    let bytes = pattern_codec::encode(&pattern, &geometry, HeaderVersion::V2)?;

    // 14-byte header, stretch byte, then 12 blocks of row id + 12 * 4 * 16 bits.
    let block_len = 1 + 12 * 4 * 16 / 8;
    assert_eq!(bytes.len(), 14 + 1 + 12 * block_len);
    for block in 0..12 {
        let row_id = bytes[14 + 1 + block * block_len];
        assert_eq!(usize::from(row_id), block / 4 + 1, "block {block}");
    }
    Ok(())
}

#[test]
fn wrong_row_id_byte_fails_decode() -> Result<(), Box<dyn StdError>> {
    let geometry = ArenaGeometry::full(Generation::G4, 3, 12)?;
    let pattern = filled_pattern(&geometry, BitDepth::Grayscale, 2, 1);
    let bytes = pattern_codec::encode(&pattern, &geometry, HeaderVersion::V2)?;
    let block_len = 1 + 12 * 4 * 16 / 2;

    // A constant row id is caught at the first block of panel row 2.
    let mut constant = bytes.clone();
    for block in 0..12 {
        constant[14 + 1 + block * block_len] = 1;
    }
    assert_eq!(
        pattern_codec::decode(&constant, Some(Generation::G4)),
        Err(Error::CorruptRowHeader {
            expected: 2,
            found: 1,
        })
    );

    let mut zeroed = bytes;
    zeroed[14 + 1] = 0;
    assert_eq!(
        pattern_codec::decode(&zeroed, Some(Generation::G4)),
        Err(Error::CorruptRowHeader {
            expected: 1,
            found: 0,
        })
    );
    Ok(())
}

#[test]
fn g6_row_id_bytes() -> Result<(), Box<dyn StdError>> {
    let geometry = ArenaGeometry::full(Generation::G6, 2, 10)?;
    let pattern = filled_pattern(&geometry, BitDepth::Binary, 1, 1);
    let bytes = pattern_codec::encode(&pattern, &geometry, HeaderVersion::V1)?;
    let block_len = 1 + 10 * 20 * 20 / 8;
    assert_eq!(bytes[17 + 1], 1);
    assert_eq!(bytes[17 + 1 + block_len], 2);
    Ok(())
}

#[test]
fn partial_arena_scales_frames_and_keeps_mask() -> Result<(), Box<dyn StdError>> {
    let config = ArenaConfig::new(Generation::G6, 2, 10).with_columns_installed(&[0, 1, 2, 3, 4, 5, 6, 7])?;
    let geometry = ArenaGeometry::derive(&config)?;
    let codec = PatternCodec::new(&geometry)?;
    assert_eq!(codec.frame_len(BitDepth::Grayscale)?, 1 + 2 * (1 + 8 * 20 * 20 / 2));

    let pattern = with_ids_for(filled_pattern(&geometry, BitDepth::Grayscale, 2, 1), &geometry);
    let bytes = codec.encode(&pattern, HeaderVersion::V2)?;
    assert_eq!(bytes[11..17], [0xFF, 0, 0, 0, 0, 0]);

    let decoded = pattern_codec::decode(&bytes, None)?;
    assert_eq!(decoded.pattern, pattern);
    assert_eq!(
        decoded.header.columns_installed.as_deref(),
        Some(&[0, 1, 2, 3, 4, 5, 6, 7][..])
    );
    assert_eq!(decoded.geometry.total_pixels_x(), geometry.total_pixels_x());

    let g4_config = ArenaConfig::new(Generation::G4, 3, 12).with_columns_installed(&[0, 1, 6, 7])?;
    let g4_geometry = ArenaGeometry::derive(&g4_config)?;
    let g4_codec = PatternCodec::new(&g4_geometry)?;
    assert_eq!(g4_codec.frame_len(BitDepth::Binary)?, 1 + 12 * (1 + 4 * 4 * 16 / 8));
    let g4_pattern = filled_pattern(&g4_geometry, BitDepth::Binary, 3, 1);
    let g4_bytes = g4_codec.encode(&g4_pattern, HeaderVersion::V1)?;
    assert_eq!(pattern_codec::decode(&g4_bytes, None)?.pattern, g4_pattern);
    Ok(())
}

#[test]
fn counter_clockwise_needs_v2() -> Result<(), Box<dyn StdError>> {
    for generation in [Generation::G4, Generation::G6] {
        let config = ArenaConfig::new(generation, 2, 6)
            .with_columns_installed(&[0, 2, 3])?
            .with_column_order(ColumnOrder::CounterClockwise);
        let geometry = ArenaGeometry::derive(&config)?;
        let pattern = filled_pattern(&geometry, BitDepth::Grayscale, 2, 1);

        let bytes = pattern_codec::encode(&pattern, &geometry, HeaderVersion::V2)?;
        let decoded = pattern_codec::decode(&bytes, Some(generation))?;
        assert_eq!(decoded.pattern, pattern);
        assert_eq!(decoded.header.column_order, ColumnOrder::CounterClockwise);

        assert_eq!(
            pattern_codec::encode(&pattern, &geometry, HeaderVersion::V1),
            Err(Error::Validation(ValidationError::ColumnOrderNotRecordable))
        );
    }
    Ok(())
}

#[test]
fn grayscale_boundaries_and_binary_overflow() -> Result<(), Box<dyn StdError>> {
    let geometry = ArenaGeometry::full(Generation::G4, 1, 2)?;
    let mut pattern = Pattern::new(&geometry, BitDepth::Grayscale, 1, 1);
    if let Some(frame) = pattern.frame_mut(0, 0) {
        frame[(0, 0)] = 15;
        frame[(31, 15)] = 15;
    }
    pattern.set_stretch(0, 0, 15);
    let bytes = pattern_codec::encode(&pattern, &geometry, HeaderVersion::V2)?;
    assert_eq!(pattern_codec::decode(&bytes, None)?.pattern, pattern);

    let mut binary = Pattern::new(&geometry, BitDepth::Binary, 1, 1);
    if let Some(frame) = binary.frame_mut(0, 0) {
        frame[(3, 3)] = 2;
    }
    assert_eq!(
        pattern_codec::encode(&binary, &geometry, HeaderVersion::V2),
        Err(Error::ValueOutOfRange { value: 2, max: 1 })
    );

    let stretched = Pattern::new(&geometry, BitDepth::Binary, 1, 1).with_stretch(vec![2]);
    assert_eq!(
        pattern_codec::encode(&stretched, &geometry, HeaderVersion::V2),
        Err(Error::ValueOutOfRange { value: 2, max: 1 })
    );
    Ok(())
}

#[test]
fn invalid_patterns_are_rejected_before_encoding() -> Result<(), Box<dyn StdError>> {
    let geometry = ArenaGeometry::full(Generation::G4, 2, 4)?;
    let frame = PixelFrame::new(64, 32);

    let empty = Pattern::from_frames(BitDepth::Binary, 0, 1, vec![], vec![]);
    assert!(matches!(
        pattern_codec::encode(&empty, &geometry, HeaderVersion::V2),
        Err(Error::Validation(ValidationError::EmptyFrameAxis { .. }))
    ));

    let missing_frame = Pattern::from_frames(BitDepth::Binary, 2, 1, vec![frame.clone()], vec![0, 0]);
    assert_eq!(
        pattern_codec::encode(&missing_frame, &geometry, HeaderVersion::V2),
        Err(Error::Validation(ValidationError::FrameCountMismatch {
            expected: 2,
            found: 1,
        }))
    );

    let missing_stretch = Pattern::from_frames(BitDepth::Binary, 1, 1, vec![frame.clone()], vec![]);
    assert_eq!(
        pattern_codec::encode(&missing_stretch, &geometry, HeaderVersion::V2),
        Err(Error::Validation(ValidationError::StretchLengthMismatch {
            expected: 1,
            found: 0,
        }))
    );

    let wrong_size = Pattern::from_frames(
        BitDepth::Binary,
        1,
        1,
        vec![PixelFrame::new(64, 16)],
        vec![0],
    );
    assert!(matches!(
        pattern_codec::encode(&wrong_size, &geometry, HeaderVersion::V2),
        Err(Error::Validation(ValidationError::FrameSizeMismatch { index: 0, .. }))
    ));

    let wrong_generation =
        Pattern::from_frames(BitDepth::Binary, 1, 1, vec![frame], vec![0]).with_generation_id(4);
    assert_eq!(
        pattern_codec::encode(&wrong_generation, &geometry, HeaderVersion::V2),
        Err(Error::Validation(ValidationError::GenerationIdMismatch {
            expected: 2,
            found: 4,
        }))
    );
    Ok(())
}

#[test]
fn g6_patterns_have_one_axis() -> Result<(), Box<dyn StdError>> {
    let geometry = ArenaGeometry::full(Generation::G6, 1, 2)?;
    let pattern = Pattern::new(&geometry, BitDepth::Binary, 2, 2);
    assert_eq!(
        pattern_codec::encode(&pattern, &geometry, HeaderVersion::V2),
        Err(Error::Validation(ValidationError::MultiAxisUnsupported {
            y_num: 2
        }))
    );
    Ok(())
}

#[test]
fn g6_ids_out_of_range_are_rejected() -> Result<(), Box<dyn StdError>> {
    let geometry = ArenaGeometry::full(Generation::G6, 1, 2)?;
    let pattern = Pattern::new(&geometry, BitDepth::Binary, 1, 1).with_observer_id(64);
    assert!(matches!(
        pattern_codec::encode(&pattern, &geometry, HeaderVersion::V2),
        Err(Error::Validation(ValidationError::IdOutOfRange { .. }))
    ));
    // V1 cannot record ids, so nothing is out of range.
    assert!(pattern_codec::encode(&pattern, &geometry, HeaderVersion::V1).is_ok());
    Ok(())
}

#[test]
fn truncated_and_trailing_bytes() -> Result<(), Box<dyn StdError>> {
    let geometry = ArenaGeometry::full(Generation::G4, 2, 4)?;
    let pattern = filled_pattern(&geometry, BitDepth::Grayscale, 3, 1);
    let bytes = pattern_codec::encode(&pattern, &geometry, HeaderVersion::V2)?;

    let short = &bytes[..bytes.len() - 1];
    assert_eq!(
        pattern_codec::decode(short, None),
        Err(Error::TruncatedData {
            needed: bytes.len(),
            available: bytes.len() - 1,
        })
    );
    assert!(matches!(
        pattern_codec::decode(&bytes[..5], None),
        Err(Error::TruncatedData { .. })
    ));

    let mut padded = bytes.clone();
    padded.extend_from_slice(&[0xEE; 7]);
    assert_eq!(pattern_codec::decode(&padded, None)?.pattern, pattern);
    Ok(())
}

#[test]
fn single_frames_match_file_slices() -> Result<(), Box<dyn StdError>> {
    let geometry = ArenaGeometry::full(Generation::G4, 2, 3)?;
    let pattern = filled_pattern(&geometry, BitDepth::Grayscale, 3, 2);
    let codec = PatternCodec::new(&geometry)?;
    let bytes = codec.encode(&pattern, HeaderVersion::V2)?;
    let frame_len = codec.frame_len(BitDepth::Grayscale)?;

    let frame_bytes = codec.encode_frame(&pattern, 1, 1)?;
    // Frame (1, 1) is stored at index 1 * x_num + 1 = 4.
    let offset = 14 + 4 * frame_len;
    assert_eq!(frame_bytes, bytes[offset..offset + frame_len]);

    let (frame, stretch) = codec.decode_frame(&frame_bytes, BitDepth::Grayscale)?;
    assert_eq!(Some(&frame), pattern.frame(1, 1));
    assert_eq!(Some(stretch), pattern.stretch_at(1, 1));

    assert_eq!(
        codec.encode_frame(&pattern, 3, 0),
        Err(Error::Validation(ValidationError::FrameIndexOutOfRange {
            x_index: 3,
            y_index: 0,
            x_num: 3,
            y_num: 2,
        }))
    );
    Ok(())
}

#[test]
fn g3_has_no_pattern_codec() -> Result<(), Box<dyn StdError>> {
    let geometry = ArenaGeometry::full(Generation::G3, 4, 12)?;
    assert!(matches!(
        PatternCodec::new(&geometry),
        Err(Error::UnsupportedGeneration { .. })
    ));
    Ok(())
}

#[test]
fn expected_generation_must_match_family() -> Result<(), Box<dyn StdError>> {
    let geometry = ArenaGeometry::full(Generation::G6, 1, 3)?;
    let pattern = filled_pattern(&geometry, BitDepth::Binary, 1, 1);
    let bytes = pattern_codec::encode(&pattern, &geometry, HeaderVersion::V2)?;
    assert!(matches!(
        pattern_codec::decode(&bytes, Some(Generation::G4_1)),
        Err(Error::UnsupportedGeneration { .. })
    ));
    assert!(pattern_codec::decode(&bytes, Some(Generation::G6)).is_ok());
    Ok(())
}
