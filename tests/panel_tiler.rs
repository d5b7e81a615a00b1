#![cfg(feature = "host")]
#![allow(missing_docs)]
//! Host-level tests for panel tiling order, row ids, and the G6 row flip.

use arena_pattern::arena::{ArenaConfig, ArenaGeometry, ColumnOrder, Generation};
use arena_pattern::frame::PixelFrame;
use arena_pattern::panel_tiler::{PanelTiler, RowOrigin};
use arena_pattern::{Error, ValidationError};
use std::error::Error as StdError;

fn test_frame(geometry: &ArenaGeometry, seed: usize) -> PixelFrame {
    let mut frame = PixelFrame::new(geometry.total_pixels_x(), geometry.total_pixels_y());
    for (index, pixel) in frame.pixels_mut().iter_mut().enumerate() {
        *pixel = ((index * 7 + seed * 3 + index / 13) % 16) as u8;
    }
    frame
}

fn tiler_for(geometry: &ArenaGeometry) -> Result<PanelTiler, Error> {
    PanelTiler::for_generation(geometry.generation())
}

#[test]
fn hardware_tilings() -> Result<(), Box<dyn StdError>> {
    let g4 = PanelTiler::for_generation(Generation::G4)?;
    assert_eq!((g4.subpanel_count(), g4.row_origin()), (4, RowOrigin::Top));
    assert_eq!(PanelTiler::for_generation(Generation::G4_1)?, g4);
    let g6 = PanelTiler::for_generation(Generation::G6)?;
    assert_eq!((g6.subpanel_count(), g6.row_origin()), (1, RowOrigin::Bottom));
    assert!(matches!(
        PanelTiler::for_generation(Generation::G3),
        Err(Error::UnsupportedGeneration { .. })
    ));
    Ok(())
}

#[test]
fn g4_blocks_carry_one_based_row_ids() -> Result<(), Box<dyn StdError>> {
    let geometry = ArenaGeometry::full(Generation::G4, 3, 2)?;
    let tiler = tiler_for(&geometry)?;
    let blocks = tiler.tile(&test_frame(&geometry, 1), &geometry)?;
    let row_ids: Vec<u8> = blocks.iter().map(|block| block.row_id).collect();
    assert_eq!(row_ids, [1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3]);
    assert!(blocks.iter().all(|block| block.pixels.len() == 2 * 4 * 16));
    Ok(())
}

#[test]
fn g4_subpanels_are_four_row_slices() -> Result<(), Box<dyn StdError>> {
    let geometry = ArenaGeometry::full(Generation::G4, 1, 1)?;
    let mut frame = PixelFrame::new(16, 16);
    for y_index in 0..16 {
        for x_index in 0..16 {
            frame[(x_index, y_index)] = (y_index / 4) as u8;
        }
    }
    let blocks = tiler_for(&geometry)?.tile(&frame, &geometry)?;
    assert_eq!(blocks.len(), 4);
    for (subpanel, block) in blocks.iter().enumerate() {
        assert!(block.pixels.iter().all(|&value| usize::from(value) == subpanel));
    }
    Ok(())
}

#[test]
fn columns_are_walked_in_physical_order_within_a_block() -> Result<(), Box<dyn StdError>> {
    let geometry = ArenaGeometry::full(Generation::G4, 1, 2)?;
    let mut frame = PixelFrame::new(32, 16);
    for y_index in 0..16 {
        for x_index in 16..32 {
            frame[(x_index, y_index)] = 1;
        }
    }
    let blocks = tiler_for(&geometry)?.tile(&frame, &geometry)?;
    // Column 0's four rows come first, then column 1's.
    let first = blocks.first().ok_or("no blocks")?;
    assert!(first.pixels[..64].iter().all(|&value| value == 0));
    assert!(first.pixels[64..].iter().all(|&value| value == 1));
    Ok(())
}

#[test]
fn g6_stores_rows_bottom_up() -> Result<(), Box<dyn StdError>> {
    let geometry = ArenaGeometry::full(Generation::G6, 1, 1)?;
    let mut frame = PixelFrame::new(20, 20);
    for y_index in 0..20 {
        for x_index in 0..20 {
            frame[(x_index, y_index)] = y_index as u8;
        }
    }
    let blocks = tiler_for(&geometry)?.tile(&frame, &geometry)?;
    assert_eq!(blocks.len(), 1);
    let block = &blocks[0];
    assert_eq!(block.row_id, 1);
    for (stored_row, run) in block.pixels.chunks(20).enumerate() {
        assert!(run.iter().all(|&value| usize::from(value) == 19 - stored_row));
    }
    assert_eq!(tiler_for(&geometry)?.untile(&blocks, &geometry)?, frame);
    Ok(())
}

#[test]
fn counter_clockwise_logical_columns_land_in_reverse_slots() -> Result<(), Box<dyn StdError>> {
    let config =
        ArenaConfig::new(Generation::G4, 1, 3).with_column_order(ColumnOrder::CounterClockwise);
    let geometry = ArenaGeometry::derive(&config)?;
    let mut frame = PixelFrame::new(48, 16);
    for y_index in 0..16 {
        for logical_col in 0..3 {
            for x_index in 0..16 {
                frame[(logical_col * 16 + x_index, y_index)] = logical_col as u8 + 1;
            }
        }
    }
    let blocks = tiler_for(&geometry)?.tile(&frame, &geometry)?;
    // Physical slot 0 holds logical column 2.
    let runs: Vec<u8> = blocks[0].pixels.chunks(64).map(|run| run[0]).collect();
    assert_eq!(runs, [3, 2, 1]);
    Ok(())
}

#[test]
fn untile_inverts_tile() -> Result<(), Box<dyn StdError>> {
    let configs = [
        ArenaConfig::new(Generation::G4, 3, 12),
        ArenaConfig::new(Generation::G4_1, 4, 12)
            .with_columns_installed(&[0, 2, 3, 7])?
            .with_column_order(ColumnOrder::CounterClockwise),
        ArenaConfig::new(Generation::G6, 2, 10),
        ArenaConfig::new(Generation::G6, 3, 12).with_columns_installed(&[1, 4, 5, 11])?,
    ];
    for (seed, config) in configs.iter().enumerate() {
        let geometry = ArenaGeometry::derive(config)?;
        let tiler = tiler_for(&geometry)?;
        let frame = test_frame(&geometry, seed);
        let blocks = tiler.tile(&frame, &geometry)?;
        assert_eq!(blocks.len(), tiler.blocks_per_frame(&geometry));
        assert_eq!(tiler.untile(&blocks, &geometry)?, frame);
    }
    Ok(())
}

#[test]
fn wrong_row_id_is_corrupt() -> Result<(), Box<dyn StdError>> {
    let geometry = ArenaGeometry::full(Generation::G4, 2, 4)?;
    let tiler = tiler_for(&geometry)?;
    let mut blocks = tiler.tile(&test_frame(&geometry, 0), &geometry)?;
    blocks[5].row_id = 0;
    assert_eq!(
        tiler.untile(&blocks, &geometry),
        Err(Error::CorruptRowHeader {
            expected: 2,
            found: 0,
        })
    );
    Ok(())
}

#[test]
fn block_count_and_size_are_checked() -> Result<(), Box<dyn StdError>> {
    let geometry = ArenaGeometry::full(Generation::G6, 2, 3)?;
    let tiler = tiler_for(&geometry)?;
    let mut blocks = tiler.tile(&test_frame(&geometry, 2), &geometry)?;

    let missing = &blocks[..1];
    assert_eq!(
        tiler.untile(missing, &geometry),
        Err(Error::Validation(ValidationError::BlockCountMismatch {
            expected: 2,
            found: 1,
        }))
    );

    blocks[1].pixels.pop();
    assert_eq!(
        tiler.untile(&blocks, &geometry),
        Err(Error::Validation(ValidationError::BlockSizeMismatch {
            index: 1,
            expected: 3 * 20 * 20,
            found: 3 * 20 * 20 - 1,
        }))
    );
    Ok(())
}

#[test]
fn frame_must_match_arena_size() -> Result<(), Box<dyn StdError>> {
    let geometry = ArenaGeometry::full(Generation::G4, 2, 4)?;
    let result = tiler_for(&geometry)?.tile(&PixelFrame::new(64, 16), &geometry);
    assert!(matches!(
        result,
        Err(Error::Validation(ValidationError::FrameSizeMismatch {
            expected_width: 64,
            expected_height: 32,
            ..
        }))
    ));
    Ok(())
}

#[test]
fn subpanel_count_must_divide_panel_size() -> Result<(), Box<dyn StdError>> {
    let geometry = ArenaGeometry::full(Generation::G4, 1, 1)?;
    let tiler = PanelTiler::new(3, RowOrigin::Top);
    assert_eq!(
        tiler.tile(&PixelFrame::new(16, 16), &geometry),
        Err(Error::Validation(ValidationError::UnevenSubpanels {
            pixels_per_panel: 16,
            subpanel_count: 3,
        }))
    );

    // A custom, evenly dividing tiling still round-trips.
    let tiler = PanelTiler::new(2, RowOrigin::Bottom);
    let frame = test_frame(&geometry, 5);
    let blocks = tiler.tile(&frame, &geometry)?;
    assert_eq!(blocks.len(), 2);
    assert_eq!(tiler.untile(&blocks, &geometry)?, frame);
    Ok(())
}
