//! Mapping a full frame to and from the ordered panel blocks a controller consumes.
//!
//! A frame is cut into one block per `(panel row, subpanel)`, top panel row first.
//! Each block holds, for every installed column in physical order, the pixel rows
//! of that subpanel slice, left to right. Every block is tagged with the 1-based
//! index of its panel row; the decoder checks those tags.
//!
//! ```text
//! G4 panel (16×16), 4 subpanels of 4 rows:     G6 panel (20×20), 1 subpanel, bottom origin:
//!
//!   rows  0..4   → block (row r, subpanel 0)     stored row 0  = displayed row 19
//!   rows  4..8   → block (row r, subpanel 1)     stored row 1  = displayed row 18
//!   rows  8..12  → block (row r, subpanel 2)     ...
//!   rows 12..16  → block (row r, subpanel 3)     stored row 19 = displayed row 0
//! ```

use alloc::vec::Vec;

use itertools::iproduct;

use crate::arena::{ArenaGeometry, Generation};
use crate::error::ValidationError;
use crate::frame::PixelFrame;
use crate::{Error, Result};

/// Which physical pixel row a panel's stored row 0 refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RowOrigin {
    /// Stored row 0 is the top of the panel (G4 family).
    Top,
    /// Stored row 0 is the bottom of the panel (G6); rows are flipped on the way in and out.
    Bottom,
}

/// One addressable slice of a panel row: its row id and the packed-order pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubpanelBlock {
    /// 1-based physical panel row.
    pub row_id: u8,
    /// Pixel values, installed columns in physical order, stored rows within each panel.
    pub pixels: Vec<u8>,
}

/// Splits frames into [`SubpanelBlock`]s and back.
///
/// The subpanel count and row origin are explicit parameters rather than
/// conventions baked into loop bounds; [`PanelTiler::for_generation`] supplies the
/// hardware values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PanelTiler {
    subpanel_count: u8,
    row_origin: RowOrigin,
}

impl PanelTiler {
    /// G4 and G4.1: four 4-row subpanels, top origin.
    pub const G4_FAMILY: Self = Self::new(4, RowOrigin::Top);
    /// G6: whole panels, bottom origin.
    pub const G6: Self = Self::new(1, RowOrigin::Bottom);

    /// A tiler with explicit parameters. `subpanel_count` must divide the panel size
    /// of any geometry it is used with.
    #[must_use]
    pub const fn new(subpanel_count: u8, row_origin: RowOrigin) -> Self {
        Self {
            subpanel_count,
            row_origin,
        }
    }

    /// The hardware tiling for `generation`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedGeneration`] for G3, which has no pattern format here.
    pub const fn for_generation(generation: Generation) -> Result<Self> {
        match generation {
            Generation::G4 | Generation::G4_1 => Ok(Self::G4_FAMILY),
            Generation::G6 => Ok(Self::G6),
            Generation::G3 => Err(Error::UnsupportedGeneration {
                detail: "G3 has no pattern format",
            }),
        }
    }

    /// Subpanels per panel row.
    #[must_use]
    pub const fn subpanel_count(&self) -> u8 {
        self.subpanel_count
    }

    /// Stored row order within a panel.
    #[must_use]
    pub const fn row_origin(&self) -> RowOrigin {
        self.row_origin
    }

    /// Blocks in one frame: panel rows × subpanels.
    #[must_use]
    pub fn blocks_per_frame(&self, geometry: &ArenaGeometry) -> usize {
        usize::from(geometry.num_panel_rows()) * usize::from(self.subpanel_count)
    }

    /// Pixels in one block: installed columns × subpanel rows × panel width.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnevenSubpanels`] if the panel size is not a
    /// multiple of the subpanel count.
    pub fn block_pixel_count(&self, geometry: &ArenaGeometry) -> Result<usize> {
        let pixels_per_panel = usize::from(geometry.pixels_per_panel());
        let rows_per_subpanel = self.rows_per_subpanel(geometry)?;
        Ok(usize::from(geometry.num_installed_cols()) * rows_per_subpanel * pixels_per_panel)
    }

    /// Split `frame` into blocks, in wire order.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::FrameSizeMismatch`] if `frame` is not the arena's
    /// pixel size, or [`ValidationError::UnevenSubpanels`] (see [`Self::block_pixel_count`]).
    pub fn tile(&self, frame: &PixelFrame, geometry: &ArenaGeometry) -> Result<Vec<SubpanelBlock>> {
        check_frame_size(frame, geometry)?;
        let rows_per_subpanel = self.rows_per_subpanel(geometry)?;
        let block_pixel_count = self.block_pixel_count(geometry)?;
        let traversal = physical_traversal(geometry);

        iproduct!(0..geometry.num_panel_rows(), 0..self.subpanel_count)
            .map(|(panel_row, subpanel)| -> Result<SubpanelBlock> {
                let mut pixels = Vec::with_capacity(block_pixel_count);
                for &logical_col in &traversal {
                    for stored_row in self.stored_rows(subpanel, rows_per_subpanel) {
                        let (y_index, x_range) =
                            self.panel_span(geometry, panel_row, stored_row, logical_col);
                        let row = frame
                            .row(y_index)
                            .and_then(|row| row.get(x_range))
                            .ok_or(Error::Validation(ValidationError::BlockSizeMismatch {
                                index: usize::from(panel_row),
                                expected: block_pixel_count,
                                found: pixels.len(),
                            }))?;
                        pixels.extend_from_slice(row);
                    }
                }
                Ok(SubpanelBlock {
                    row_id: panel_row + 1,
                    pixels,
                })
            })
            .collect()
    }

    /// Reassemble a frame from blocks produced by [`Self::tile`].
    ///
    /// # Errors
    ///
    /// - [`Error::CorruptRowHeader`] if a block's `row_id` is not its 1-based panel row
    /// - [`ValidationError::BlockCountMismatch`] / [`ValidationError::BlockSizeMismatch`]
    ///   if the blocks do not cover the arena exactly
    pub fn untile(&self, blocks: &[SubpanelBlock], geometry: &ArenaGeometry) -> Result<PixelFrame> {
        let expected = self.blocks_per_frame(geometry);
        if blocks.len() != expected {
            return Err(ValidationError::BlockCountMismatch {
                expected,
                found: blocks.len(),
            }
            .into());
        }
        let rows_per_subpanel = self.rows_per_subpanel(geometry)?;
        let block_pixel_count = self.block_pixel_count(geometry)?;
        let pixels_per_panel = usize::from(geometry.pixels_per_panel());
        let traversal = physical_traversal(geometry);
        let mut frame = PixelFrame::new(geometry.total_pixels_x(), geometry.total_pixels_y());
        let width = usize::from(frame.width());

        let positions = iproduct!(0..geometry.num_panel_rows(), 0..self.subpanel_count);
        for (index, (block, (panel_row, subpanel))) in blocks.iter().zip(positions).enumerate() {
            let expected_row_id = panel_row + 1;
            if block.row_id != expected_row_id {
                warn!(
                    "untile: block {} has row id {}, expected {}",
                    index,
                    block.row_id,
                    expected_row_id
                );
                return Err(Error::CorruptRowHeader {
                    expected: expected_row_id,
                    found: block.row_id,
                });
            }
            if block.pixels.len() != block_pixel_count {
                return Err(ValidationError::BlockSizeMismatch {
                    index,
                    expected: block_pixel_count,
                    found: block.pixels.len(),
                }
                .into());
            }

            let mut runs = block.pixels.chunks_exact(pixels_per_panel);
            for &logical_col in &traversal {
                for stored_row in self.stored_rows(subpanel, rows_per_subpanel) {
                    let (y_index, x_range) =
                        self.panel_span(geometry, panel_row, stored_row, logical_col);
                    let start = y_index * width + x_range.start;
                    let end = y_index * width + x_range.end;
                    if let (Some(run), Some(target)) =
                        (runs.next(), frame.pixels_mut().get_mut(start..end))
                    {
                        target.copy_from_slice(run);
                    }
                }
            }
        }
        Ok(frame)
    }

    fn rows_per_subpanel(&self, geometry: &ArenaGeometry) -> Result<usize> {
        let pixels_per_panel = geometry.pixels_per_panel();
        let subpanel_count = self.subpanel_count;
        if subpanel_count == 0 || pixels_per_panel % u16::from(subpanel_count) != 0 {
            return Err(ValidationError::UnevenSubpanels {
                pixels_per_panel,
                subpanel_count,
            }
            .into());
        }
        Ok(usize::from(pixels_per_panel / u16::from(subpanel_count)))
    }

    // Stored (wire-order) panel rows covered by one subpanel.
    fn stored_rows(&self, subpanel: u8, rows_per_subpanel: usize) -> core::ops::Range<usize> {
        let first = usize::from(subpanel) * rows_per_subpanel;
        first..first + rows_per_subpanel
    }

    // Frame row and column range of one stored panel row.
    fn panel_span(
        &self,
        geometry: &ArenaGeometry,
        panel_row: u8,
        stored_row: usize,
        logical_col: usize,
    ) -> (usize, core::ops::Range<usize>) {
        let pixels_per_panel = usize::from(geometry.pixels_per_panel());
        let panel_local_row = match self.row_origin {
            RowOrigin::Top => stored_row,
            RowOrigin::Bottom => pixels_per_panel - 1 - stored_row,
        };
        let y_index = usize::from(panel_row) * pixels_per_panel + panel_local_row;
        let x_start = logical_col * pixels_per_panel;
        (y_index, x_start..x_start + pixels_per_panel)
    }
}

/// Logical column indices ordered by their physical slot.
fn physical_traversal(geometry: &ArenaGeometry) -> Vec<usize> {
    let mut slots: Vec<(u8, usize)> = (0..usize::from(geometry.num_installed_cols()))
        .filter_map(|logical_col| {
            geometry
                .physical_column_index(logical_col)
                .map(|physical| (physical, logical_col))
        })
        .collect();
    slots.sort_unstable();
    slots.into_iter().map(|(_, logical_col)| logical_col).collect()
}

fn check_frame_size(frame: &PixelFrame, geometry: &ArenaGeometry) -> Result<()> {
    let (expected_width, expected_height) = (geometry.total_pixels_x(), geometry.total_pixels_y());
    if frame.width() != expected_width || frame.height() != expected_height {
        return Err(ValidationError::FrameSizeMismatch {
            index: 0,
            expected_width,
            expected_height,
            width: frame.width(),
            height: frame.height(),
        }
        .into());
    }
    Ok(())
}
