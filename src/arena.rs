//! Arena geometry: which panels exist, how big they are, and how columns are traversed.
//!
//! An external resolver turns an arena configuration file into an [`ArenaConfig`];
//! [`ArenaGeometry::derive`] validates it once and freezes it. Everything the codec
//! needs (pixel dimensions, installed columns in physical order) is derived here.
//!
//! # Example
//!
//! A G6 arena with 2 panel rows and 10 columns, of which only the first 8 are installed:
//!
//! ```rust
//! use arena_pattern::arena::{ArenaConfig, ArenaGeometry, Generation};
//!
//! let config = ArenaConfig::new(Generation::G6, 2, 10)
//!     .with_columns_installed(&[0, 1, 2, 3, 4, 5, 6, 7])?;
//! let geometry = ArenaGeometry::derive(&config)?;
//!
//! assert_eq!(geometry.total_pixels_x(), 8 * 20);
//! assert_eq!(geometry.total_pixels_y(), 2 * 20);
//! assert_eq!(geometry.num_panels_installed(), 16);
//! assert_eq!(geometry.physical_column_index(7), Some(7));
//! # Ok::<(), arena_pattern::Error>(())
//! ```

mod generation;

pub use generation::{ColumnOrder, Generation};

use serde::{Deserialize, Serialize};

use crate::error::GeometryError;
use crate::{Error, Result};

/// Widest arena (in panel columns) that every header family can describe.
///
/// Matches the 48-bit installed-column mask in G6 headers.
pub const MAX_PANEL_COLS: usize = 48;

/// Bounded list of physical column indices.
pub type ColumnList = heapless::Vec<u8, MAX_PANEL_COLS>;

/// Resolved arena configuration, as handed over by the configuration layer.
///
/// This is plain data: nothing is checked until [`ArenaGeometry::derive`].
/// `pixels_per_panel` is optional because it is fixed by the generation; when a
/// configuration states it anyway, derivation verifies it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArenaConfig {
    /// Hardware generation.
    pub generation: Generation,
    /// Panel rows in the full grid.
    pub num_panel_rows: u8,
    /// Panel columns in the full grid.
    pub num_panel_cols: u8,
    /// Populated columns for partial arenas; `None` means every column.
    #[serde(default)]
    pub columns_installed: Option<ColumnList>,
    /// Optional restatement of the generation's panel size.
    #[serde(default)]
    pub pixels_per_panel: Option<u16>,
    /// Logical column traversal direction.
    #[serde(default)]
    pub column_order: ColumnOrder,
    /// Rotational offset of column 0, in degrees.
    #[serde(default)]
    pub angle_offset_deg: f32,
}

impl ArenaConfig {
    /// Full arena, clockwise, no angle offset.
    #[must_use]
    pub const fn new(generation: Generation, num_panel_rows: u8, num_panel_cols: u8) -> Self {
        Self {
            generation,
            num_panel_rows,
            num_panel_cols,
            columns_installed: None,
            pixels_per_panel: None,
            column_order: ColumnOrder::Clockwise,
            angle_offset_deg: 0.0,
        }
    }

    /// Restrict the arena to the listed physical columns.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::TooManyColumns`] if more than [`MAX_PANEL_COLS`] are listed.
    pub fn with_columns_installed(mut self, columns: &[u8]) -> Result<Self> {
        let list = ColumnList::from_slice(columns).map_err(|()| GeometryError::TooManyColumns {
            num_panel_cols: self.num_panel_cols,
            max: MAX_PANEL_COLS,
        })?;
        self.columns_installed = Some(list);
        Ok(self)
    }

    /// Set the column traversal direction.
    #[must_use]
    pub const fn with_column_order(mut self, column_order: ColumnOrder) -> Self {
        self.column_order = column_order;
        self
    }

    /// Set the rotational offset of column 0.
    #[must_use]
    pub const fn with_angle_offset_deg(mut self, angle_offset_deg: f32) -> Self {
        self.angle_offset_deg = angle_offset_deg;
        self
    }

    /// State the panel size explicitly (checked against the generation on derive).
    #[must_use]
    pub const fn with_pixels_per_panel(mut self, pixels_per_panel: u16) -> Self {
        self.pixels_per_panel = Some(pixels_per_panel);
        self
    }
}

/// A validated, immutable description of one physical display.
///
/// Derived values (pixel dimensions, panel count, radius) are computed from the
/// stored fields on demand and are never stored independently.
#[derive(Clone, Debug, PartialEq)]
pub struct ArenaGeometry {
    generation: Generation,
    num_panel_rows: u8,
    num_panel_cols: u8,
    // `None` for full arenas, including partial lists that turn out to cover every column.
    columns_installed: Option<ColumnList>,
    installed: ColumnList,
    column_order: ColumnOrder,
    angle_offset_deg: f32,
}

impl ArenaGeometry {
    /// Validate a configuration and derive the geometry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Geometry`] when the grid is empty or wider than
    /// [`MAX_PANEL_COLS`], when a stated `pixels_per_panel` disagrees with the
    /// generation, or when `columns_installed` is empty, out of range, or not
    /// strictly increasing.
    pub fn derive(config: &ArenaConfig) -> Result<Self> {
        let ArenaConfig {
            generation,
            num_panel_rows,
            num_panel_cols,
            ref columns_installed,
            pixels_per_panel,
            column_order,
            angle_offset_deg,
        } = *config;

        if num_panel_rows == 0 || num_panel_cols == 0 {
            return Err(GeometryError::ZeroPanels {
                num_panel_rows,
                num_panel_cols,
            }
            .into());
        }
        if usize::from(num_panel_cols) > MAX_PANEL_COLS {
            return Err(GeometryError::TooManyColumns {
                num_panel_cols,
                max: MAX_PANEL_COLS,
            }
            .into());
        }
        if let Some(found) = pixels_per_panel {
            let expected = generation.pixels_per_panel();
            if found != expected {
                return Err(GeometryError::PixelsPerPanelMismatch {
                    generation,
                    expected,
                    found,
                }
                .into());
            }
        }

        let installed = match columns_installed {
            Some(columns) => validate_columns(columns, num_panel_cols)?,
            None => (0..num_panel_cols).collect(),
        };
        let columns_installed = columns_installed
            .as_ref()
            .filter(|columns| columns.len() < usize::from(num_panel_cols))
            .cloned();

        Ok(Self {
            generation,
            num_panel_rows,
            num_panel_cols,
            columns_installed,
            installed,
            column_order,
            angle_offset_deg,
        })
    }

    /// Shorthand for a full, clockwise arena.
    ///
    /// # Errors
    ///
    /// See [`Self::derive`].
    pub fn full(generation: Generation, num_panel_rows: u8, num_panel_cols: u8) -> Result<Self> {
        Self::derive(&ArenaConfig::new(generation, num_panel_rows, num_panel_cols))
    }

    /// Rebuild a configuration that derives to this geometry.
    #[must_use]
    pub fn to_config(&self) -> ArenaConfig {
        ArenaConfig {
            generation: self.generation,
            num_panel_rows: self.num_panel_rows,
            num_panel_cols: self.num_panel_cols,
            columns_installed: self.columns_installed.clone(),
            pixels_per_panel: None,
            column_order: self.column_order,
            angle_offset_deg: self.angle_offset_deg,
        }
    }

    /// Hardware generation.
    #[must_use]
    pub const fn generation(&self) -> Generation {
        self.generation
    }

    /// Panel rows in the grid.
    #[must_use]
    pub const fn num_panel_rows(&self) -> u8 {
        self.num_panel_rows
    }

    /// Panel columns in the full grid (installed or not).
    #[must_use]
    pub const fn num_panel_cols(&self) -> u8 {
        self.num_panel_cols
    }

    /// Installed columns of a partial arena; `None` when every column is installed.
    #[must_use]
    pub fn columns_installed(&self) -> Option<&[u8]> {
        self.columns_installed.as_deref()
    }

    /// Installed physical columns in increasing order (every column for full arenas).
    #[must_use]
    pub fn installed_columns(&self) -> &[u8] {
        &self.installed
    }

    /// `true` when some columns of the grid are not populated.
    #[must_use]
    pub const fn is_partial(&self) -> bool {
        self.columns_installed.is_some()
    }

    /// Number of installed panel columns.
    #[must_use]
    pub fn num_installed_cols(&self) -> u8 {
        // Bounded by MAX_PANEL_COLS, so always fits.
        u8::try_from(self.installed.len()).unwrap_or(u8::MAX)
    }

    /// Pixels along one side of a panel.
    #[must_use]
    pub const fn pixels_per_panel(&self) -> u16 {
        self.generation.pixels_per_panel()
    }

    /// Logical column traversal direction.
    #[must_use]
    pub const fn column_order(&self) -> ColumnOrder {
        self.column_order
    }

    /// Rotational offset of column 0, in degrees.
    #[must_use]
    pub const fn angle_offset_deg(&self) -> f32 {
        self.angle_offset_deg
    }

    /// Frame width in pixels: installed columns × panel size.
    #[must_use]
    pub fn total_pixels_x(&self) -> u16 {
        u16::from(self.num_installed_cols()) * self.pixels_per_panel()
    }

    /// Frame height in pixels: panel rows × panel size.
    #[must_use]
    pub fn total_pixels_y(&self) -> u16 {
        u16::from(self.num_panel_rows) * self.pixels_per_panel()
    }

    /// Installed panels (rows × installed columns).
    #[must_use]
    pub fn num_panels_installed(&self) -> u16 {
        u16::from(self.num_panel_rows) * u16::from(self.num_installed_cols())
    }

    /// Map a 0-based logical column (an index into the installed columns, in
    /// viewing order) to its physical slot in the full grid.
    ///
    /// Counter-clockwise arenas walk the installed columns from the far end.
    /// Returns `None` when `logical_index` is not an installed column.
    ///
    /// ```rust
    /// use arena_pattern::arena::{ArenaConfig, ArenaGeometry, ColumnOrder, Generation};
    ///
    /// let config = ArenaConfig::new(Generation::G4, 3, 12)
    ///     .with_columns_installed(&[2, 3, 4, 9])?
    ///     .with_column_order(ColumnOrder::CounterClockwise);
    /// let geometry = ArenaGeometry::derive(&config)?;
    ///
    /// assert_eq!(geometry.physical_column_index(0), Some(9));
    /// assert_eq!(geometry.physical_column_index(3), Some(2));
    /// assert_eq!(geometry.physical_column_index(4), None);
    /// # Ok::<(), arena_pattern::Error>(())
    /// ```
    #[must_use]
    pub fn physical_column_index(&self, logical_index: usize) -> Option<u8> {
        let position = match self.column_order {
            ColumnOrder::Clockwise => logical_index,
            ColumnOrder::CounterClockwise => {
                self.installed.len().checked_sub(1)?.checked_sub(logical_index)?
            }
        };
        self.installed.get(position).copied()
    }

    /// Radius of the cylinder inscribed by the panels' inner faces.
    ///
    /// `panel_width / (2 · tan(π / num_panel_cols))`. Only visualization uses this;
    /// the codec does not.
    #[cfg(feature = "host")]
    #[must_use]
    pub fn inner_radius_mm(&self) -> f32 {
        let half_angle = core::f32::consts::PI / f32::from(self.num_panel_cols);
        self.generation.panel_width_mm() / (2.0 * half_angle.tan())
    }
}

fn validate_columns(columns: &[u8], num_panel_cols: u8) -> Result<ColumnList> {
    if columns.is_empty() {
        return Err(GeometryError::NoColumnsInstalled.into());
    }
    let mut previous: Option<u8> = None;
    for &column in columns {
        if column >= num_panel_cols {
            return Err(Error::Geometry(GeometryError::ColumnOutOfRange {
                column,
                num_panel_cols,
            }));
        }
        if let Some(previous) = previous.filter(|&previous| previous >= column) {
            return Err(GeometryError::ColumnsNotIncreasing { previous, column }.into());
        }
        previous = Some(column);
    }
    ColumnList::from_slice(columns).map_err(|()| {
        Error::Geometry(GeometryError::TooManyColumns {
            num_panel_cols,
            max: MAX_PANEL_COLS,
        })
    })
}
