//! Hardware generations and the per-generation constants the codec depends on.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A display-hardware revision.
///
/// The set is closed: each generation fixes its panel size, and the pattern format
/// is chosen from it once, when the [`ArenaGeometry`](super::ArenaGeometry) is derived.
///
/// There is no G5. Parsing `"G5"` fails with [`Error::UnsupportedGeneration`].
///
/// ```rust
/// use arena_pattern::arena::Generation;
///
/// let generation: Generation = "G4.1".parse()?;
/// assert_eq!(generation, Generation::G4_1);
/// assert_eq!(generation.pixels_per_panel(), 16);
/// assert!("G5".parse::<Generation>().is_err());
/// # Ok::<(), arena_pattern::Error>(())
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Generation {
    /// 8×8-pixel panels. Geometry only; there is no G3 pattern format here.
    G3,
    /// 16×16-pixel panels.
    G4,
    /// G4.1: G4 panels on the revised controller.
    #[serde(rename = "G4.1")]
    G4_1,
    /// 20×20-pixel panels with a bottom-origin pixel row order.
    G6,
}

impl Generation {
    /// Every supported generation, oldest first.
    pub const ALL: [Self; 4] = [Self::G3, Self::G4, Self::G4_1, Self::G6];

    /// Pixels along one side of a (square) panel.
    #[must_use]
    pub const fn pixels_per_panel(self) -> u16 {
        match self {
            Self::G3 => 8,
            Self::G4 | Self::G4_1 => 16,
            Self::G6 => 20,
        }
    }

    /// Physical panel width, used only for arena-radius visualization.
    #[must_use]
    pub const fn panel_width_mm(self) -> f32 {
        match self {
            Self::G3 => 32.0,
            Self::G4 | Self::G4_1 => 40.0,
            Self::G6 => 50.0,
        }
    }

    /// Self-describing `generation_id` written into V2 headers (never 0; 0 means unspecified).
    #[must_use]
    pub const fn id(self) -> u8 {
        match self {
            Self::G3 => 1,
            Self::G4 => 2,
            Self::G4_1 => 3,
            Self::G6 => 4,
        }
    }

    /// Inverse of [`Self::id`]. Returns `None` for 0 and for unknown codes.
    #[must_use]
    pub const fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Self::G3),
            2 => Some(Self::G4),
            3 => Some(Self::G4_1),
            4 => Some(Self::G6),
            _ => None,
        }
    }

    /// Canonical name, as it appears in arena configuration files.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::G3 => "G3",
            Self::G4 => "G4",
            Self::G4_1 => "G4.1",
            Self::G6 => "G6",
        }
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Generation {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        let trimmed = name.trim();
        Self::ALL
            .into_iter()
            .find(|generation| generation.name().eq_ignore_ascii_case(trimmed))
            .ok_or(if trimmed.eq_ignore_ascii_case("G5") {
                Error::UnsupportedGeneration {
                    detail: "G5 hardware does not exist",
                }
            } else {
                Error::UnsupportedGeneration {
                    detail: "unknown generation name",
                }
            })
    }
}

/// Direction in which logical (animal-facing) columns advance around the arena.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ColumnOrder {
    /// Logical column `i` is the `i`-th installed column.
    #[default]
    #[serde(rename = "cw")]
    Clockwise,
    /// Logical column `i` is the `i`-th installed column counted from the far end.
    #[serde(rename = "ccw")]
    CounterClockwise,
}
