//! Pattern (`.pat`) codec and arena geometry for cylindrical LED-panel arenas.
//!
//! The crate turns in-memory visual stimuli (sequences of pixel frames) into the
//! exact byte layout controller firmware reads from SD cards, and back, for the
//! G4, G4.1, and G6 hardware generations.
//!
//! # Glossary
//!
//! - **Panel:** a square sub-display with a generation-fixed pixel size (G4: 16×16, G6: 20×20).
//! - **Arena:** one installation's grid of panels, possibly with some columns left empty
//!   (a *partial* arena).
//! - **Subpanel:** a slice of a panel row that the controller addresses as one block
//!   (four per panel on the G4 family, one on G6).
//! - **GS2 / GS16:** binary (1 bit per pixel) and grayscale (4 bits per pixel) encodings.
//! - **Stretch:** a per-frame brightness boost stored in front of each frame.
//! - **Header V1/V2:** the legacy and the self-describing header layouts, which coexist.
//!
//! # Example
//!
//! ```rust
//! use arena_pattern::{
//!     arena::{ArenaConfig, ArenaGeometry, Generation},
//!     bit_packer::BitDepth,
//!     header::HeaderVersion,
//!     pattern::Pattern,
//!     pattern_codec,
//! };
//!
//! let config = ArenaConfig::new(Generation::G4, 3, 12).with_columns_installed(&[0, 1, 2, 3])?;
//! let geometry = ArenaGeometry::derive(&config)?;
//! let mut pattern = Pattern::new(&geometry, BitDepth::Binary, 4, 1).with_arena_id(7);
//! for x_index in 0..4 {
//!     pattern.frame_mut(x_index, 0).expect("frame exists")[(usize::from(x_index), 0)] = 1;
//! }
//!
//! let bytes = pattern_codec::encode(&pattern, &geometry, HeaderVersion::V2)?;
//! let decoded = pattern_codec::decode(&bytes, Some(Generation::G4))?;
//! assert_eq!(decoded.pattern, pattern);
//! # Ok::<(), arena_pattern::Error>(())
//! ```
#![cfg_attr(not(feature = "host"), no_std)]

extern crate alloc;

#[macro_use]
mod fmt;

pub mod arena;
pub mod bit_packer;
mod error;
pub mod frame;
pub mod header;
pub mod panel_tiler;
#[cfg(feature = "host")]
pub mod pat_file;
pub mod pattern;
pub mod pattern_codec;
#[cfg(feature = "host")]
pub mod to_png;

// Re-export error types and result (used throughout)
pub use crate::error::{Error, GeometryError, Result, ValidationError};
