//! In-memory stimulus patterns: a grid of frames indexed by `(x_index, y_index)`.

use alloc::vec;
use alloc::vec::Vec;

use crate::arena::ArenaGeometry;
use crate::bit_packer::BitDepth;
use crate::error::ValidationError;
use crate::frame::PixelFrame;
use crate::{Error, Result};

/// One visual stimulus: `x_num × y_num` frames at a fixed bit depth.
///
/// Frames are indexed along two independent axes. They are stored (and written to
/// files) with `x_index` varying fastest: frame `y_index * x_num + x_index`.
///
/// Each frame carries one `stretch` value, a brightness boost applied by the
/// controller.
///
/// The identifiers are optional metadata; 0 means unspecified.
///
/// A `Pattern` is plain data. [`Pattern::validate`] (called by the encoder before any
/// bytes are produced) checks it against an [`ArenaGeometry`].
///
/// ```rust
/// use arena_pattern::{arena::{ArenaGeometry, Generation}, bit_packer::BitDepth, pattern::Pattern};
///
/// let geometry = ArenaGeometry::full(Generation::G4, 3, 12)?;
/// let mut pattern = Pattern::new(&geometry, BitDepth::Grayscale, 96, 1);
///
/// // Moving bar: frame `x` lights pixel column `2 * x`.
/// for x_index in 0..96_u16 {
///     let frame = pattern.frame_mut(x_index, 0).expect("frame exists");
///     for y_index in 0..48 {
///         frame[(usize::from(x_index) * 2, y_index)] = 15;
///     }
/// }
///
/// pattern.validate(&geometry)?;
/// assert_eq!(pattern.pixel(10, 20, 10, 0), Some(15));
/// # Ok::<(), arena_pattern::Error>(())
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pattern {
    x_num: u16,
    y_num: u16,
    bit_depth: BitDepth,
    frames: Vec<PixelFrame>,
    stretch: Vec<u8>,
    pattern_id: u16,
    generation_id: u8,
    arena_id: u8,
    observer_id: u8,
}

impl Pattern {
    /// Blank frames sized for `geometry`, zero stretch, no identifiers.
    #[must_use]
    pub fn new(geometry: &ArenaGeometry, bit_depth: BitDepth, x_num: u16, y_num: u16) -> Self {
        let num_frames = usize::from(x_num) * usize::from(y_num);
        let blank = PixelFrame::new(geometry.total_pixels_x(), geometry.total_pixels_y());
        Self {
            x_num,
            y_num,
            bit_depth,
            frames: vec![blank; num_frames],
            stretch: vec![0; num_frames],
            pattern_id: 0,
            generation_id: 0,
            arena_id: 0,
            observer_id: 0,
        }
    }

    /// Assemble a pattern from existing frames (ordered `x_index` fastest) and
    /// per-frame stretch values. Nothing is checked until [`Self::validate`].
    #[must_use]
    pub const fn from_frames(
        bit_depth: BitDepth,
        x_num: u16,
        y_num: u16,
        frames: Vec<PixelFrame>,
        stretch: Vec<u8>,
    ) -> Self {
        Self {
            x_num,
            y_num,
            bit_depth,
            frames,
            stretch,
            pattern_id: 0,
            generation_id: 0,
            arena_id: 0,
            observer_id: 0,
        }
    }

    /// Set the controller/SD-card address (0 = unspecified).
    #[must_use]
    pub const fn with_pattern_id(mut self, pattern_id: u16) -> Self {
        self.pattern_id = pattern_id;
        self
    }

    /// Set the self-describing generation code (see [`Generation::id`](crate::arena::Generation::id)).
    #[must_use]
    pub const fn with_generation_id(mut self, generation_id: u8) -> Self {
        self.generation_id = generation_id;
        self
    }

    /// Set the arena identifier.
    #[must_use]
    pub const fn with_arena_id(mut self, arena_id: u8) -> Self {
        self.arena_id = arena_id;
        self
    }

    /// Set the observer identifier (recorded by G6 headers only).
    #[must_use]
    pub const fn with_observer_id(mut self, observer_id: u8) -> Self {
        self.observer_id = observer_id;
        self
    }

    /// Replace the per-frame stretch values.
    #[must_use]
    pub fn with_stretch(mut self, stretch: Vec<u8>) -> Self {
        self.stretch = stretch;
        self
    }

    /// Frames along the x axis.
    #[must_use]
    pub const fn x_num(&self) -> u16 {
        self.x_num
    }

    /// Frames along the y axis.
    #[must_use]
    pub const fn y_num(&self) -> u16 {
        self.y_num
    }

    /// Total frames, `x_num * y_num`.
    #[must_use]
    pub fn num_frames(&self) -> usize {
        usize::from(self.x_num) * usize::from(self.y_num)
    }

    /// Pixel encoding.
    #[must_use]
    pub const fn bit_depth(&self) -> BitDepth {
        self.bit_depth
    }

    /// Controller/SD-card address (0 = unspecified).
    #[must_use]
    pub const fn pattern_id(&self) -> u16 {
        self.pattern_id
    }

    /// Generation code (0 = unspecified).
    #[must_use]
    pub const fn generation_id(&self) -> u8 {
        self.generation_id
    }

    /// Arena identifier (0 = unspecified).
    #[must_use]
    pub const fn arena_id(&self) -> u8 {
        self.arena_id
    }

    /// Observer identifier (0 = unspecified).
    #[must_use]
    pub const fn observer_id(&self) -> u8 {
        self.observer_id
    }

    /// All frames, `x_index` varying fastest.
    #[must_use]
    pub fn frames(&self) -> &[PixelFrame] {
        &self.frames
    }

    /// Per-frame stretch values, in frame order.
    #[must_use]
    pub fn stretch(&self) -> &[u8] {
        &self.stretch
    }

    /// Storage index of frame `(x_index, y_index)`, or `None` outside the pattern.
    #[must_use]
    pub fn frame_index(&self, x_index: u16, y_index: u16) -> Option<usize> {
        (x_index < self.x_num && y_index < self.y_num)
            .then(|| usize::from(y_index) * usize::from(self.x_num) + usize::from(x_index))
    }

    /// Frame `(x_index, y_index)`.
    #[must_use]
    pub fn frame(&self, x_index: u16, y_index: u16) -> Option<&PixelFrame> {
        self.frames.get(self.frame_index(x_index, y_index)?)
    }

    /// Mutable frame `(x_index, y_index)`.
    pub fn frame_mut(&mut self, x_index: u16, y_index: u16) -> Option<&mut PixelFrame> {
        let index = self.frame_index(x_index, y_index)?;
        self.frames.get_mut(index)
    }

    /// Stretch value of frame `(x_index, y_index)`.
    #[must_use]
    pub fn stretch_at(&self, x_index: u16, y_index: u16) -> Option<u8> {
        self.stretch
            .get(self.frame_index(x_index, y_index)?)
            .copied()
    }

    /// Set the stretch value of frame `(x_index, y_index)`; returns `false` outside the pattern.
    pub fn set_stretch(&mut self, x_index: u16, y_index: u16, value: u8) -> bool {
        let Some(slot) = self
            .frame_index(x_index, y_index)
            .and_then(|index| self.stretch.get_mut(index))
        else {
            return false;
        };
        *slot = value;
        true
    }

    /// Pixel intensity at `[row][col]` of frame `(x_index, y_index)`.
    #[must_use]
    pub fn pixel(&self, row: usize, col: usize, x_index: u16, y_index: u16) -> Option<u8> {
        self.frame(x_index, y_index)?.get(col, row)
    }

    /// Check every invariant a pattern must satisfy for `geometry`.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::EmptyFrameAxis`] if either axis is 0
    /// - [`ValidationError::FrameCountMismatch`] if there are not `x_num * y_num` frames
    /// - [`ValidationError::FrameSizeMismatch`] if a frame is not the arena's pixel size
    /// - [`ValidationError::StretchLengthMismatch`] if there is not one stretch value per frame
    /// - [`ValidationError::GenerationIdMismatch`] if a non-zero `generation_id` names
    ///   a different generation than `geometry`
    /// - [`Error::ValueOutOfRange`] for a pixel or stretch value above the bit depth's maximum
    pub fn validate(&self, geometry: &ArenaGeometry) -> Result<()> {
        if self.x_num == 0 || self.y_num == 0 {
            return Err(ValidationError::EmptyFrameAxis {
                x_num: self.x_num,
                y_num: self.y_num,
            }
            .into());
        }
        let expected = self.num_frames();
        if self.frames.len() != expected {
            return Err(ValidationError::FrameCountMismatch {
                expected,
                found: self.frames.len(),
            }
            .into());
        }
        if self.stretch.len() != expected {
            return Err(ValidationError::StretchLengthMismatch {
                expected,
                found: self.stretch.len(),
            }
            .into());
        }
        let expected_generation_id = geometry.generation().id();
        if self.generation_id != 0 && self.generation_id != expected_generation_id {
            return Err(ValidationError::GenerationIdMismatch {
                expected: expected_generation_id,
                found: self.generation_id,
            }
            .into());
        }

        let (expected_width, expected_height) =
            (geometry.total_pixels_x(), geometry.total_pixels_y());
        for (index, frame) in self.frames.iter().enumerate() {
            if frame.width() != expected_width || frame.height() != expected_height {
                return Err(Error::Validation(ValidationError::FrameSizeMismatch {
                    index,
                    expected_width,
                    expected_height,
                    width: frame.width(),
                    height: frame.height(),
                }));
            }
            self.bit_depth.check(frame.max_value())?;
        }
        self.stretch
            .iter()
            .try_for_each(|&value| self.bit_depth.check(value))
    }
}
