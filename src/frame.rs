//! A single full-arena pixel image.
//!
//! See [`PixelFrame`] for an example of drawing into a frame.

use alloc::vec;
use alloc::vec::Vec;
use core::convert::Infallible;
use core::ops::{Index, IndexMut};

use embedded_graphics::{
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Size},
    pixelcolor::{Gray4, GrayColor},
    Pixel,
};

/// One arena-sized image of pixel intensities, stored row-major with `(0, 0)` at the top-left.
///
/// Values are raw intensities; whether they fit the pattern's [`BitDepth`](crate::bit_packer::BitDepth)
/// is checked when the pattern is encoded.
///
/// Frames support:
///
/// - Direct pixel access via `frame[(x, y)]`
/// - Drawing with [`embedded-graphics`](https://docs.rs/embedded-graphics) in [`Gray4`]
///
/// # Example
///
/// ```rust
/// use arena_pattern::frame::PixelFrame;
/// use embedded_graphics::{
///     pixelcolor::{Gray4, GrayColor},
///     prelude::*,
///     primitives::{PrimitiveStyle, Rectangle},
/// };
///
/// // A 2-row, 12-column G4 arena is 192×32 pixels.
/// let mut frame = PixelFrame::new(192, 32);
///
/// // A full-height vertical bar, 8 pixels wide, at full brightness.
/// Rectangle::new(Point::new(40, 0), Size::new(8, 32))
///     .into_styled(PrimitiveStyle::with_fill(Gray4::WHITE))
///     .draw(&mut frame)
///     .expect("drawing into a frame cannot fail");
///
/// frame[(0, 0)] = 7;
///
/// assert_eq!(frame[(40, 31)], 15);
/// assert_eq!(frame[(48, 0)], 0);
/// assert_eq!(frame[(0, 0)], 7);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PixelFrame {
    width: u16,
    height: u16,
    pixels: Vec<u8>,
}

impl PixelFrame {
    /// A blank (all zero) frame.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self::filled(width, height, 0)
    }

    /// A frame with every pixel set to `value`.
    #[must_use]
    pub fn filled(width: u16, height: u16, value: u8) -> Self {
        Self {
            width,
            height,
            pixels: vec![value; usize::from(width) * usize::from(height)],
        }
    }

    /// Wrap row-major pixels. Returns `None` if the length is not `width * height`.
    #[must_use]
    pub fn from_pixels(width: u16, height: u16, pixels: Vec<u8>) -> Option<Self> {
        (pixels.len() == usize::from(width) * usize::from(height)).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    /// Frame width in pixels.
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Frame height in pixels.
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Row-major pixel values.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Mutable row-major pixel values.
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Consume the frame, returning its row-major pixel values.
    #[must_use]
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// Pixel at `(x, y)`, or `None` outside the frame.
    #[must_use]
    pub fn get(&self, x_index: usize, y_index: usize) -> Option<u8> {
        self.offset(x_index, y_index)
            .and_then(|offset| self.pixels.get(offset).copied())
    }

    /// One pixel row, top row first.
    #[must_use]
    pub fn row(&self, y_index: usize) -> Option<&[u8]> {
        let width = usize::from(self.width);
        let start = y_index.checked_mul(width)?;
        self.pixels.get(start..start.checked_add(width)?)
    }

    /// Iterate pixel rows from the top.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.pixels.chunks(usize::from(self.width).max(1))
    }

    /// Largest pixel value (0 for an empty frame).
    #[must_use]
    pub fn max_value(&self) -> u8 {
        self.pixels.iter().copied().max().unwrap_or(0)
    }

    fn offset(&self, x_index: usize, y_index: usize) -> Option<usize> {
        (x_index < usize::from(self.width) && y_index < usize::from(self.height))
            .then(|| y_index * usize::from(self.width) + x_index)
    }
}

impl Index<(usize, usize)> for PixelFrame {
    type Output = u8;

    fn index(&self, (x_index, y_index): (usize, usize)) -> &Self::Output {
        let offset = self
            .offset(x_index, y_index)
            .expect("(x, y) must be within the frame");
        &self.pixels[offset]
    }
}

impl IndexMut<(usize, usize)> for PixelFrame {
    fn index_mut(&mut self, (x_index, y_index): (usize, usize)) -> &mut Self::Output {
        let offset = self
            .offset(x_index, y_index)
            .expect("(x, y) must be within the frame");
        &mut self.pixels[offset]
    }
}

impl OriginDimensions for PixelFrame {
    fn size(&self) -> Size {
        Size::new(u32::from(self.width), u32::from(self.height))
    }
}

impl DrawTarget for PixelFrame {
    type Color = Gray4;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> core::result::Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            let (Ok(x_index), Ok(y_index)) = (usize::try_from(coord.x), usize::try_from(coord.y))
            else {
                continue;
            };
            if let Some(offset) = self.offset(x_index, y_index) {
                self.pixels[offset] = color.luma();
            }
        }
        Ok(())
    }
}
