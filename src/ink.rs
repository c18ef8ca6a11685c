//! # Ink Layers
//!
//! A frame for the panel is one or two 1-bit layers. Each [`InkLayer`] is a
//! packed bitmap: rows of `ceil(width / 8)` bytes, most significant bit first,
//! where a set bit means "print ink here". The layer doubles as an
//! `embedded-graphics` draw target so text and glyphs can be rendered into it
//! directly.
//!
//! Controllers expect the opposite polarity (0 = ink, 1 = paper);
//! [`InkLayer::to_panel_buffer`] produces that form.

use std::convert::Infallible;

use embedded_graphics::{pixelcolor::BinaryColor, prelude::*};

/// Counter-clockwise rotation applied to a finished layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rotation {
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Rotation that turns the landscape canvas into the panel's portrait
    /// addressing. A flipped mounting turns the other way.
    pub fn for_mounting(flip: bool) -> Self {
        if flip {
            Rotation::Deg270
        } else {
            Rotation::Deg90
        }
    }

    fn swaps_axes(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }
}

/// 1-bit ink mask.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InkLayer {
    width: u32,
    height: u32,
    bits: Vec<u8>,
}

impl InkLayer {
    /// Blank (all paper) layer.
    pub fn new(width: u32, height: u32) -> Self {
        let bytes_per_row = width.div_ceil(8);
        Self {
            width,
            height,
            bits: vec![0x00; (bytes_per_row * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn locate(&self, x: u32, y: u32) -> Option<(usize, u8)> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let bytes_per_row = self.width.div_ceil(8);
        let index = (y * bytes_per_row + x / 8) as usize;
        Some((index, 0x80 >> (x % 8)))
    }

    /// Whether ink is set at (`x`, `y`). Out-of-range reads are paper.
    pub fn get(&self, x: u32, y: u32) -> bool {
        match self.locate(x, y) {
            Some((index, mask)) => self.bits[index] & mask != 0,
            None => false,
        }
    }

    /// Set or clear ink at (`x`, `y`). Out-of-range writes are ignored.
    pub fn set(&mut self, x: u32, y: u32, ink: bool) {
        if let Some((index, mask)) = self.locate(x, y) {
            if ink {
                self.bits[index] |= mask;
            } else {
                self.bits[index] &= !mask;
            }
        }
    }

    /// Number of inked pixels.
    pub fn ink_count(&self) -> usize {
        // Row padding bits are never set, so whole bytes can be counted.
        self.bits.iter().map(|b| b.count_ones() as usize).sum()
    }

    pub fn is_blank(&self) -> bool {
        self.bits.iter().all(|&b| b == 0)
    }

    /// Packed bits with 1 = ink.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bits
    }

    /// Packed bits in controller polarity (0 = ink, 1 = paper).
    pub fn to_panel_buffer(&self) -> Vec<u8> {
        self.bits.iter().map(|b| !b).collect()
    }

    /// Copy of this layer rotated counter-clockwise, expanded to the rotated
    /// bounding box.
    pub fn rotated(&self, rotation: Rotation) -> InkLayer {
        let (w, h) = (self.width, self.height);
        let mut out = if rotation.swaps_axes() {
            InkLayer::new(h, w)
        } else {
            InkLayer::new(w, h)
        };

        for y in 0..h {
            for x in 0..w {
                if !self.get(x, y) {
                    continue;
                }
                let (nx, ny) = match rotation {
                    Rotation::Deg0 => (x, y),
                    Rotation::Deg90 => (y, w - 1 - x),
                    Rotation::Deg180 => (w - 1 - x, h - 1 - y),
                    Rotation::Deg270 => (h - 1 - y, x),
                };
                out.set(nx, ny, true);
            }
        }
        out
    }
}

impl OriginDimensions for InkLayer {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for InkLayer {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x < 0 || point.y < 0 {
                continue;
            }
            self.set(point.x as u32, point.y as u32, color.is_on());
        }
        Ok(())
    }
}
