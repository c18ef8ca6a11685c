//! # Font Faces and Text Metrics
//!
//! The station renders with bitmap faces from `u8g2-fonts`. Text uses the
//! FreeUniversal Bold family (`fub*`), which covers Latin-1, so `°` and
//! German umlauts from the weather API render correctly. Icons come from the
//! open-iconic weather face.
//!
//! Faces exist only at fixed heights, so a requested size maps to the largest
//! face that does not exceed it. Smaller requests therefore never measure
//! wider than larger ones, which the font fitter relies on.

use embedded_graphics::{prelude::Point, primitives::Rectangle};
use log::warn;
use u8g2_fonts::{fonts, types::VerticalPosition, FontRenderer};

/// Smallest size the text loader distinguishes; anything below uses the
/// same face.
pub const MIN_TEXT_SIZE: u32 = 8;

/// Width/height measurements the wrap and fit algorithms need from a font.
pub trait TextMeasure {
    /// Advance width of `text` in pixels (what the pen moves, not the ink box).
    fn text_width(&self, text: &str) -> u32;
    /// Pixels above the baseline.
    fn ascent(&self) -> u32;
    /// Pixels below the baseline, as a positive number.
    fn descent(&self) -> u32;
}

impl TextMeasure for FontRenderer {
    fn text_width(&self, text: &str) -> u32 {
        if text.is_empty() {
            return 0;
        }
        match self.get_rendered_dimensions(text, Point::zero(), VerticalPosition::Baseline) {
            Ok(dims) => dims.advance.x.max(0) as u32,
            Err(e) => {
                warn!("cannot measure {:?}: {:?}", text, e);
                0
            }
        }
    }

    fn ascent(&self) -> u32 {
        self.get_ascent().max(0) as u32
    }

    fn descent(&self) -> u32 {
        (-(self.get_descent() as i32)).max(0) as u32
    }
}

/// Text face for a nominal pixel `size`.
pub fn text_font(size: u32) -> FontRenderer {
    let face = match size {
        42..=u32::MAX => FontRenderer::new::<fonts::u8g2_font_fub42_tf>(),
        35..=41 => FontRenderer::new::<fonts::u8g2_font_fub35_tf>(),
        30..=34 => FontRenderer::new::<fonts::u8g2_font_fub30_tf>(),
        25..=29 => FontRenderer::new::<fonts::u8g2_font_fub25_tf>(),
        20..=24 => FontRenderer::new::<fonts::u8g2_font_fub20_tf>(),
        17..=19 => FontRenderer::new::<fonts::u8g2_font_fub17_tf>(),
        14..=16 => FontRenderer::new::<fonts::u8g2_font_fub14_tf>(),
        11..=13 => FontRenderer::new::<fonts::u8g2_font_fub11_tf>(),
        _ => FontRenderer::new::<fonts::u8g2_font_helvB08_tf>(),
    };
    face.with_ignore_unknown_chars(true)
}

/// Heights of the open-iconic weather faces (1x, 2x, 4x, 6x, 8x).
const ICON_FACE_SIZES: [u32; 5] = [8, 16, 32, 48, 64];

/// Weather icon face closest to `size`; ties pick the smaller face.
pub fn icon_font(size: u32) -> FontRenderer {
    let nearest = ICON_FACE_SIZES
        .iter()
        .copied()
        .min_by_key(|face| (face.abs_diff(size), *face))
        .unwrap_or(ICON_FACE_SIZES[0]);

    let face = match nearest {
        64 => FontRenderer::new::<fonts::u8g2_font_open_iconic_weather_8x_t>(),
        48 => FontRenderer::new::<fonts::u8g2_font_open_iconic_weather_6x_t>(),
        32 => FontRenderer::new::<fonts::u8g2_font_open_iconic_weather_4x_t>(),
        16 => FontRenderer::new::<fonts::u8g2_font_open_iconic_weather_2x_t>(),
        _ => FontRenderer::new::<fonts::u8g2_font_open_iconic_weather_1x_t>(),
    };
    face.with_ignore_unknown_chars(true)
}

/// True ink bounds of `glyph` when drawn with its top at the origin.
///
/// Unlike the advance width this excludes the face's internal padding, so
/// callers can align the visible shape exactly.
pub fn glyph_bounds(font: &FontRenderer, glyph: char) -> Option<Rectangle> {
    font.get_rendered_dimensions(glyph, Point::zero(), VerticalPosition::Top)
        .ok()?
        .bounding_box
}
