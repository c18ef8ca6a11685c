//! # Ink-Layer Compositor
//!
//! Draws the weather summary into one ink layer, or two on panels with an
//! accent ink, and rotates the result into the panel's native orientation.
//!
//! ## Canvas
//! Drawing happens on a landscape canvas whose width is the panel's native
//! height. The frame layout:
//!
//! ```text
//! +--------------------------------------+
//! | 5°/12°C                       [icon] |  <- temperature block
//! |                                      |
//! | Leichter Regen am                    |  <- summary, starting at
//! | Nachmittag                           |     height * ratio
//! +--------------------------------------+
//! ```
//!
//! ## Ink routing
//! The temperature goes on the accent layer when the panel has one and the
//! current temperature has reached the daily maximum. Everything else is
//! printed with the primary (black) ink.

use embedded_graphics::{pixelcolor::BinaryColor, prelude::Point};
use log::{debug, warn};
use thiserror::Error;
use u8g2_fonts::{
    types::{FontColor, VerticalPosition},
    FontRenderer,
};

use crate::font_fit::{fit_single_line, fit_text};
use crate::fonts::{glyph_bounds, icon_font, text_font, TextMeasure};
use crate::ink::{InkLayer, Rotation};
use crate::layout::LayoutProfile;
use crate::panel::PanelModel;
use crate::text_wrap::line_height;

/// Smallest size the temperature line may shrink to.
pub const TEMPERATURE_FLOOR_SIZE: u32 = 20;

/// Gap between the temperature text and the reserved icon area.
const ICON_GAP: u32 = 8;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("failed to draw {element:?}: {reason}")]
    Draw { element: Element, reason: String },
    #[error("canvas {width}x{height} is too small for the layout")]
    CanvasTooSmall { width: u32, height: u32 },
}

/// Everything one frame needs.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderRequest {
    pub temperature: i32,
    /// Today's forecast maximum
    pub temperature_max: i32,
    /// `"°C"` or `"°F"`
    pub unit_symbol: String,
    pub summary: String,
    /// Glyph of the icon face
    pub icon: char,
    pub has_accent: bool,
    pub layout: LayoutProfile,
}

/// Drawable parts of the frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Element {
    Temperature,
    Summary,
    Icon,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InkTarget {
    Primary,
    Accent,
}

/// Which layer `element` is printed on.
pub fn route(element: Element, request: &RenderRequest) -> InkTarget {
    match element {
        Element::Temperature
            if request.has_accent && request.temperature >= request.temperature_max =>
        {
            InkTarget::Accent
        }
        _ => InkTarget::Primary,
    }
}

/// Temperature line text.
///
/// Only the current value is shown once it has reached the maximum. Two-digit
/// values use the compact `a°/b` form to save width.
pub fn format_temperature(temperature: i32, temperature_max: i32, unit: &str) -> String {
    if temperature >= temperature_max {
        format!("{}{}", temperature, unit)
    } else if temperature >= 10 || temperature_max >= 10 {
        format!("{}°/{}{}", temperature, temperature_max, unit)
    } else {
        format!("{}° / {}{}", temperature, temperature_max, unit)
    }
}

/// Finished, natively oriented layers. Index 0 is the primary ink, index 1
/// (when present) the accent ink.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedFrame {
    layers: Vec<InkLayer>,
}

impl RenderedFrame {
    pub fn primary(&self) -> &InkLayer {
        &self.layers[0]
    }

    pub fn accent(&self) -> Option<&InkLayer> {
        self.layers.get(1)
    }

    pub fn as_layers(&self) -> &[InkLayer] {
        &self.layers
    }
}

/// Renders [`RenderRequest`]s for one panel resolution and mounting.
#[derive(Clone, Copy, Debug)]
pub struct Compositor {
    native_width: u32,
    native_height: u32,
    rotation: Rotation,
}

impl Compositor {
    pub fn new(native_width: u32, native_height: u32, flip: bool) -> Self {
        Self {
            native_width,
            native_height,
            rotation: Rotation::for_mounting(flip),
        }
    }

    pub fn for_panel(panel: &PanelModel, flip: bool) -> Self {
        Self::new(panel.width, panel.height, flip)
    }

    /// Landscape drawing area as (width, height).
    pub fn canvas_size(&self) -> (u32, u32) {
        (self.native_height, self.native_width)
    }

    pub fn compose(&self, request: &RenderRequest) -> Result<RenderedFrame, RenderError> {
        let (canvas_w, canvas_h) = self.canvas_size();
        let layout = &request.layout;

        let icon_reserved = layout.icon_size + layout.padding + ICON_GAP;
        if canvas_w <= 2 * layout.padding || canvas_w <= layout.padding + icon_reserved {
            return Err(RenderError::CanvasTooSmall {
                width: canvas_w,
                height: canvas_h,
            });
        }

        let mut primary = InkLayer::new(canvas_w, canvas_h);
        let mut accent = InkLayer::new(canvas_w, canvas_h);
        let padding = layout.padding as i32;

        // Temperature
        let temp_text =
            format_temperature(request.temperature, request.temperature_max, &request.unit_symbol);
        let max_temp_width = canvas_w - layout.padding - icon_reserved;
        let (temp_size, temp_font) = fit_single_line(
            &temp_text,
            text_font,
            max_temp_width,
            layout.temperature_font_size,
            TEMPERATURE_FLOOR_SIZE,
        );
        debug!("temperature {:?} at size {}", temp_text, temp_size);

        let target = match route(Element::Temperature, request) {
            InkTarget::Accent => &mut accent,
            InkTarget::Primary => &mut primary,
        };
        draw_text(
            &temp_font,
            &temp_text,
            Point::new(padding, padding),
            target,
            Element::Temperature,
        )?;

        // Summary
        let summary = fit_text(
            &request.summary,
            text_font,
            canvas_w - 2 * layout.padding,
            layout.max_summary_lines,
            layout.summary_font_max,
            layout.summary_font_min,
        );
        let step = line_height(
            summary.font.ascent(),
            summary.font.descent(),
            layout.line_spacing,
        ) as i32;
        let summary_top = (canvas_h as f32 * layout.temperature_height_ratio) as i32;
        for (i, line) in summary.lines.iter().enumerate() {
            let y = summary_top + i as i32 * step;
            draw_text(
                &summary.font,
                line,
                Point::new(padding, y),
                &mut primary,
                Element::Summary,
            )?;
        }

        // Icon, sized like the temperature so both share the top padding
        let icon_face = icon_font(temp_size);
        match glyph_bounds(&icon_face, request.icon) {
            Some(bbox) => {
                let x = canvas_w as i32 - padding - bbox.size.width as i32 - bbox.top_left.x;
                let y = padding - bbox.top_left.y;
                icon_face
                    .render(
                        request.icon,
                        Point::new(x, y),
                        VerticalPosition::Top,
                        FontColor::Transparent(BinaryColor::On),
                        &mut primary,
                    )
                    .map_err(|e| RenderError::Draw {
                        element: Element::Icon,
                        reason: format!("{:?}", e),
                    })?;
            }
            None => warn!("icon glyph {:?} has no ink, skipping", request.icon),
        }

        let mut layers = vec![primary.rotated(self.rotation)];
        if request.has_accent {
            layers.push(accent.rotated(self.rotation));
        }
        Ok(RenderedFrame { layers })
    }
}

fn draw_text(
    font: &FontRenderer,
    text: &str,
    position: Point,
    layer: &mut InkLayer,
    element: Element,
) -> Result<(), RenderError> {
    font.render(
        text,
        position,
        VerticalPosition::Top,
        FontColor::Transparent(BinaryColor::On),
        layer,
    )
    .map(|_| ())
    .map_err(|e| RenderError::Draw {
        element,
        reason: format!("{:?}", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::resolve;
    use crate::panel::lookup;

    fn request(temperature: i32, temperature_max: i32, has_accent: bool) -> RenderRequest {
        RenderRequest {
            temperature,
            temperature_max,
            unit_symbol: "°C".to_string(),
            summary: "Leichter Regen am Nachmittag".to_string(),
            icon: 'C',
            has_accent,
            layout: resolve(104, 212),
        }
    }

    /// Inclusive (min_x, min_y, max_x, max_y) of the ink in `layer`.
    fn ink_bounds(layer: &InkLayer) -> Option<(u32, u32, u32, u32)> {
        let mut bounds: Option<(u32, u32, u32, u32)> = None;
        for y in 0..layer.height() {
            for x in 0..layer.width() {
                if layer.get(x, y) {
                    bounds = Some(match bounds {
                        None => (x, y, x, y),
                        Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
                    });
                }
            }
        }
        bounds
    }

    #[test]
    fn temperature_format_variants() {
        assert_eq!(format_temperature(5, 5, "°C"), "5°C");
        assert_eq!(format_temperature(7, 5, "°C"), "7°C");
        assert_eq!(format_temperature(12, 18, "°C"), "12°/18°C");
        assert_eq!(format_temperature(5, 12, "°F"), "5°/12°F");
        assert_eq!(format_temperature(3, 7, "°C"), "3° / 7°C");
        assert_eq!(format_temperature(-3, 4, "°C"), "-3° / 4°C");
    }

    #[test]
    fn temperature_routes_to_accent_only_at_max() {
        assert_eq!(route(Element::Temperature, &request(5, 5, true)), InkTarget::Accent);
        assert_eq!(route(Element::Temperature, &request(6, 5, true)), InkTarget::Accent);
        assert_eq!(route(Element::Temperature, &request(3, 5, true)), InkTarget::Primary);
        assert_eq!(route(Element::Temperature, &request(5, 5, false)), InkTarget::Primary);
    }

    #[test]
    fn summary_and_icon_always_use_primary() {
        for req in [request(5, 5, true), request(3, 5, true), request(5, 5, false)] {
            assert_eq!(route(Element::Summary, &req), InkTarget::Primary);
            assert_eq!(route(Element::Icon, &req), InkTarget::Primary);
        }
    }

    #[test]
    fn temperature_at_max_is_printed_in_accent() {
        let compositor = Compositor::new(104, 212, false);
        let frame = compositor.compose(&request(5, 5, true)).unwrap();
        assert_eq!(frame.as_layers().len(), 2);
        assert!(!frame.accent().unwrap().is_blank());
        assert!(!frame.primary().is_blank());
    }

    #[test]
    fn temperature_below_max_leaves_accent_blank() {
        let compositor = Compositor::new(104, 212, false);
        let frame = compositor.compose(&request(3, 5, true)).unwrap();
        assert!(frame.accent().unwrap().is_blank());
        assert!(!frame.primary().is_blank());
    }

    #[test]
    fn mono_panel_gets_single_layer() {
        let panel = lookup("epd2in13d").unwrap();
        let compositor = Compositor::for_panel(panel, false);
        let frame = compositor.compose(&request(5, 5, panel.has_accent())).unwrap();
        assert_eq!(frame.as_layers().len(), 1);
        assert!(frame.accent().is_none());
    }

    #[test]
    fn frame_is_in_native_orientation() {
        for id in ["epd2in13bc", "epd2in13_V4", "epd2in13g"] {
            let panel = lookup(id).unwrap();
            let compositor = Compositor::for_panel(panel, false);
            assert_eq!(compositor.canvas_size(), (panel.height, panel.width));

            let mut req = request(4, 9, panel.has_accent());
            req.layout = resolve(panel.width, panel.height);
            let frame = compositor.compose(&req).unwrap();
            assert_eq!(frame.as_layers().len(), panel.layer_count());
            for layer in frame.as_layers() {
                assert_eq!((layer.width(), layer.height()), (panel.width, panel.height), "{}", id);
            }
        }
    }

    #[test]
    fn flipped_frame_is_upside_down() {
        let req = request(3, 5, true);
        let normal = Compositor::new(104, 212, false).compose(&req).unwrap();
        let flipped = Compositor::new(104, 212, true).compose(&req).unwrap();
        assert_eq!(
            normal.primary().rotated(Rotation::Deg180),
            flipped.primary().clone()
        );
    }

    #[test]
    fn drawing_stays_inside_the_padding() {
        let req = request(12, 18, true);
        let layout = req.layout;
        let frame = Compositor::new(104, 212, false).compose(&req).unwrap();
        // Undo the counter-clockwise mounting turn to inspect the canvas.
        let canvas = frame.primary().rotated(Rotation::Deg270);
        assert_eq!((canvas.width(), canvas.height()), (212, 104));

        let (x0, y0, x1, _) = ink_bounds(&canvas).unwrap();
        assert!(x0 >= layout.padding, "ink at x={} inside left padding", x0);
        assert!(y0 >= layout.padding, "ink at y={} inside top padding", y0);
        assert!(x1 < canvas.width() - layout.padding, "ink at x={} inside right padding", x1);
    }

    #[test]
    fn icon_ink_touches_the_top_right_padding() {
        // Temperature on the accent layer and no summary leave only the icon.
        for (w, h) in [(104, 212), (122, 250)] {
            for glyph in ['@', 'A', 'B', 'C', 'E'] {
                let mut req = request(5, 5, true);
                req.summary = String::new();
                req.icon = glyph;
                req.layout = resolve(w, h);
                let frame = Compositor::new(w, h, false).compose(&req).unwrap();
                let canvas = frame.primary().rotated(Rotation::Deg270);

                let (x0, y0, x1, _) = ink_bounds(&canvas).expect("icon ink");
                let padding = req.layout.padding;
                assert!(x0 > canvas.width() / 2, "{:?} on {}x{}", glyph, w, h);
                assert_eq!(x1, canvas.width() - padding - 1, "{:?} on {}x{}", glyph, w, h);
                assert_eq!(y0, padding, "{:?} on {}x{}", glyph, w, h);
            }
        }
    }

    #[test]
    fn empty_summary_still_renders() {
        let mut req = request(3, 5, false);
        req.summary = "   ".to_string();
        let frame = Compositor::new(122, 250, false).compose(&req).unwrap();
        assert!(!frame.primary().is_blank());
    }

    #[test]
    fn tiny_canvas_is_rejected() {
        let result = Compositor::new(20, 60, false).compose(&request(3, 5, false));
        assert!(matches!(result, Err(RenderError::CanvasTooSmall { .. })));
    }
}
