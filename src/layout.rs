//! # Layout Resolver
//!
//! Maps a panel resolution to one of two hand-tuned constant bundles. The
//! choice depends on the resolution alone, so a mono and a bi-color panel of
//! the same size always get the same layout.
//!
//! Resolutions that are not in the registry never extrapolate: anything at
//! least [`STANDARD_MIN_WIDTH`] pixels wide is treated as the standard tier,
//! everything else as compact.

/// Native widths at or above this select the standard tier.
pub const STANDARD_MIN_WIDTH: u32 = 122;

/// Resolution bucket used to pick layout constants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanelTier {
    /// 104×212 family
    Compact,
    /// 122×250 family
    Standard,
}

/// Layout constants for one tier. All sizes are in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutProfile {
    pub tier: PanelTier,
    /// Margin kept clear on every edge
    pub padding: u32,
    /// Starting size for the temperature line
    pub temperature_font_size: u32,
    pub summary_font_max: u32,
    pub summary_font_min: u32,
    /// Width reserved for the weather icon next to the temperature
    pub icon_size: u32,
    pub max_summary_lines: usize,
    /// Share of the canvas height given to the temperature block
    pub temperature_height_ratio: f32,
    /// Extra pixels between summary lines
    pub line_spacing: u32,
}

const COMPACT: LayoutProfile = LayoutProfile {
    tier: PanelTier::Compact,
    padding: 5,
    temperature_font_size: 30,
    summary_font_max: 16,
    summary_font_min: 10,
    icon_size: 48,
    max_summary_lines: 3,
    temperature_height_ratio: 0.50,
    line_spacing: 4,
};

const STANDARD: LayoutProfile = LayoutProfile {
    tier: PanelTier::Standard,
    padding: 6,
    temperature_font_size: 36,
    summary_font_max: 18,
    summary_font_min: 12,
    icon_size: 56,
    max_summary_lines: 3,
    temperature_height_ratio: 0.48,
    line_spacing: 5,
};

impl PanelTier {
    /// Bucket a native resolution. Height does not influence the tier.
    pub fn for_resolution(width: u32, _height: u32) -> Self {
        if width >= STANDARD_MIN_WIDTH {
            PanelTier::Standard
        } else {
            PanelTier::Compact
        }
    }

    pub fn profile(self) -> LayoutProfile {
        match self {
            PanelTier::Compact => COMPACT,
            PanelTier::Standard => STANDARD,
        }
    }
}

impl Default for LayoutProfile {
    fn default() -> Self {
        COMPACT
    }
}

/// Resolve the layout for a native `width`×`height` panel.
pub fn resolve(width: u32, height: u32) -> LayoutProfile {
    PanelTier::for_resolution(width, height).profile()
}
