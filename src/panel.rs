//! # Panel Capability Registry
//!
//! Static table of every Waveshare 2.13" e-Paper model the station can drive.
//! Each entry records the panel's native resolution (portrait, as the
//! controller addresses it), the inks it can print and a few feature flags.
//!
//! The table is plain `'static` data: nothing here is mutated after start-up,
//! and lookups are a linear scan over nine entries.
//!
//! ## Resolution Families
//! - **104×212**: `epd2in13bc` (black/red) and `epd2in13d` (mono)
//! - **122×250**: the V2/V3/V4 mono revisions plus the `b_V3`, `b_V4` and `g`
//!   color variants

use std::fmt;
use thiserror::Error;

/// Printable ink colors, ordered as the panel datasheets list them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InkColor {
    Black,
    White,
    Red,
    Yellow,
}

impl InkColor {
    /// True for inks that can serve as the accent layer.
    pub fn is_accent(self) -> bool {
        matches!(self, InkColor::Red | InkColor::Yellow)
    }
}

impl fmt::Display for InkColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InkColor::Black => "black",
            InkColor::White => "white",
            InkColor::Red => "red",
            InkColor::Yellow => "yellow",
        };
        f.write_str(name)
    }
}

/// Optional controller capabilities.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanelFeature {
    /// Supports partial (windowed) refresh
    PartialUpdate,
    /// Supports the fast full-refresh waveform
    FastRefresh,
}

/// Static description of one supported panel model.
#[derive(Debug, PartialEq, Eq)]
pub struct PanelModel {
    /// Waveshare driver identifier, e.g. `"epd2in13bc"`
    pub id: &'static str,
    /// Native width in pixels (short edge)
    pub width: u32,
    /// Native height in pixels (long edge)
    pub height: u32,
    /// Inks the panel can show; always contains black and white
    pub colors: &'static [InkColor],
    pub features: &'static [PanelFeature],
    pub description: &'static str,
}

impl PanelModel {
    /// Whether the panel has a second, colored ink layer.
    pub fn has_accent(&self) -> bool {
        self.colors.iter().any(|c| c.is_accent())
    }

    /// The ink printed by the accent layer, if any.
    ///
    /// Four-color panels report red here; the compositor only ever uses one
    /// accent layer.
    pub fn accent_ink(&self) -> Option<InkColor> {
        self.colors.iter().copied().find(|c| c.is_accent())
    }

    pub fn supports(&self, feature: PanelFeature) -> bool {
        self.features.contains(&feature)
    }

    /// Number of ink layers a driver must receive per frame.
    pub fn layer_count(&self) -> usize {
        if self.has_accent() {
            2
        } else {
            1
        }
    }
}

const MONO: &[InkColor] = &[InkColor::Black, InkColor::White];
const BW_RED: &[InkColor] = &[InkColor::Black, InkColor::White, InkColor::Red];
const FOUR_COLOR: &[InkColor] = &[
    InkColor::Black,
    InkColor::White,
    InkColor::Red,
    InkColor::Yellow,
];

/// Every supported panel, in the order they are reported to users.
pub static PANELS: &[PanelModel] = &[
    PanelModel {
        id: "epd2in13bc",
        width: 104,
        height: 212,
        colors: BW_RED,
        features: &[],
        description: "Bi-color (black/red) tri-color display",
    },
    PanelModel {
        id: "epd2in13d",
        width: 104,
        height: 212,
        colors: MONO,
        features: &[PanelFeature::PartialUpdate],
        description: "Monochrome (black/white) with partial update support",
    },
    PanelModel {
        id: "epd2in13",
        width: 122,
        height: 250,
        colors: MONO,
        features: &[PanelFeature::PartialUpdate],
        description: "Original monochrome 2.13\" display",
    },
    PanelModel {
        id: "epd2in13_V2",
        width: 122,
        height: 250,
        colors: MONO,
        features: &[PanelFeature::PartialUpdate],
        description: "Monochrome V2 with partial update support",
    },
    PanelModel {
        id: "epd2in13_V3",
        width: 122,
        height: 250,
        colors: MONO,
        features: &[PanelFeature::PartialUpdate],
        description: "Monochrome V3 with partial update support",
    },
    PanelModel {
        id: "epd2in13_V4",
        width: 122,
        height: 250,
        colors: MONO,
        features: &[PanelFeature::PartialUpdate, PanelFeature::FastRefresh],
        description: "Monochrome V4 with partial and fast refresh",
    },
    PanelModel {
        id: "epd2in13b_V3",
        width: 122,
        height: 250,
        colors: BW_RED,
        features: &[],
        description: "Bi-color (black/red) V3",
    },
    PanelModel {
        id: "epd2in13b_V4",
        width: 122,
        height: 250,
        colors: BW_RED,
        features: &[],
        description: "Bi-color (black/red) V4",
    },
    PanelModel {
        id: "epd2in13g",
        width: 122,
        height: 250,
        colors: FOUR_COLOR,
        features: &[],
        description: "Four-color (black/white/red/yellow) display",
    },
];

/// Registry lookup failures.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PanelError {
    #[error("Unknown display model: {id}. Supported models: {}", known.join(", "))]
    UnknownPanel { id: String, known: Vec<&'static str> },
}

/// All registered identifiers, in table order.
pub fn known_ids() -> Vec<&'static str> {
    PANELS.iter().map(|p| p.id).collect()
}

/// Look up a panel by its Waveshare identifier (case-sensitive).
pub fn lookup(id: &str) -> Result<&'static PanelModel, PanelError> {
    PANELS
        .iter()
        .find(|p| p.id == id)
        .ok_or_else(|| PanelError::UnknownPanel {
            id: id.to_string(),
            known: known_ids(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_MODELS: [&str; 9] = [
        "epd2in13bc",
        "epd2in13d",
        "epd2in13",
        "epd2in13_V2",
        "epd2in13_V3",
        "epd2in13_V4",
        "epd2in13b_V3",
        "epd2in13b_V4",
        "epd2in13g",
    ];

    #[test]
    fn registry_contains_all_displays() {
        for model in ALL_MODELS {
            assert!(lookup(model).is_ok(), "Missing model: {}", model);
        }
        assert_eq!(PANELS.len(), 9);
    }

    #[test]
    fn epd2in13bc_is_bi_color() {
        let panel = lookup("epd2in13bc").unwrap();
        assert_eq!((panel.width, panel.height), (104, 212));
        assert!(panel.has_accent());
        assert_eq!(panel.accent_ink(), Some(InkColor::Red));
        assert!(panel.colors.contains(&InkColor::Black));
        assert!(panel.colors.contains(&InkColor::White));
        assert_eq!(panel.layer_count(), 2);
    }

    #[test]
    fn epd2in13d_is_monochrome_with_partial_update() {
        let panel = lookup("epd2in13d").unwrap();
        assert_eq!((panel.width, panel.height), (104, 212));
        assert!(!panel.has_accent());
        assert!(!panel.colors.contains(&InkColor::Red));
        assert!(panel.supports(PanelFeature::PartialUpdate));
        assert_eq!(panel.layer_count(), 1);
    }

    #[test]
    fn displays_grouped_by_resolution() {
        for model in ["epd2in13bc", "epd2in13d"] {
            let panel = lookup(model).unwrap();
            assert_eq!((panel.width, panel.height), (104, 212), "{}", model);
        }
        for model in &ALL_MODELS[2..] {
            let panel = lookup(model).unwrap();
            assert_eq!((panel.width, panel.height), (122, 250), "{}", model);
        }
    }

    #[test]
    fn four_color_panel_uses_red_accent() {
        let panel = lookup("epd2in13g").unwrap();
        assert!(panel.colors.contains(&InkColor::Yellow));
        assert_eq!(panel.accent_ink(), Some(InkColor::Red));
    }

    #[test]
    fn unknown_panel_lists_every_known_id() {
        let err = lookup("invalid_model").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Unknown display model"));
        assert!(message.contains("invalid_model"));
        for model in ALL_MODELS {
            assert!(message.contains(model), "{} missing from: {}", model, message);
        }
    }

    #[test]
    fn lookup_is_case_sensitive() {
        assert!(lookup("EPD2IN13BC").is_err());
    }
}
