//! PNG preview driver.
//!
//! Composites the ink layers into an RGB image the way the panel would show
//! them and writes it to disk after every refresh. Accent ink is painted over
//! black where both layers are set, matching the controller's precedence.

use std::path::{Path, PathBuf};

use image::{imageops, ImageFormat, Rgb, RgbImage};
use log::{debug, info};

use super::{check_layers, DisplayDriver, DriverError};
use crate::ink::InkLayer;
use crate::panel::{InkColor, PanelModel};

const PAPER: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

fn tint(ink: InkColor) -> Rgb<u8> {
    match ink {
        InkColor::Black => BLACK,
        InkColor::White => PAPER,
        InkColor::Red => Rgb([255, 0, 0]),
        InkColor::Yellow => Rgb([255, 255, 0]),
    }
}

/// Merge native layers into one RGB image, still in native orientation.
pub fn composite(panel: &PanelModel, layers: &[InkLayer]) -> RgbImage {
    let accent_color = panel.accent_ink().map(tint).unwrap_or(BLACK);
    RgbImage::from_fn(panel.width, panel.height, |x, y| {
        let black = layers.first().is_some_and(|l| l.get(x, y));
        let accent = layers.get(1).is_some_and(|l| l.get(x, y));
        if accent {
            accent_color
        } else if black {
            BLACK
        } else {
            PAPER
        }
    })
}

pub struct EmulatorDriver {
    panel: &'static PanelModel,
    preview_path: PathBuf,
    initialized: bool,
    frame: Option<RgbImage>,
}

impl EmulatorDriver {
    pub fn new<P: AsRef<Path>>(panel: &'static PanelModel, preview_path: P) -> Self {
        Self {
            panel,
            preview_path: preview_path.as_ref().to_path_buf(),
            initialized: false,
            frame: None,
        }
    }

    /// Last image shown, in native orientation.
    pub fn frame(&self) -> Option<&RgbImage> {
        self.frame.as_ref()
    }

    fn show(&mut self, image: RgbImage) -> Result<(), DriverError> {
        // Frames are portrait; the preview is turned back to landscape.
        let preview = imageops::rotate90(&image);
        if let Some(parent) = self.preview_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        preview.save_with_format(&self.preview_path, ImageFormat::Png)?;
        self.frame = Some(image);
        Ok(())
    }
}

impl DisplayDriver for EmulatorDriver {
    fn initialize(&mut self) -> Result<(), DriverError> {
        debug!("emulator: init {}", self.panel.id);
        self.initialized = true;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DriverError> {
        if !self.initialized {
            return Err(DriverError::NotInitialized);
        }
        self.show(RgbImage::from_pixel(self.panel.width, self.panel.height, PAPER))
    }

    fn push(&mut self, layers: &[InkLayer]) -> Result<(), DriverError> {
        if !self.initialized {
            return Err(DriverError::NotInitialized);
        }
        check_layers(self.panel, layers)?;
        self.show(composite(self.panel, layers))?;
        info!("Preview written to {}", self.preview_path.display());
        Ok(())
    }

    fn sleep(&mut self) -> Result<(), DriverError> {
        debug!("emulator: sleep");
        self.initialized = false;
        Ok(())
    }

    fn native_width(&self) -> u32 {
        self.panel.width
    }

    fn native_height(&self) -> u32 {
        self.panel.height
    }
}
