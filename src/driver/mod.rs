//! # Display Drivers
//!
//! Every output device implements [`DisplayDriver`]: a real panel over SPI,
//! the PNG emulator used during development, or the in-memory
//! [`RecordingDriver`] used by tests and dry runs.
//!
//! A frame is pushed as a slice of [`InkLayer`]s in native orientation:
//! exactly one layer for single-ink panels, primary then accent for panels
//! with a colored ink. Drivers reject anything else.
//!
//! ## Selection
//! [`create_driver`] picks the implementation from configuration. Hardware
//! support is compiled in only with the `hardware` feature.

use log::info;
use thiserror::Error;

use crate::config::DisplayConfig;
use crate::ink::InkLayer;
use crate::panel::PanelModel;

pub mod emulator;
#[cfg(all(target_os = "linux", feature = "hardware"))]
pub mod hardware;
pub mod mock;

pub use emulator::EmulatorDriver;
pub use mock::{DriverCalls, RecordingDriver};

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("expected {expected} ink layer(s), got {actual}")]
    LayerCountMismatch { expected: usize, actual: usize },
    #[error("layer {index} is {actual_width}x{actual_height}, panel is {width}x{height}")]
    LayerSizeMismatch {
        index: usize,
        width: u32,
        height: u32,
        actual_width: u32,
        actual_height: u32,
    },
    #[error("display used before initialize()")]
    NotInitialized,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to write preview image: {0}")]
    Image(#[from] image::ImageError),
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("unsupported: {0}")]
    Unsupported(String),
}

/// Output device for rendered frames.
pub trait DisplayDriver {
    /// Wake the controller and prepare it for a refresh.
    fn initialize(&mut self) -> Result<(), DriverError>;
    /// Blank the whole panel to paper color.
    fn clear(&mut self) -> Result<(), DriverError>;
    /// Show a frame. See the module docs for the layer contract.
    fn push(&mut self, layers: &[InkLayer]) -> Result<(), DriverError>;
    /// Enter the controller's low-power state.
    fn sleep(&mut self) -> Result<(), DriverError>;
    fn native_width(&self) -> u32;
    fn native_height(&self) -> u32;
}

/// Verify `layers` match what `panel` accepts.
pub fn check_layers(panel: &PanelModel, layers: &[InkLayer]) -> Result<(), DriverError> {
    let expected = panel.layer_count();
    if layers.len() != expected {
        return Err(DriverError::LayerCountMismatch {
            expected,
            actual: layers.len(),
        });
    }
    for (index, layer) in layers.iter().enumerate() {
        if (layer.width(), layer.height()) != (panel.width, panel.height) {
            return Err(DriverError::LayerSizeMismatch {
                index,
                width: panel.width,
                height: panel.height,
                actual_width: layer.width(),
                actual_height: layer.height(),
            });
        }
    }
    Ok(())
}

/// Build the driver `config` asks for.
pub fn create_driver(
    panel: &'static PanelModel,
    config: &DisplayConfig,
) -> Result<Box<dyn DisplayDriver>, DriverError> {
    if config.emulator {
        info!(
            "Using emulator for {}, preview at {}",
            panel.id, config.preview_path
        );
        return Ok(Box::new(EmulatorDriver::new(panel, &config.preview_path)));
    }

    #[cfg(all(target_os = "linux", feature = "hardware"))]
    let driver: Result<Box<dyn DisplayDriver>, DriverError> = {
        info!("Opening {} on {}", panel.id, config.hardware.spi_device);
        hardware::HardwareDriver::open(panel, &config.hardware)
            .map(|d| Box::new(d) as Box<dyn DisplayDriver>)
    };

    #[cfg(not(all(target_os = "linux", feature = "hardware")))]
    let driver: Result<Box<dyn DisplayDriver>, DriverError> =
        Err(DriverError::Unsupported(format!(
            "{} needs the `hardware` feature on Linux; enable the emulator to preview instead",
            panel.id
        )));

    driver
}
