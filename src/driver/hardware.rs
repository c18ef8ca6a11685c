//! Waveshare panel driver over Linux spidev and GPIO character devices.
//!
//! Only models with a matching `epd-waveshare` controller are wired up:
//! `epd2in13bc` (black/red) and the V2/V3 monochrome revisions. Other
//! registry entries fail at start-up with [`DriverError::Unsupported`].

use epd_waveshare::{epd2in13_v2::Epd2in13, epd2in13bc::Epd2in13bc, prelude::*};
use linux_embedded_hal::{
    gpio_cdev::{Chip, LineRequestFlags},
    spidev::{SpiModeFlags, SpidevOptions},
    CdevPin, Delay, SpidevDevice,
};
use log::{debug, info};

use super::{check_layers, DisplayDriver, DriverError};
use crate::config::HardwareConfig;
use crate::ink::InkLayer;
use crate::panel::PanelModel;

type TriColorPanel = Epd2in13bc<SpidevDevice, CdevPin, CdevPin, CdevPin, Delay>;
type MonoPanel = Epd2in13<SpidevDevice, CdevPin, CdevPin, CdevPin, Delay>;

enum Controller {
    TriColor(TriColorPanel),
    Mono(MonoPanel),
}

fn hw_err<E: std::fmt::Debug>(e: E) -> DriverError {
    DriverError::Hardware(format!("{:?}", e))
}

fn request_pin(
    chip: &mut Chip,
    offset: u32,
    flags: LineRequestFlags,
    label: &str,
) -> Result<CdevPin, DriverError> {
    let default = if flags.contains(LineRequestFlags::OUTPUT) { 1 } else { 0 };
    let handle = chip
        .get_line(offset)
        .map_err(hw_err)?
        .request(flags, default, label)
        .map_err(hw_err)?;
    CdevPin::new(handle).map_err(hw_err)
}

pub struct HardwareDriver {
    panel: &'static PanelModel,
    spi: SpidevDevice,
    delay: Delay,
    controller: Controller,
    awake: bool,
}

impl HardwareDriver {
    /// Open the SPI bus and GPIO lines and run the controller's power-on
    /// sequence.
    pub fn open(panel: &'static PanelModel, hw: &HardwareConfig) -> Result<Self, DriverError> {
        let mut spi = SpidevDevice::open(&hw.spi_device)?;
        let options = SpidevOptions::new()
            .bits_per_word(8)
            .max_speed_hz(hw.spi_speed_hz)
            .mode(SpiModeFlags::SPI_MODE_0)
            .build();
        spi.configure(&options)?;

        let mut chip = Chip::new(&hw.gpio_chip).map_err(hw_err)?;
        let busy = request_pin(&mut chip, hw.busy_pin, LineRequestFlags::INPUT, "epd-busy")?;
        let dc = request_pin(&mut chip, hw.dc_pin, LineRequestFlags::OUTPUT, "epd-dc")?;
        let rst = request_pin(&mut chip, hw.rst_pin, LineRequestFlags::OUTPUT, "epd-rst")?;
        debug!(
            "GPIO busy={} dc={} rst={} on {}",
            hw.busy_pin, hw.dc_pin, hw.rst_pin, hw.gpio_chip
        );

        let mut delay = Delay;
        let controller = match panel.id {
            "epd2in13bc" => Controller::TriColor(
                Epd2in13bc::new(&mut spi, busy, dc, rst, &mut delay, None).map_err(hw_err)?,
            ),
            "epd2in13_V2" | "epd2in13_V3" => Controller::Mono(
                Epd2in13::new(&mut spi, busy, dc, rst, &mut delay, None).map_err(hw_err)?,
            ),
            other => {
                return Err(DriverError::Unsupported(format!(
                    "no hardware controller for {}",
                    other
                )))
            }
        };
        info!("{} initialized", panel.id);

        Ok(Self {
            panel,
            spi,
            delay,
            controller,
            awake: true,
        })
    }
}

impl DisplayDriver for HardwareDriver {
    fn initialize(&mut self) -> Result<(), DriverError> {
        if self.awake {
            return Ok(());
        }
        let woken = match &mut self.controller {
            Controller::TriColor(epd) => epd.wake_up(&mut self.spi, &mut self.delay),
            Controller::Mono(epd) => epd.wake_up(&mut self.spi, &mut self.delay),
        };
        woken.map_err(hw_err)?;
        self.awake = true;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DriverError> {
        if !self.awake {
            return Err(DriverError::NotInitialized);
        }
        let shown = match &mut self.controller {
            Controller::TriColor(epd) => {
                epd.clear_frame(&mut self.spi, &mut self.delay).map_err(hw_err)?;
                epd.display_frame(&mut self.spi, &mut self.delay)
            }
            Controller::Mono(epd) => {
                epd.clear_frame(&mut self.spi, &mut self.delay).map_err(hw_err)?;
                epd.display_frame(&mut self.spi, &mut self.delay)
            }
        };
        shown.map_err(hw_err)
    }

    fn push(&mut self, layers: &[InkLayer]) -> Result<(), DriverError> {
        if !self.awake {
            return Err(DriverError::NotInitialized);
        }
        check_layers(self.panel, layers)?;
        let black = layers[0].to_panel_buffer();

        let shown = match &mut self.controller {
            Controller::TriColor(epd) => {
                let accent = layers[1].to_panel_buffer();
                epd.update_color_frame(&mut self.spi, &mut self.delay, &black, &accent)
                    .map_err(hw_err)?;
                epd.display_frame(&mut self.spi, &mut self.delay)
            }
            Controller::Mono(epd) => {
                epd.update_frame(&mut self.spi, &black, &mut self.delay)
                    .map_err(hw_err)?;
                epd.display_frame(&mut self.spi, &mut self.delay)
            }
        };
        shown.map_err(hw_err)
    }

    fn sleep(&mut self) -> Result<(), DriverError> {
        if !self.awake {
            return Ok(());
        }
        let slept = match &mut self.controller {
            Controller::TriColor(epd) => epd.sleep(&mut self.spi, &mut self.delay),
            Controller::Mono(epd) => epd.sleep(&mut self.spi, &mut self.delay),
        };
        slept.map_err(hw_err)?;
        self.awake = false;
        Ok(())
    }

    fn native_width(&self) -> u32 {
        self.panel.width
    }

    fn native_height(&self) -> u32 {
        self.panel.height
    }
}
