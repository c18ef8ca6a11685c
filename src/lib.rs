//! # e-Paper Weather Station Core Library
//!
//! Renders a compact weather summary (current temperature, today's maximum,
//! a wrapped text summary and a condition icon) for the Waveshare 2.13"
//! e-Paper family, and drives the panel or an emulator with the result.
//!
//! ## Pipeline
//! 1. **Registry**: [`panel::lookup`] resolves a model id to its resolution
//!    and inks
//! 2. **Layout**: [`layout::resolve`] picks the constant bundle for that
//!    resolution
//! 3. **Compose**: [`compositor::Compositor`] fits fonts, wraps the summary,
//!    routes each element to an ink layer and rotates to native orientation
//! 4. **Drive**: a [`driver::DisplayDriver`] shows the layers
//!
//! The rendering steps are synchronous and free of I/O. Only
//! [`weather::fetch`] and [`station::WeatherStation::run`] are async.
//!
//! ## Example
//! ```
//! use weatherstation_lib::{layout, panel, Compositor, RenderRequest};
//!
//! let model = panel::lookup("epd2in13bc").unwrap();
//! let request = RenderRequest {
//!     temperature: 5,
//!     temperature_max: 5,
//!     unit_symbol: "°C".to_string(),
//!     summary: "Leichter Regen am Nachmittag".to_string(),
//!     icon: 'C',
//!     has_accent: model.has_accent(),
//!     layout: layout::resolve(model.width, model.height),
//! };
//!
//! let frame = Compositor::for_panel(model, false).compose(&request).unwrap();
//! assert_eq!(frame.as_layers().len(), 2);
//! assert!(!frame.accent().unwrap().is_blank());
//! ```

pub mod compositor;
pub mod config;
pub mod driver;
pub mod font_fit;
pub mod fonts;
pub mod icons;
pub mod ink;
pub mod layout;
pub mod panel;
pub mod station;
pub mod text_wrap;
pub mod weather;

pub use compositor::{Compositor, RenderRequest, RenderedFrame};
pub use config::Config;
pub use ink::InkLayer;
pub use panel::PanelModel;
