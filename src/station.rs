//! # Weather Station Loop
//!
//! Ties the pieces together: fetch the forecast, skip the refresh when
//! nothing visible changed, otherwise compose a frame and push it to the
//! driver. E-paper keeps its image without power, so the panel sleeps between
//! refreshes.
//!
//! A failed refresh never ends the loop. The driver is put to sleep, the
//! error is logged and the next cycle proceeds as usual.

use anyhow::Context;
use log::{error, info, warn};
use reqwest::Client;

use crate::compositor::{Compositor, RenderRequest};
use crate::config::Config;
use crate::driver::DisplayDriver;
use crate::icons::IconMap;
use crate::layout::{self, LayoutProfile};
use crate::panel::PanelModel;
use crate::weather::{self, WeatherError, WeatherReport};

/// Values that decide whether the panel needs a refresh. The icon is left
/// out; it follows from the summary.
type Shown = (i32, i32, String);

/// Result of one fetch/display cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleOutcome {
    Displayed,
    Unchanged,
    FetchFailed,
    RenderFailed,
}

pub struct WeatherStation {
    panel: &'static PanelModel,
    layout: LayoutProfile,
    compositor: Compositor,
    driver: Box<dyn DisplayDriver>,
    icons: IconMap,
    unit_symbol: String,
    last_shown: Option<Shown>,
}

impl WeatherStation {
    pub fn new(
        panel: &'static PanelModel,
        driver: Box<dyn DisplayDriver>,
        icons: IconMap,
        unit_symbol: &str,
        flip: bool,
    ) -> Self {
        let layout = layout::resolve(panel.width, panel.height);
        info!(
            "Display {} ({}x{}, {:?} layout, accent: {})",
            panel.id,
            panel.width,
            panel.height,
            layout.tier,
            panel
                .accent_ink()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "none".to_string())
        );
        Self {
            panel,
            layout,
            compositor: Compositor::for_panel(panel, flip),
            driver,
            icons,
            unit_symbol: unit_symbol.to_string(),
            last_shown: None,
        }
    }

    /// Whether `report` differs from what the panel currently shows.
    pub fn should_update(&self, report: &WeatherReport) -> bool {
        match &self.last_shown {
            Some((t, max, summary)) => {
                *t != report.temperature
                    || *max != report.temperature_max
                    || *summary != report.summary
            }
            None => true,
        }
    }

    pub fn request_for(&self, report: &WeatherReport) -> RenderRequest {
        RenderRequest {
            temperature: report.temperature,
            temperature_max: report.temperature_max,
            unit_symbol: self.unit_symbol.clone(),
            summary: report.summary.clone(),
            icon: self.icons.glyph_for(&report.icon),
            has_accent: self.panel.has_accent(),
            layout: self.layout,
        }
    }

    /// Wake the panel, draw `report` and put the panel back to sleep.
    ///
    /// On failure the panel is still sent to sleep before the error is
    /// returned.
    pub fn display_weather(&mut self, report: &WeatherReport) -> anyhow::Result<()> {
        info!("Displaying weather on e-Paper display...");
        let result = self.refresh(report);
        if let Err(e) = self.driver.sleep() {
            warn!("Failed to put display to sleep: {}", e);
        }
        result?;
        self.last_shown = Some((
            report.temperature,
            report.temperature_max,
            report.summary.clone(),
        ));
        info!("Display updated successfully.");
        Ok(())
    }

    fn refresh(&mut self, report: &WeatherReport) -> anyhow::Result<()> {
        self.driver.initialize().context("initializing display")?;
        self.driver.clear().context("clearing display")?;
        let frame = self
            .compositor
            .compose(&self.request_for(report))
            .context("composing frame")?;
        self.driver
            .push(frame.as_layers())
            .context("sending frame to display")?;
        Ok(())
    }

    /// Act on the outcome of a fetch.
    pub fn handle_report(&mut self, fetched: Result<WeatherReport, WeatherError>) -> CycleOutcome {
        let report = match fetched {
            Ok(report) => report,
            Err(e) => {
                error!("Error fetching weather data: {}", e);
                return CycleOutcome::FetchFailed;
            }
        };
        info!(
            "Weather data: {}° / {}°, {} Icon: {}",
            report.temperature, report.temperature_max, report.summary, report.icon
        );

        if !self.should_update(&report) {
            info!("No change in weather data, display not updated.");
            return CycleOutcome::Unchanged;
        }
        match self.display_weather(&report) {
            Ok(()) => CycleOutcome::Displayed,
            Err(e) => {
                error!("Error in display: {:#}", e);
                CycleOutcome::RenderFailed
            }
        }
    }

    pub async fn run_once(&mut self, client: &Client, config: &Config) -> CycleOutcome {
        let fetched = weather::fetch(client, &config.weather).await;
        self.handle_report(fetched)
    }

    /// Refresh every `update_interval_seconds` until Ctrl-C.
    pub async fn run(&mut self, client: &Client, config: &Config) -> anyhow::Result<()> {
        info!("Weather Station started.");
        let interval = config.update_interval();
        loop {
            self.run_once(client, config).await;
            info!(
                "Waiting {} minutes until next update...",
                interval.as_secs() / 60
            );
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                signal = tokio::signal::ctrl_c() => {
                    signal.context("listening for Ctrl-C")?;
                    info!("Shutting down");
                    return self.shutdown();
                }
            }
        }
    }

    /// Blank the panel and leave it asleep.
    pub fn shutdown(&mut self) -> anyhow::Result<()> {
        let cleared = self.driver.initialize().and_then(|()| self.driver.clear());
        self.driver.sleep()?;
        self.last_shown = None;
        cleared?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::RecordingDriver;
    use crate::panel::lookup;

    fn report(temperature: i32, temperature_max: i32, summary: &str) -> WeatherReport {
        WeatherReport {
            temperature,
            temperature_max,
            summary: summary.to_string(),
            icon: "rain".to_string(),
        }
    }

    fn station(id: &str) -> (WeatherStation, RecordingDriver) {
        let panel = lookup(id).unwrap();
        let driver = RecordingDriver::new(panel);
        let station = WeatherStation::new(
            panel,
            Box::new(driver.clone()),
            IconMap::default(),
            "°C",
            false,
        );
        (station, driver)
    }

    #[test]
    fn first_report_is_always_displayed() {
        let (station, _) = station("epd2in13bc");
        assert!(station.should_update(&report(3, 5, "Regen")));
    }

    #[test]
    fn unchanged_report_is_skipped() {
        let (mut station, driver) = station("epd2in13bc");
        assert_eq!(
            station.handle_report(Ok(report(3, 5, "Regen"))),
            CycleOutcome::Displayed
        );
        assert_eq!(
            station.handle_report(Ok(report(3, 5, "Regen"))),
            CycleOutcome::Unchanged
        );
        assert_eq!(driver.calls().push, 1);

        assert_eq!(
            station.handle_report(Ok(report(4, 5, "Regen"))),
            CycleOutcome::Displayed
        );
        assert_eq!(driver.calls().push, 2);
    }

    #[test]
    fn icon_change_alone_does_not_refresh() {
        let (mut station, _) = station("epd2in13d");
        station.handle_report(Ok(report(3, 5, "Regen")));
        let mut same = report(3, 5, "Regen");
        same.icon = "cloudy".to_string();
        assert!(!station.should_update(&same));
    }

    #[test]
    fn refresh_sequence_ends_in_sleep() {
        let (mut station, driver) = station("epd2in13bc");
        station.display_weather(&report(5, 5, "Sonnig")).unwrap();
        let calls = driver.calls();
        assert_eq!((calls.initialize, calls.clear, calls.push, calls.sleep), (1, 1, 1, 1));
        let frame = driver.last_frame().unwrap();
        assert_eq!(frame.len(), 2);
        assert!(!frame[1].is_blank(), "temperature at max belongs on the accent layer");
    }

    #[test]
    fn failed_push_sleeps_and_retries_next_cycle() {
        let (mut station, driver) = station("epd2in13bc");
        driver.fail_pushes(true);
        assert_eq!(
            station.handle_report(Ok(report(3, 5, "Regen"))),
            CycleOutcome::RenderFailed
        );
        assert_eq!(driver.calls().sleep, 1);

        driver.fail_pushes(false);
        assert_eq!(
            station.handle_report(Ok(report(3, 5, "Regen"))),
            CycleOutcome::Displayed
        );
    }

    #[test]
    fn fetch_error_leaves_display_alone() {
        let (mut station, driver) = station("epd2in13bc");
        let outcome = station.handle_report(Err(WeatherError::MissingField("daily.data")));
        assert_eq!(outcome, CycleOutcome::FetchFailed);
        assert_eq!(driver.calls(), Default::default());
    }

    #[test]
    fn shutdown_clears_and_sleeps() {
        let (mut station, driver) = station("epd2in13_V4");
        station.handle_report(Ok(report(3, 5, "Regen")));
        station.shutdown().unwrap();
        let calls = driver.calls();
        assert_eq!(calls.clear, 2);
        assert_eq!(calls.sleep, 2);
        assert!(station.should_update(&report(3, 5, "Regen")));
    }

    #[test]
    fn shutdown_sleeps_even_when_wake_up_fails() {
        let (mut station, driver) = station("epd2in13bc");
        driver.fail_initializes(true);
        assert!(station.shutdown().is_err());
        let calls = driver.calls();
        assert_eq!((calls.initialize, calls.clear, calls.sleep), (1, 0, 1));
    }

    #[test]
    fn request_uses_icon_table_and_panel_capabilities() {
        let (station, _) = station("epd2in13d");
        let request = station.request_for(&report(3, 5, "Regen"));
        assert_eq!(request.icon, 'C');
        assert!(!request.has_accent);
        assert_eq!(request.layout, layout::resolve(104, 212));
    }
}
