//! # Weather Station Application Entry Point
//!
//! Parses the command line, loads configuration, sets up logging and drives
//! the refresh loop. The binary runs on the Pi with `--features hardware` or
//! anywhere with `--emulator`, which writes PNG previews instead.

#[cfg(test)]
mod tests;

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use env_logger::{Env, Target};
use log::{info, warn};

use weatherstation_lib::config::{Config, DEFAULT_CONFIG_PATH};
use weatherstation_lib::driver::{create_driver, DisplayDriver, RecordingDriver};
use weatherstation_lib::icons::IconMap;
use weatherstation_lib::panel::{self, PANELS};
use weatherstation_lib::station::{CycleOutcome, WeatherStation};

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Parser, Debug)]
#[command(
    name = "weatherstation",
    version,
    about = "Weather summary on a 2.13\" Waveshare e-Paper display"
)]
struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// Display model, overrides config and DISPLAY_MODEL
    #[arg(short, long)]
    model: Option<String>,
    /// Write PNG previews instead of driving the panel
    #[arg(long)]
    emulator: bool,
    /// Panel is mounted upside down
    #[arg(long)]
    flip: bool,
    /// Run a single refresh cycle and exit
    #[arg(long)]
    once: bool,
    /// Render without any output device and log the ink layers
    #[arg(long)]
    dry_run: bool,
    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
    /// Print the supported display models and exit
    #[arg(long)]
    list_panels: bool,
}

impl Cli {
    /// Apply command-line overrides on top of file and environment settings.
    fn apply_to(&self, config: &mut Config) {
        if let Some(model) = &self.model {
            config.display.model = model.clone();
        }
        if self.emulator {
            config.display.emulator = true;
        }
        if self.flip {
            config.display.flip = true;
        }
    }
}

fn init_logging(config: &Config, verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or(level));
    builder.format_timestamp_secs();

    let mut open_error = None;
    if let Some(path) = &config.logging.file {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                builder.target(Target::Pipe(Box::new(file)));
            }
            Err(e) => open_error = Some((path.clone(), e)),
        }
    }
    builder.init();

    if let Some((path, e)) = open_error {
        warn!("Cannot open log file {}: {}, logging to stderr", path, e);
    }
}

fn list_panels() {
    println!("{:<14} {:>9}  {:<26} {}", "MODEL", "SIZE", "INKS", "DESCRIPTION");
    for p in PANELS {
        let inks: Vec<String> = p.colors.iter().map(|c| c.to_string()).collect();
        println!(
            "{:<14} {:>9}  {:<26} {}",
            p.id,
            format!("{}x{}", p.width, p.height),
            inks.join("/"),
            p.description
        );
    }
}

/// Main application entry point.
fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if cli.list_panels {
        list_panels();
        return Ok(());
    }

    let mut config = Config::load_with_env(&cli.config);
    cli.apply_to(&mut config);
    init_logging(&config, cli.verbose);
    info!(
        "{} v{} starting",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    let panel = panel::lookup(&config.display.model)?;
    config.api_key()?;

    let icons = IconMap::load_or_default(config.display.icon_map_path.as_deref().map(Path::new));
    let driver: Box<dyn DisplayDriver> = if cli.dry_run {
        info!("Dry run: frames are rendered but not shown");
        Box::new(RecordingDriver::new(panel))
    } else {
        create_driver(panel, &config.display).context("setting up display driver")?
    };

    let mut station = WeatherStation::new(
        panel,
        driver,
        icons,
        config.temperature_symbol(),
        config.display.flip,
    );
    let client = reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .context("building HTTP client")?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        if cli.once {
            match station.run_once(&client, &config).await {
                CycleOutcome::FetchFailed => bail!("weather fetch failed"),
                CycleOutcome::RenderFailed => bail!("display refresh failed"),
                CycleOutcome::Displayed | CycleOutcome::Unchanged => Ok(()),
            }
        } else {
            station.run(&client, &config).await
        }
    })
}
