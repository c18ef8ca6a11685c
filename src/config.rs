//! # Configuration Management
//!
//! Settings come from `weatherstation.toml` (or a path given on the command
//! line) and are then overridden by environment variables, so a systemd unit
//! or container can configure the station without a file.
//!
//! ## Environment Variables
//! `PIRATE_WEATHER_API_KEY`, `LATITUDE`, `LONGITUDE`, `LANGUAGE`, `UNITS`,
//! `FLIP_DISPLAY`, `UPDATE_INTERVAL_SECONDS`, `DISPLAY_MODEL`,
//! `LOG_FILE_PATH`, `USE_EMULATOR`, `ICON_MAP_PATH`.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// File read when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "weatherstation.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("PIRATE_WEATHER_API_KEY is not set")]
    MissingApiKey,
    #[error("failed to write config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Application configuration loaded from weatherstation.toml
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub weather: WeatherConfig,
    pub display: DisplayConfig,
    pub logging: LoggingConfig,
}

/// Forecast source settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Pirate Weather API key
    pub api_key: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Language of the daily summary (e.g. "de", "en")
    pub language: String,
    /// Unit system: "si", "us", "ca" or "uk"
    pub units: String,
}

/// Panel selection and refresh behavior
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Registry identifier, e.g. "epd2in13bc"
    pub model: String,
    /// Panel is mounted upside down
    pub flip: bool,
    /// Write PNG previews instead of driving hardware
    pub emulator: bool,
    pub update_interval_seconds: u64,
    /// Where the emulator writes its preview
    pub preview_path: String,
    /// Optional replacement for the built-in icon table
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_map_path: Option<String>,
    pub hardware: HardwareConfig,
}

/// SPI and GPIO wiring of the panel HAT
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HardwareConfig {
    pub spi_device: String,
    pub spi_speed_hz: u32,
    pub gpio_chip: String,
    /// BCM line offsets
    pub busy_pin: u32,
    pub dc_pin: u32,
    pub rst_pin: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Append log output to this file instead of stderr
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        WeatherConfig {
            api_key: String::new(),
            latitude: 52.52,
            longitude: 13.405,
            language: "de".to_string(),
            units: "si".to_string(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            model: "epd2in13bc".to_string(),
            flip: false,
            emulator: false,
            update_interval_seconds: 1800,
            preview_path: "weatherstation-preview.png".to_string(),
            icon_map_path: None,
            hardware: HardwareConfig::default(),
        }
    }
}

impl Default for HardwareConfig {
    fn default() -> Self {
        // Waveshare e-Paper HAT wiring
        HardwareConfig {
            spi_device: "/dev/spidev0.0".to_string(),
            spi_speed_hz: 4_000_000,
            gpio_chip: "/dev/gpiochip0".to_string(),
            busy_pin: 24,
            dc_pin: 25,
            rst_pin: 17,
        }
    }
}

fn parse_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

fn parse_or_keep<T: FromStr + Copy>(key: &str, value: &str, current: T) -> T {
    match value.trim().parse() {
        Ok(parsed) => parsed,
        Err(_) => {
            warn!("Ignoring invalid {}={:?}", key, value);
            current
        }
    }
}

impl Config {
    /// Load configuration from `path`, then apply environment overrides
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Self {
        let mut config = Self::load_from_path(path);
        config.apply_overrides(|key| env::var(key).ok());
        config
    }

    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => {
                    info!("Loaded configuration from {}", path.display());
                    config
                }
                Err(e) => {
                    warn!("Invalid config file format in {}: {}", path.display(), e);
                    warn!("Using default configuration");
                    Self::default()
                }
            },
            Err(_) => {
                info!("No config file at {}, using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Apply overrides from `lookup`, keyed by environment variable name
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("PIRATE_WEATHER_API_KEY") {
            self.weather.api_key = v;
        }
        if let Some(v) = lookup("LATITUDE") {
            self.weather.latitude = parse_or_keep("LATITUDE", &v, self.weather.latitude);
        }
        if let Some(v) = lookup("LONGITUDE") {
            self.weather.longitude = parse_or_keep("LONGITUDE", &v, self.weather.longitude);
        }
        if let Some(v) = lookup("LANGUAGE") {
            self.weather.language = v;
        }
        if let Some(v) = lookup("UNITS") {
            self.weather.units = v;
        }
        if let Some(v) = lookup("FLIP_DISPLAY") {
            self.display.flip = parse_flag(&v);
        }
        if let Some(v) = lookup("UPDATE_INTERVAL_SECONDS") {
            self.display.update_interval_seconds = parse_or_keep(
                "UPDATE_INTERVAL_SECONDS",
                &v,
                self.display.update_interval_seconds,
            );
        }
        if let Some(v) = lookup("DISPLAY_MODEL") {
            self.display.model = v;
        }
        if let Some(v) = lookup("USE_EMULATOR") {
            self.display.emulator = parse_flag(&v);
        }
        if let Some(v) = lookup("ICON_MAP_PATH") {
            self.display.icon_map_path = Some(v);
        }
        if let Some(v) = lookup("LOG_FILE_PATH") {
            self.logging.file = Some(v);
        }
    }

    /// Unit suffix for temperatures: "°F" for US units, "°C" otherwise
    pub fn temperature_symbol(&self) -> &'static str {
        if self.weather.units == "us" {
            "°F"
        } else {
            "°C"
        }
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.display.update_interval_seconds)
    }

    /// The API key, or an error when none is configured
    pub fn api_key(&self) -> Result<&str, ConfigError> {
        let key = self.weather.api_key.trim();
        if key.is_empty() {
            Err(ConfigError::MissingApiKey)
        } else {
            Ok(key)
        }
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(&path, contents)?;
        info!("Configuration saved to {}", path.as_ref().display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.weather.latitude, 52.52);
        assert_eq!(config.weather.longitude, 13.405);
        assert_eq!(config.weather.language, "de");
        assert_eq!(config.weather.units, "si");
        assert_eq!(config.display.model, "epd2in13bc");
        assert!(!config.display.flip);
        assert_eq!(config.display.update_interval_seconds, 1800);
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.display.icon_map_path = Some("/etc/icons.json".to_string());
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let parsed: Config = toml::from_str(
            r#"
            [display]
            model = "epd2in13_V4"

            [display.hardware]
            busy_pin = 5
            "#,
        )
        .unwrap();
        assert_eq!(parsed.display.model, "epd2in13_V4");
        assert_eq!(parsed.display.hardware.busy_pin, 5);
        assert_eq!(parsed.display.hardware.dc_pin, 25);
        assert_eq!(parsed.weather.language, "de");
    }

    #[test]
    fn test_load_nonexistent_file() {
        let config = Config::load_from_path("/nonexistent/path");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "this is [not toml").unwrap();
        assert_eq!(Config::load_from_path(&path), Config::default());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weatherstation.toml");
        let mut config = Config::default();
        config.weather.units = "us".to_string();
        config.save_to_path(&path).unwrap();
        assert_eq!(Config::load_from_path(&path), config);
    }

    #[test]
    fn test_environment_overrides() {
        let mut config = Config::default();
        config.apply_overrides(env_of(&[
            ("PIRATE_WEATHER_API_KEY", "secret"),
            ("LATITUDE", "48.1"),
            ("UNITS", "us"),
            ("FLIP_DISPLAY", "True"),
            ("UPDATE_INTERVAL_SECONDS", "600"),
            ("DISPLAY_MODEL", "epd2in13d"),
            ("USE_EMULATOR", "true"),
            ("LOG_FILE_PATH", "/tmp/ws.log"),
        ]));
        assert_eq!(config.api_key().unwrap(), "secret");
        assert_eq!(config.weather.latitude, 48.1);
        assert_eq!(config.weather.longitude, 13.405);
        assert!(config.display.flip);
        assert!(config.display.emulator);
        assert_eq!(config.update_interval(), Duration::from_secs(600));
        assert_eq!(config.display.model, "epd2in13d");
        assert_eq!(config.logging.file.as_deref(), Some("/tmp/ws.log"));
    }

    #[test]
    fn test_invalid_numbers_are_ignored() {
        let mut config = Config::default();
        config.apply_overrides(env_of(&[
            ("LATITUDE", "north"),
            ("UPDATE_INTERVAL_SECONDS", "-5"),
            ("FLIP_DISPLAY", "yes"),
        ]));
        assert_eq!(config.weather.latitude, 52.52);
        assert_eq!(config.display.update_interval_seconds, 1800);
        assert!(!config.display.flip);
    }

    #[test]
    fn test_temperature_symbol() {
        let mut config = Config::default();
        assert_eq!(config.temperature_symbol(), "°C");
        config.weather.units = "us".to_string();
        assert_eq!(config.temperature_symbol(), "°F");
        config.weather.units = "uk".to_string();
        assert_eq!(config.temperature_symbol(), "°C");
    }

    #[test]
    fn test_missing_api_key() {
        let mut config = Config::default();
        assert!(matches!(config.api_key(), Err(ConfigError::MissingApiKey)));
        config.weather.api_key = "   ".to_string();
        assert!(config.api_key().is_err());
    }
}
