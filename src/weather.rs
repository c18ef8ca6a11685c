//! # Pirate Weather Forecast Retrieval
//!
//! Fetches the forecast for the configured location and reduces it to the
//! four values the display shows: current temperature, today's maximum, the
//! daily summary (already translated by the API through `lang`) and the daily
//! icon name.
//!
//! Temperatures are rounded half to even. A missing current or maximum
//! temperature reads as 0.

use log::{debug, info};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::config::{ConfigError, WeatherConfig};

const API_BASE: &str = "https://api.pirateweather.net/forecast";

#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("forecast request failed with status {0}")]
    Status(u16),
    #[error("invalid forecast JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("forecast has no {0}")]
    MissingField(&'static str),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// What one refresh cycle displays.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WeatherReport {
    pub temperature: i32,
    pub temperature_max: i32,
    pub summary: String,
    /// API condition name, e.g. "partly-cloudy-day"
    pub icon: String,
}

#[derive(Deserialize)]
struct Forecast {
    currently: Option<Currently>,
    daily: Option<Daily>,
}

#[derive(Deserialize)]
struct Currently {
    temperature: Option<f64>,
}

#[derive(Deserialize)]
struct Daily {
    #[serde(default)]
    data: Vec<DailyData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DailyData {
    temperature_max: Option<f64>,
    summary: Option<String>,
    icon: Option<String>,
}

fn round_temperature(value: Option<f64>) -> i32 {
    value.map(|t| t.round_ties_even() as i32).unwrap_or(0)
}

/// Reduce a forecast response body to a [`WeatherReport`].
pub fn parse_forecast(body: &str) -> Result<WeatherReport, WeatherError> {
    let forecast: Forecast = serde_json::from_str(body)?;
    let today = forecast
        .daily
        .and_then(|d| d.data.into_iter().next())
        .ok_or(WeatherError::MissingField("daily.data"))?;

    Ok(WeatherReport {
        temperature: round_temperature(forecast.currently.and_then(|c| c.temperature)),
        temperature_max: round_temperature(today.temperature_max),
        summary: today.summary.unwrap_or_default(),
        icon: today.icon.unwrap_or_default(),
    })
}

/// Forecast URL for `config`, without the query string.
pub fn forecast_url(config: &WeatherConfig, api_key: &str) -> String {
    format!(
        "{}/{}/{},{}",
        API_BASE, api_key, config.latitude, config.longitude
    )
}

/// Fetch and parse today's forecast.
pub async fn fetch(client: &Client, config: &WeatherConfig) -> Result<WeatherReport, WeatherError> {
    let api_key = config.api_key.trim();
    if api_key.is_empty() {
        return Err(ConfigError::MissingApiKey.into());
    }

    info!("Fetching weather data...");
    let url = forecast_url(config, api_key);
    let query = [
        ("units", config.units.as_str()),
        ("lang", config.language.as_str()),
    ];

    let response = client.get(&url).query(&query).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(WeatherError::Status(status.as_u16()));
    }
    let body = response.text().await?;
    debug!("forecast response: {} bytes", body.len());
    parse_forecast(&body)
}
