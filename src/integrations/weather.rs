//! Weather Integration
//!
//! Current conditions plus the remaining hours of today and tomorrow from
//! the open-meteo forecast API. No key needed; the location comes from
//! `[integrations.weather]`.

use super::*;
use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::WeatherConfig;

const HOURLY_FIELDS: &str =
    "temperature_2m,apparent_temperature,precipitation_probability,weathercode,windspeed_10m";

/// Open-meteo forecast client for one location
pub struct WeatherIntegration {
    client: Client,
    config: WeatherConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentWeather {
    pub temp: i64,
    pub wind_speed: f64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyForecast {
    /// Local time, `HH:MM`
    pub time: String,
    pub temp: i64,
    pub feels_like: i64,
    pub description: String,
    pub wind_speed: f64,
    pub precipitation_prob: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeatherReport {
    pub location: String,
    pub current: CurrentWeather,
    pub today: Vec<HourlyForecast>,
    pub tomorrow: Vec<HourlyForecast>,
}

/// Subset of the open-meteo `/forecast` response
#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current_weather: RawCurrent,
    hourly: RawHourly,
}

#[derive(Debug, Deserialize)]
struct RawCurrent {
    /// Local time in the requested timezone
    time: String,
    temperature: f64,
    windspeed: f64,
    weathercode: u8,
}

#[derive(Debug, Deserialize)]
struct RawHourly {
    time: Vec<String>,
    temperature_2m: Vec<Option<f64>>,
    apparent_temperature: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_probability: Vec<Option<f64>>,
    weathercode: Vec<Option<u8>>,
    windspeed_10m: Vec<Option<f64>>,
}

impl WeatherIntegration {
    pub fn new(config: WeatherConfig) -> Result<Self, IntegrationError> {
        let client = Client::builder()
            .user_agent(concat!("Daybook/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn location(&self) -> &str {
        &self.config.location
    }

    /// Fetch and summarize the forecast
    pub async fn forecast(&self) -> Result<WeatherReport, IntegrationError> {
        let url = format!("{}/forecast", self.config.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(url)
            .query(&[
                ("latitude", self.config.latitude.to_string()),
                ("longitude", self.config.longitude.to_string()),
                ("current_weather", "true".to_string()),
                ("hourly", HOURLY_FIELDS.to_string()),
                ("timezone", self.config.timezone.clone()),
                ("forecast_days", "2".to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(IntegrationError::ApiError(format!(
                "open-meteo returned {}",
                response.status()
            )));
        }

        let raw: ForecastResponse = response
            .json()
            .await
            .map_err(|e| IntegrationError::ParseError(e.to_string()))?;

        let report = summarize(&self.config.location, raw)?;
        tracing::debug!(
            location = %report.location,
            today = report.today.len(),
            tomorrow = report.tomorrow.len(),
            "Fetched weather"
        );
        Ok(report)
    }
}

#[async_trait]
impl Integration for WeatherIntegration {
    fn name(&self) -> &str {
        "weather"
    }

    fn description(&self) -> &str {
        "Current weather and hourly forecast from open-meteo"
    }

    async fn check(&self) -> Result<(), IntegrationError> {
        self.forecast().await.map(|_| ())
    }
}

/// Split hourly rows into today and tomorrow, dropping hours already past.
/// "Now" is the forecast's own current time, so no timezone math is needed.
fn summarize(location: &str, raw: ForecastResponse) -> Result<WeatherReport, IntegrationError> {
    let now = parse_local(&raw.current_weather.time)?;
    let today = now.date();
    let tomorrow = today + Duration::days(1);

    let current = CurrentWeather {
        temp: raw.current_weather.temperature.round() as i64,
        wind_speed: raw.current_weather.windspeed,
        description: weather_description(raw.current_weather.weathercode).to_string(),
    };

    let hourly = &raw.hourly;
    let mut today_forecasts = Vec::new();
    let mut tomorrow_forecasts = Vec::new();

    for (i, time) in hourly.time.iter().enumerate() {
        let at = parse_local(time)?;
        if at < now {
            continue;
        }

        let value = |column: &[Option<f64>]| column.get(i).copied().flatten();
        let forecast = HourlyForecast {
            time: at.format("%H:%M").to_string(),
            temp: value(hourly.temperature_2m.as_slice()).unwrap_or_default().round() as i64,
            feels_like: value(hourly.apparent_temperature.as_slice()).unwrap_or_default().round() as i64,
            description: hourly
                .weathercode
                .get(i)
                .copied()
                .flatten()
                .map(weather_description)
                .unwrap_or("Unknown")
                .to_string(),
            wind_speed: value(hourly.windspeed_10m.as_slice()).unwrap_or_default(),
            precipitation_prob: value(hourly.precipitation_probability.as_slice()),
        };

        if at.date() == today {
            today_forecasts.push(forecast);
        } else if at.date() == tomorrow {
            tomorrow_forecasts.push(forecast);
        }
    }

    Ok(WeatherReport {
        location: location.to_string(),
        current,
        today: today_forecasts,
        tomorrow: tomorrow_forecasts,
    })
}

fn parse_local(raw: &str) -> Result<NaiveDateTime, IntegrationError> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .map_err(|e| IntegrationError::ParseError(format!("invalid time '{}': {}", raw, e)))
}

/// WMO weather interpretation code
pub fn weather_description(code: u8) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Foggy",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        71 => "Slight snow",
        73 => "Moderate snow",
        75 => "Heavy snow",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => "Unknown",
    }
}
