//! Daily Context Integrations
//!
//! Read-only sources shown next to the reflection form:
//! - Things 3 (today's tasks, recently completed tasks)
//! - Weather (open-meteo forecast, no API key)

mod things;
mod weather;

pub use things::{
    default_things_db, CompletedDay, CompletedTask, RecentCompleted, TaskGroup, ThingsIntegration,
    TodayTask, TodayTasks, YesterdayCompleted,
};
pub use weather::{
    weather_description, CurrentWeather, HourlyForecast, WeatherIntegration, WeatherReport,
};

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::IntegrationsConfig;

/// Common surface of every integration
#[async_trait]
pub trait Integration: Send + Sync {
    /// Unique name for this integration
    fn name(&self) -> &str;

    /// Human-readable description
    fn description(&self) -> &str;

    /// Cheap reachability check used by `/health`
    async fn check(&self) -> Result<(), IntegrationError>;
}

/// Errors that can occur while reading an integration
#[derive(Debug, thiserror::Error)]
pub enum IntegrationError {
    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Integrations enabled for this server
#[derive(Clone, Default)]
pub struct Integrations {
    pub things: Option<Arc<ThingsIntegration>>,
    pub weather: Option<Arc<WeatherIntegration>>,
}

impl Integrations {
    /// Build the enabled integrations. A source that cannot be set up is
    /// logged and left out; it never stops the server.
    pub fn from_config(config: &IntegrationsConfig) -> Self {
        let things = if config.things.enabled {
            match config.things.db_path().or_else(default_things_db) {
                Some(path) => Some(Arc::new(ThingsIntegration::new(path))),
                None => {
                    tracing::info!("Things 3 database not found, task lists disabled");
                    None
                }
            }
        } else {
            None
        };

        let weather = if config.weather.enabled {
            match WeatherIntegration::new(config.weather.clone()) {
                Ok(weather) => Some(Arc::new(weather)),
                Err(e) => {
                    tracing::warn!(error = %e, "Weather integration disabled");
                    None
                }
            }
        } else {
            None
        };

        Self { things, weather }
    }

    /// Every enabled integration behind the common trait
    pub fn all(&self) -> Vec<Arc<dyn Integration>> {
        let mut all: Vec<Arc<dyn Integration>> = Vec::new();
        if let Some(things) = &self.things {
            all.push(Arc::clone(things) as Arc<dyn Integration>);
        }
        if let Some(weather) = &self.weather {
            all.push(Arc::clone(weather) as Arc<dyn Integration>);
        }
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ThingsConfig, WeatherConfig};

    #[test]
    fn test_disabled_integrations() {
        let config = IntegrationsConfig {
            things: ThingsConfig {
                enabled: false,
                db_path: Some("/tmp/things.sqlite".to_string()),
            },
            weather: WeatherConfig {
                enabled: false,
                ..WeatherConfig::default()
            },
        };

        let integrations = Integrations::from_config(&config);
        assert!(integrations.things.is_none());
        assert!(integrations.weather.is_none());
        assert!(integrations.all().is_empty());
    }

    #[test]
    fn test_enabled_integrations() {
        let config = IntegrationsConfig {
            things: ThingsConfig {
                enabled: true,
                db_path: Some("/tmp/things.sqlite".to_string()),
            },
            weather: WeatherConfig::default(),
        };

        let integrations = Integrations::from_config(&config);
        let names: Vec<String> = integrations
            .all()
            .iter()
            .map(|i| i.name().to_string())
            .collect();
        assert_eq!(names, vec!["things", "weather"]);
    }
}
