//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub integrations: IntegrationsConfig,
}

/// Reflection store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Holds `daybook.db` and the `images/` directory
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("daybook").to_string_lossy().to_string())
        .unwrap_or_else(|| "./daybook_data".to_string())
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl StorageConfig {
    /// Data directory with a leading `~` expanded
    pub fn data_path(&self) -> PathBuf {
        expand_home(&self.data_dir)
    }
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Upper bound for request bodies, base64 images included
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5003
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:8084".to_string(),
        "http://127.0.0.1:8084".to_string(),
    ]
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_body_bytes() -> usize {
    32 * 1024 * 1024 // 32 MB
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
            request_timeout_secs: default_request_timeout(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl ApiConfig {
    /// Socket address string, e.g. "127.0.0.1:5003"
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Base URL clients use to reach this server
    pub fn base_url(&self) -> String {
        let host = match self.host.as_str() {
            "0.0.0.0" => "127.0.0.1",
            other => other,
        };
        format!("http://{}:{}", host, self.port)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }

    /// Default `EnvFilter` directive for the server binary
    pub fn filter_directive(&self) -> String {
        format!("daybook={},tower_http=debug", self.level)
    }
}

/// Daily context shown next to the form
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IntegrationsConfig {
    #[serde(default)]
    pub things: ThingsConfig,

    #[serde(default)]
    pub weather: WeatherConfig,
}

/// Things 3 task list (read-only)
#[derive(Debug, Clone, Deserialize)]
pub struct ThingsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Path to `main.sqlite`; searched in the Things group container when unset
    pub db_path: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Default for ThingsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            db_path: None,
        }
    }
}

impl ThingsConfig {
    pub fn db_path(&self) -> Option<PathBuf> {
        self.db_path.as_deref().map(expand_home)
    }
}

/// Forecast from open-meteo (no API key)
#[derive(Debug, Clone, Deserialize)]
pub struct WeatherConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_weather_url")]
    pub base_url: String,

    #[serde(default = "default_location")]
    pub location: String,

    #[serde(default = "default_latitude")]
    pub latitude: f64,

    #[serde(default = "default_longitude")]
    pub longitude: f64,

    /// IANA zone the hourly forecast is reported in
    #[serde(default = "default_timezone")]
    pub timezone: String,

    #[serde(default = "default_weather_timeout")]
    pub timeout_secs: u64,
}

fn default_weather_url() -> String {
    "https://api.open-meteo.com/v1".to_string()
}

fn default_location() -> String {
    "Manchester".to_string()
}

fn default_latitude() -> f64 {
    53.4808
}

fn default_longitude() -> f64 {
    -2.2426
}

fn default_timezone() -> String {
    "Europe/London".to_string()
}

fn default_weather_timeout() -> u64 {
    10
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_weather_url(),
            location: default_location(),
            latitude: default_latitude(),
            longitude: default_longitude(),
            timezone: default_timezone(),
            timeout_secs: default_weather_timeout(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        for path in default_config_paths() {
            if path.exists() {
                match Self::load_with_env(&path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Storage overrides
        if let Some(data_dir) = var("DAYBOOK_DATA_DIR") {
            self.storage.data_dir = data_dir;
        }

        // API overrides
        if let Some(host) = var("DAYBOOK_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = var("DAYBOOK_API_PORT") {
            match port.parse() {
                Ok(p) => self.api.port = p,
                Err(_) => tracing::warn!(value = %port, "Ignoring invalid DAYBOOK_API_PORT"),
            }
        }

        // Logging overrides
        if let Some(level) = var("DAYBOOK_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("DAYBOOK_LOG_FORMAT") {
            self.logging.format = format;
        }

        // Integration overrides
        if let Some(path) = var("DAYBOOK_THINGS_DB") {
            self.integrations.things.db_path = Some(path);
        }
        if let Some(url) = var("DAYBOOK_WEATHER_URL") {
            self.integrations.weather.base_url = url;
        }
    }
}

/// Config file search order used by [`Config::load_default`]
pub fn default_config_paths() -> Vec<PathBuf> {
    [
        dirs::config_dir().map(|p| p.join("daybook").join("config.toml")),
        Some(PathBuf::from("/etc/daybook/config.toml")),
        Some(PathBuf::from("./config.toml")),
    ]
    .into_iter()
    .flatten()
    .collect()
}

fn expand_home(raw: &str) -> PathBuf {
    match raw.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(raw)),
        None => PathBuf::from(raw),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Daybook Configuration
#
# Environment variables override these settings:
# - DAYBOOK_DATA_DIR
# - DAYBOOK_API_HOST
# - DAYBOOK_API_PORT
# - DAYBOOK_LOG_LEVEL
# - DAYBOOK_LOG_FORMAT
# - DAYBOOK_THINGS_DB
# - DAYBOOK_WEATHER_URL

[storage]
# Directory holding daybook.db and uploaded images
data_dir = "~/.local/share/daybook"

[api]
# API server host
host = "127.0.0.1"

# API server port
port = 5003

# Allowed CORS origins (empty list allows any origin)
cors_origins = ["http://localhost:8084", "http://127.0.0.1:8084"]

# Request timeout in seconds
request_timeout_secs = 30

# Maximum request body size in bytes (images are sent base64-encoded)
max_body_bytes = 33554432

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Optional log file path
# file = "/var/log/daybook/daybook.log"

[integrations.things]
# Today's tasks and recently completed ones from Things 3 (read-only)
enabled = true

# Defaults to the Things group container under ~/Library
# db_path = "~/Library/Group Containers/JLMPQHK86H.com.culturedcode.ThingsMac/ThingsData-XXXXX/Things Database.thingsdatabase/main.sqlite"

[integrations.weather]
enabled = true
base_url = "https://api.open-meteo.com/v1"
location = "Manchester"
latitude = 53.4808
longitude = -2.2426
timezone = "Europe/London"
timeout_secs = 10
"#
    .to_string()
}
