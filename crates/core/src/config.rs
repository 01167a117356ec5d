//! Application configuration: defaults, optional TOML file, environment.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use tracing::info;

use crate::models::Coordinate;

/// Directory name under the platform config dir.
pub const APP_DIR: &str = "dayboard";

const CONFIG_FILE: &str = "config.toml";
const SESSION_FILE: &str = "session.json";
const ENV_PREFIX: &str = "DAYBOARD";
const API_KEY_ENVS: [&str; 2] = ["WEATHER_API_KEY", "DAYBOARD_WEATHER_API_KEY"];

const DEFAULT_TIMEZONE_URL: &str = "https://worldtimeapi.org/api/ip";
const DEFAULT_QUOTE_URL: &str = "https://api.quotable.io/random";
const DEFAULT_NAMEDAY_URL: &str = "https://nameday.abalin.net/api/V1/today";
const DEFAULT_WEATHER_URL: &str = "http://api.weatherapi.com/v1/current.json";
const DEFAULT_REVERSE_GEOCODE_URL: &str =
    "https://api.bigdatacloud.net/data/reverse-geocode-client";
const DEFAULT_NAMEDAY_COUNTRY: &str = "sk";

const DEFAULT_CONFIG_TEMPLATE: &str = r#"# dayboard configuration
#
# Every value can also be set through the environment, e.g.
#   DAYBOARD_NAMEDAY_COUNTRY=cz
#   DAYBOARD_GEOLOCATION__LATITUDE=48.14
# The weather API key is read from WEATHER_API_KEY (or DAYBOARD_WEATHER_API_KEY), never from this file.

# Country code used to pick the name-day entry.
nameday_country = "sk"

# Locale for date labels (falls back to LC_ALL / LC_TIME / LANG).
# locale = "sk_SK"

[geolocation]
# Set to true and provide coordinates to enable the weather block.
enabled = false
# latitude = 48.1486
# longitude = 17.1077

[endpoints]
timezone = "https://worldtimeapi.org/api/ip"
quote = "https://api.quotable.io/random"
nameday = "https://nameday.abalin.net/api/V1/today"
weather = "http://api.weatherapi.com/v1/current.json"
reverse_geocode = "https://api.bigdatacloud.net/data/reverse-geocode-client"
"#;

/// Base URLs of the external services.
#[derive(Debug, Clone, Deserialize)]
pub struct Endpoints {
    /// IP timezone lookup.
    pub timezone: String,
    /// Random quote service.
    pub quote: String,
    /// Name-day service.
    pub nameday: String,
    /// Current weather service.
    pub weather: String,
    /// Reverse geocoding service.
    pub reverse_geocode: String,
}

/// Position source settings; `enabled = false` behaves as a refused permission.
#[derive(Debug, Clone, Deserialize)]
pub struct GeolocationConfig {
    /// Whether the position may be used at all.
    pub enabled: bool,
    /// Degrees north.
    pub latitude: Option<f64>,
    /// Degrees east.
    pub longitude: Option<f64>,
}

impl GeolocationConfig {
    /// Configured coordinate, if both halves are present.
    pub fn coordinate(&self) -> Option<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinate::new(latitude, longitude)),
            _ => None,
        }
    }
}

/// Fully resolved application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Service endpoints.
    pub endpoints: Endpoints,
    /// Country key selected from the name-day payload.
    pub nameday_country: String,
    /// Explicit locale tag for date labels.
    #[serde(default)]
    pub locale: Option<String>,
    /// Position source settings.
    pub geolocation: GeolocationConfig,
    /// Override for the persisted session file.
    #[serde(default)]
    pub session_path: Option<PathBuf>,
    /// Secret for the weather service; only ever taken from the environment.
    #[serde(skip)]
    pub weather_api_key: Option<String>,
}

impl AppConfig {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path())
    }

    /// Load configuration layered over defaults from the given file (which may be absent).
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let settings = Config::builder()
            .set_default("endpoints.timezone", DEFAULT_TIMEZONE_URL)?
            .set_default("endpoints.quote", DEFAULT_QUOTE_URL)?
            .set_default("endpoints.nameday", DEFAULT_NAMEDAY_URL)?
            .set_default("endpoints.weather", DEFAULT_WEATHER_URL)?
            .set_default("endpoints.reverse_geocode", DEFAULT_REVERSE_GEOCODE_URL)?
            .set_default("nameday_country", DEFAULT_NAMEDAY_COUNTRY)?
            .set_default("geolocation.enabled", false)?
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("failed to read configuration {}", path.display()))?;

        let mut config: AppConfig = settings
            .try_deserialize()
            .context("failed to deserialize configuration")?;

        config.weather_api_key = api_key_from(|name| env::var(name).ok());

        Ok(config)
    }

    /// Where the display name is persisted.
    pub fn session_file(&self) -> PathBuf {
        self.session_path
            .clone()
            .unwrap_or_else(|| app_dir().join(SESSION_FILE))
    }
}

fn api_key_from(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    API_KEY_ENVS
        .iter()
        .filter_map(|&name| lookup(name))
        .map(|key| key.trim().to_string())
        .find(|key| !key.is_empty())
}

/// Platform config directory for the application.
pub fn app_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Default configuration file location.
pub fn config_path() -> PathBuf {
    app_dir().join(CONFIG_FILE)
}

/// Write the commented default configuration if no file exists yet.
pub fn ensure_default_config() -> Result<()> {
    ensure_default_config_at(config_path())
}

fn ensure_default_config_at(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG_TEMPLATE)
        .with_context(|| format!("failed to write default config {}", path.display()))?;
    info!(path = %path.display(), "Wrote default configuration");
    Ok(())
}
