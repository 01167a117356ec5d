#![allow(missing_docs)]

use async_trait::async_trait;
use serde::Deserialize;

use crate::models::{Coordinate, PlaceInfo, WeatherInfo};

use super::http::{FetchError, HttpFetcher};

/// Current conditions for a coordinate.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Fetch current weather at `at`.
    async fn current_weather(&self, at: Coordinate) -> Result<WeatherInfo, FetchError>;
}

/// City and country for a coordinate.
#[async_trait]
pub trait PlaceSource: Send + Sync {
    /// Reverse geocode `at`.
    async fn reverse_geocode(&self, at: Coordinate) -> Result<PlaceInfo, FetchError>;
}

/// weatherapi.com `current.json` client, authenticated with an API key.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    fetcher: HttpFetcher,
    url: String,
    api_key: Option<String>,
}

impl WeatherClient {
    pub fn new(fetcher: HttpFetcher, url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            fetcher,
            url: url.into(),
            api_key,
        }
    }
}

#[async_trait]
impl WeatherSource for WeatherClient {
    async fn current_weather(&self, at: Coordinate) -> Result<WeatherInfo, FetchError> {
        let key = self.api_key.clone().ok_or(FetchError::MissingApiKey)?;
        let query = [
            ("key", key),
            ("q", format!("{},{}", at.latitude, at.longitude)),
            ("aqi", "no".to_string()),
        ];
        let raw: RawWeather = self.fetcher.get_json(self.url.as_str(), &query).await?;
        raw.into_info()
    }
}

/// bigdatacloud.net client-side reverse geocoder.
#[derive(Debug, Clone)]
pub struct ReverseGeocodeClient {
    fetcher: HttpFetcher,
    url: String,
}

impl ReverseGeocodeClient {
    pub fn new(fetcher: HttpFetcher, url: impl Into<String>) -> Self {
        Self {
            fetcher,
            url: url.into(),
        }
    }
}

#[async_trait]
impl PlaceSource for ReverseGeocodeClient {
    async fn reverse_geocode(&self, at: Coordinate) -> Result<PlaceInfo, FetchError> {
        let query = [
            ("latitude", at.latitude.to_string()),
            ("longitude", at.longitude.to_string()),
            ("localityLanguage", "en".to_string()),
        ];
        let raw: RawPlace = self.fetcher.get_json(self.url.as_str(), &query).await?;
        raw.into_info()
    }
}

#[derive(Debug, Deserialize)]
struct RawWeather {
    current: RawCurrent,
}

#[derive(Debug, Deserialize)]
struct RawCurrent {
    temp_c: f64,
    temp_f: f64,
    condition: RawCondition,
}

#[derive(Debug, Deserialize)]
struct RawCondition {
    #[serde(default)]
    text: String,
    #[serde(default)]
    icon: String,
}

impl RawWeather {
    fn into_info(self) -> Result<WeatherInfo, FetchError> {
        let RawCurrent {
            temp_c,
            temp_f,
            condition,
        } = self.current;
        let condition_text = condition.text.trim().to_string();
        if condition_text.is_empty() {
            return Err(FetchError::Payload("empty weather condition".to_string()));
        }
        Ok(WeatherInfo {
            temp_c,
            temp_f,
            condition_text,
            icon_url: absolute_icon_url(&condition.icon),
        })
    }
}

// weatherapi hands out protocol-relative icon links.
fn absolute_icon_url(icon: &str) -> String {
    if icon.starts_with("//") {
        format!("https:{icon}")
    } else {
        icon.to_string()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPlace {
    #[serde(default)]
    city: String,
    #[serde(default)]
    country_name: String,
}

impl RawPlace {
    fn into_info(self) -> Result<PlaceInfo, FetchError> {
        let city = self.city.trim().to_string();
        let country = self.country_name.trim().to_string();
        if city.is_empty() && country.is_empty() {
            return Err(FetchError::Payload("empty reverse geocode result".to_string()));
        }
        Ok(PlaceInfo { city, country })
    }
}
