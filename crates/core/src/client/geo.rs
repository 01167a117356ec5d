#![allow(missing_docs)]

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::{
    config::GeolocationConfig,
    models::{Coordinate, LocalConditions},
};

use super::{
    http::FetchError,
    weather::{PlaceSource, WeatherSource},
};

/// Why no position is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GeolocationError {
    /// The host offers no position source.
    #[error("geolocation is unavailable")]
    Unavailable,
    /// The user refused to share a position.
    #[error("geolocation permission denied")]
    PermissionDenied,
}

/// Platform position capability.
#[async_trait]
pub trait Geolocator: Send + Sync {
    /// Request the current position, prompting for permission when the host does.
    async fn current_position(&self) -> Result<Coordinate, GeolocationError>;
}

/// Position taken from configuration; disabling it is equivalent to refusing permission.
#[derive(Debug, Clone)]
pub struct ConfiguredGeolocator {
    enabled: bool,
    position: Option<Coordinate>,
}

impl ConfiguredGeolocator {
    pub fn new(enabled: bool, position: Option<Coordinate>) -> Self {
        Self { enabled, position }
    }

    pub fn from_config(config: &GeolocationConfig) -> Self {
        Self::new(config.enabled, config.coordinate())
    }
}

#[async_trait]
impl Geolocator for ConfiguredGeolocator {
    async fn current_position(&self) -> Result<Coordinate, GeolocationError> {
        if !self.enabled {
            return Err(GeolocationError::PermissionDenied);
        }
        self.position.ok_or(GeolocationError::Unavailable)
    }
}

/// Failure of the position-then-weather sequence.
#[derive(Debug, thiserror::Error)]
pub enum GeoWeatherError {
    /// No position, so no request was made.
    #[error(transparent)]
    Geolocation(#[from] GeolocationError),
    /// At least one of the two dependent calls failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl GeoWeatherError {
    /// True when no position was available, which is a normal state rather than a fault.
    pub fn is_position_unavailable(&self) -> bool {
        matches!(self, GeoWeatherError::Geolocation(_))
    }
}

/// Resolves the user's position, then weather and place for it in parallel.
#[derive(Clone)]
pub struct GeoWeatherClient {
    geolocator: Arc<dyn Geolocator>,
    weather: Arc<dyn WeatherSource>,
    places: Arc<dyn PlaceSource>,
}

impl GeoWeatherClient {
    pub fn new(
        geolocator: Arc<dyn Geolocator>,
        weather: Arc<dyn WeatherSource>,
        places: Arc<dyn PlaceSource>,
    ) -> Self {
        Self {
            geolocator,
            weather,
            places,
        }
    }

    /// Both halves or nothing: a single failure discards the other result.
    pub async fn fetch(&self) -> Result<LocalConditions, GeoWeatherError> {
        let position = match self.geolocator.current_position().await {
            Ok(position) => position,
            Err(err) => {
                info!(reason = %err, "Skipping weather lookup");
                return Err(err.into());
            }
        };

        let (weather, place) = tokio::try_join!(
            self.weather.current_weather(position),
            self.places.reverse_geocode(position),
        )?;
        Ok(LocalConditions { weather, place })
    }
}
