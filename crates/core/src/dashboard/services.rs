use std::sync::Arc;

use crate::{
    client::{
        ConfiguredGeolocator, GeoWeatherClient, HttpFetcher, NamedayClient, NamedaySource,
        QuoteClient, QuoteSource, ReverseGeocodeClient, TimezoneClient, TimezoneSource,
        WeatherClient,
    },
    config::AppConfig,
};

/// The independent data sources a dashboard draws from.
#[derive(Clone)]
pub struct DashboardServices {
    /// IP timezone lookup.
    pub timezone: Arc<dyn TimezoneSource>,
    /// Random quotations.
    pub quotes: Arc<dyn QuoteSource>,
    /// Today's name-day.
    pub namedays: Arc<dyn NamedaySource>,
    /// Position, weather and place.
    pub geo_weather: GeoWeatherClient,
}

impl DashboardServices {
    /// HTTP-backed services sharing one connection pool.
    pub fn from_config(config: &AppConfig) -> Self {
        let fetcher = HttpFetcher::new();
        let endpoints = &config.endpoints;
        Self {
            timezone: Arc::new(TimezoneClient::new(fetcher.clone(), &endpoints.timezone)),
            quotes: Arc::new(QuoteClient::new(fetcher.clone(), &endpoints.quote)),
            namedays: Arc::new(NamedayClient::new(
                fetcher.clone(),
                &endpoints.nameday,
                &config.nameday_country,
            )),
            geo_weather: GeoWeatherClient::new(
                Arc::new(ConfiguredGeolocator::from_config(&config.geolocation)),
                Arc::new(WeatherClient::new(
                    fetcher.clone(),
                    &endpoints.weather,
                    config.weather_api_key.clone(),
                )),
                Arc::new(ReverseGeocodeClient::new(fetcher, &endpoints.reverse_geocode)),
            ),
        }
    }
}
