//! Clients for the external services feeding the dashboard.

/// Shared JSON GET plumbing and the fetch error taxonomy.
pub mod http;
/// Random quotation service.
pub mod quote;
/// Name-day calendar service.
pub mod nameday;
/// IP-derived timezone lookup.
pub mod timezone;
/// Weather conditions and reverse geocoding for a coordinate.
pub mod weather;
/// Position lookup and the joined weather/place fetch.
pub mod geo;

#[cfg(test)]
pub(crate) mod testing;

pub use geo::{ConfiguredGeolocator, GeoWeatherClient, GeoWeatherError, GeolocationError, Geolocator};
pub use http::{FetchError, HttpFetcher};
pub use nameday::{NamedayClient, NamedaySource};
pub use quote::{QuoteClient, QuoteSource};
pub use timezone::{TimezoneClient, TimezoneSource};
pub use weather::{PlaceSource, ReverseGeocodeClient, WeatherClient, WeatherSource};
