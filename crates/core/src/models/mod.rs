//! Shared domain models.

use serde::{Deserialize, Serialize};

/// Timezone details derived from the caller's IP address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimezoneInfo {
    /// Short zone abbreviation (e.g. `CEST`).
    pub abbreviation: String,
    /// IANA zone path segments, most specific first (e.g. `Bratislava, Europe`).
    pub region_label: String,
    /// Day of the year, starting at 1.
    pub day_of_year: u16,
}

/// A single quotation with its attribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Attribution; never empty.
    pub author: String,
    /// Quoted text.
    pub content: String,
}

/// Name-day for the current date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedayInfo {
    /// Name (or comma separated names) celebrated today.
    pub name: String,
}

/// Current weather conditions at the user's position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherInfo {
    /// Temperature in degrees Celsius.
    pub temp_c: f64,
    /// Temperature in degrees Fahrenheit.
    pub temp_f: f64,
    /// Human readable condition (e.g. `Partly cloudy`).
    pub condition_text: String,
    /// Absolute URL of the condition icon.
    pub icon_url: String,
}

/// Reverse-geocoded place for the user's position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceInfo {
    /// Locality name.
    pub city: String,
    /// Country name.
    pub country: String,
}

impl PlaceInfo {
    /// Returns `city, country`, skipping whichever half is missing.
    pub fn display_name(&self) -> String {
        match (self.city.is_empty(), self.country.is_empty()) {
            (false, false) => format!("{}, {}", self.city, self.country),
            (false, true) => self.city.clone(),
            _ => self.country.clone(),
        }
    }
}

/// Weather and place for the same position, always published together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalConditions {
    /// Current conditions.
    pub weather: WeatherInfo,
    /// Where they were observed.
    pub place: PlaceInfo,
}

/// Calendar labels computed once at mount from the host locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateInfo {
    /// Short date in the locale's preferred representation.
    pub localized_date: String,
    /// Full weekday name.
    pub weekday_name: String,
    /// Full month name.
    pub month_name: String,
}

/// Geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Degrees north of the equator.
    pub latitude: f64,
    /// Degrees east of Greenwich.
    pub longitude: f64,
}

impl Coordinate {
    /// Build a coordinate from latitude and longitude.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}
