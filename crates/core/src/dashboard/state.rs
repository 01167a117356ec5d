#![allow(missing_docs)]

use serde::{Deserialize, Serialize};

use crate::{
    clock::{Background, ClockReading},
    models::{DateInfo, LocalConditions, NamedayInfo, PlaceInfo, Quote, TimezoneInfo, WeatherInfo},
};

/// The signed-in display name; empty means logged out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub display_name: String,
}

impl Session {
    pub fn is_logged_in(&self) -> bool {
        !self.display_name.is_empty()
    }
}

/// Merged view-model rendered by the frontend.
///
/// Each source owns a disjoint slice; optional slices stay `None` until their
/// source resolves and are never cleared afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardState {
    pub clock: ClockReading,
    pub background: Background,
    pub date: DateInfo,
    pub timezone: Option<TimezoneInfo>,
    pub quote: Option<Quote>,
    pub nameday: Option<NamedayInfo>,
    pub conditions: Option<LocalConditions>,
    pub session: Session,
    /// Splash window flag; cleared by a fixed timer, not by fetch completion.
    pub loading: bool,
}

impl DashboardState {
    pub(crate) fn new(clock: ClockReading, date: DateInfo, session: Session) -> Self {
        Self {
            background: clock.background(),
            clock,
            date,
            timezone: None,
            quote: None,
            nameday: None,
            conditions: None,
            session,
            loading: true,
        }
    }

    /// Replace the clock reading together with the background derived from it.
    pub(crate) fn apply_clock(&mut self, reading: ClockReading) {
        self.background = reading.background();
        self.clock = reading;
    }

    pub fn weather(&self) -> Option<&WeatherInfo> {
        self.conditions.as_ref().map(|c| &c.weather)
    }

    pub fn place(&self) -> Option<&PlaceInfo> {
        self.conditions.as_ref().map(|c| &c.place)
    }

    /// `Good Morning, Al`
    pub fn greeting_line(&self) -> String {
        format!(
            "{}, {}",
            self.clock.part_of_day.greeting(),
            self.session.display_name
        )
    }

    /// Reverse-geocoded place when known, otherwise the timezone region.
    pub fn location_line(&self) -> Option<String> {
        if let Some(place) = self.place() {
            return Some(format!("in {}", place.display_name()));
        }
        self.timezone
            .as_ref()
            .map(|tz| format!("in {}", tz.region_label))
    }

    /// Weather summary, only when a condition is known.
    pub fn weather_line(&self) -> Option<String> {
        self.weather()
            .filter(|weather| !weather.condition_text.is_empty())
            .map(|weather| format!("{}°C - {}", weather.temp_c, weather.condition_text))
    }
}
