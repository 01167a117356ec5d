//! Wall-clock derivations: time label, part of day, background and date labels.

use std::{env, time::Duration};

use chrono::{Local, Locale, NaiveDateTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::models::DateInfo;

/// Interval between clock ticks once aligned to the minute boundary.
pub const TICK_PERIOD: Duration = Duration::from_secs(60);

const FALLBACK_LOCALE: &str = "en_US";

/// Coarse time-of-day category driving greeting and background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartOfDay {
    /// 04:00 to 11:59.
    Morning,
    /// 12:00 to 17:59.
    Afternoon,
    /// 18:00 to 03:59.
    Evening,
}

impl PartOfDay {
    /// Classify a 24h clock hour.
    pub fn classify(hour: u32) -> Self {
        match hour {
            4..=11 => PartOfDay::Morning,
            12..=17 => PartOfDay::Afternoon,
            _ => PartOfDay::Evening,
        }
    }

    /// Greeting shown ahead of the display name.
    pub fn greeting(self) -> &'static str {
        match self {
            PartOfDay::Morning => "Good Morning",
            PartOfDay::Afternoon => "Good Afternoon",
            PartOfDay::Evening => "Good Evening",
        }
    }

    /// Background matching this part of day.
    pub fn background(self) -> Background {
        match self {
            PartOfDay::Morning => Background::Sunrise,
            PartOfDay::Afternoon => Background::Afternoon,
            PartOfDay::Evening => Background::Evening,
        }
    }
}

/// One of the three fixed dashboard backdrops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Background {
    /// Warm dawn palette.
    Sunrise,
    /// Bright daylight palette.
    Afternoon,
    /// Dark night palette.
    Evening,
}

impl Background {
    /// Asset name used by frontends that ship image files.
    pub fn asset_name(self) -> &'static str {
        match self {
            Background::Sunrise => "sunrise",
            Background::Afternoon => "afternoon",
            Background::Evening => "evening",
        }
    }
}

/// Result of a single clock evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockReading {
    /// Zero padded `HH:MM`.
    pub time_label: String,
    /// Category of the same instant.
    pub part_of_day: PartOfDay,
}

impl ClockReading {
    /// Evaluate the clock at the given local instant.
    pub fn at(now: NaiveDateTime) -> Self {
        Self {
            time_label: format_time_label(now.hour(), now.minute()),
            part_of_day: PartOfDay::classify(now.hour()),
        }
    }

    /// Background derived from the same instant as the reading.
    pub fn background(&self) -> Background {
        self.part_of_day.background()
    }
}

/// Format hour and minute as `HH:MM`.
pub fn format_time_label(hour: u32, minute: u32) -> String {
    format!("{hour:02}:{minute:02}")
}

/// Delay until the next minute boundary, measured with whole-second precision.
pub fn first_tick_delay(now: NaiveDateTime) -> Duration {
    let elapsed = Duration::from_secs(u64::from(now.second().min(59)));
    TICK_PERIOD - elapsed
}

/// Source of local wall-clock time.
pub trait TimeSource: Send + Sync {
    /// Current local date and time.
    fn now(&self) -> NaiveDateTime;
}

/// Host clock in the host timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Resolve the locale used for calendar labels.
///
/// An explicit configured value wins, then `LC_ALL`, `LC_TIME` and `LANG`.
/// Unknown or missing tags fall back to `en_US`.
pub fn resolve_locale(configured: Option<&str>) -> Locale {
    let from_env = || {
        ["LC_ALL", "LC_TIME", "LANG"]
            .iter()
            .filter_map(|key| env::var(key).ok())
            .find(|value| !value.trim().is_empty())
    };

    configured
        .map(str::to_string)
        .or_else(from_env)
        .and_then(|tag| parse_locale(&tag))
        .or_else(|| parse_locale(FALLBACK_LOCALE))
        .unwrap_or(Locale::POSIX)
}

fn parse_locale(tag: &str) -> Option<Locale> {
    // `sk_SK.UTF-8@euro` -> `sk_SK`; `en-GB` -> `en_GB`
    let base = tag
        .split(|c: char| c == '.' || c == '@')
        .next()
        .unwrap_or_default()
        .trim()
        .replace('-', "_");
    match base.as_str() {
        "" => None,
        "C" | "POSIX" => Some(Locale::POSIX),
        other => Locale::try_from(other).ok(),
    }
}

/// Compute the localized date labels for `now`.
pub fn date_info(now: NaiveDateTime, locale: Locale) -> DateInfo {
    // Only calendar fields are formatted, so the offset of the wrapper is irrelevant.
    let stamp = Utc.from_utc_datetime(&now);
    DateInfo {
        localized_date: stamp.format_localized("%x", locale).to_string(),
        weekday_name: stamp.format_localized("%A", locale).to_string(),
        month_name: stamp.format_localized("%B", locale).to_string(),
    }
}
