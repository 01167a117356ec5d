#![allow(missing_docs)]

use async_trait::async_trait;
use serde::Deserialize;

use crate::models::TimezoneInfo;

use super::http::{FetchError, HttpFetcher};

/// Anything able to report the caller's timezone.
#[async_trait]
pub trait TimezoneSource: Send + Sync {
    /// Look up the timezone once.
    async fn fetch_timezone(&self) -> Result<TimezoneInfo, FetchError>;
}

/// worldtimeapi.org style IP lookup.
#[derive(Debug, Clone)]
pub struct TimezoneClient {
    fetcher: HttpFetcher,
    url: String,
}

impl TimezoneClient {
    pub fn new(fetcher: HttpFetcher, url: impl Into<String>) -> Self {
        Self {
            fetcher,
            url: url.into(),
        }
    }
}

#[async_trait]
impl TimezoneSource for TimezoneClient {
    async fn fetch_timezone(&self) -> Result<TimezoneInfo, FetchError> {
        let raw: RawTimezone = self.fetcher.get_json(self.url.as_str(), &[]).await?;
        raw.into_info()
    }
}

/// Reverse the IANA zone path: `Europe/Bratislava` becomes `Bratislava, Europe`.
pub fn region_label(zone: &str) -> String {
    zone.split('/').rev().collect::<Vec<_>>().join(", ")
}

#[derive(Debug, Deserialize)]
struct RawTimezone {
    abbreviation: String,
    timezone: String,
    day_of_year: u16,
}

impl RawTimezone {
    fn into_info(self) -> Result<TimezoneInfo, FetchError> {
        if self.day_of_year == 0 {
            return Err(FetchError::Payload("day_of_year must start at 1".to_string()));
        }
        Ok(TimezoneInfo {
            abbreviation: self.abbreviation,
            region_label: region_label(&self.timezone),
            day_of_year: self.day_of_year,
        })
    }
}
