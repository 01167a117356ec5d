#![allow(missing_docs)]

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::models::NamedayInfo;

use super::http::{FetchError, HttpFetcher};

/// Source of today's name-day.
#[async_trait]
pub trait NamedaySource: Send + Sync {
    /// Fetch the name-day for the current date.
    async fn fetch_nameday(&self) -> Result<NamedayInfo, FetchError>;
}

/// nameday.abalin.net client; picks one country's calendar out of the payload.
#[derive(Debug, Clone)]
pub struct NamedayClient {
    fetcher: HttpFetcher,
    url: String,
    country: String,
}

impl NamedayClient {
    pub fn new(fetcher: HttpFetcher, url: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            fetcher,
            url: url.into(),
            country: country.into(),
        }
    }
}

#[async_trait]
impl NamedaySource for NamedayClient {
    async fn fetch_nameday(&self) -> Result<NamedayInfo, FetchError> {
        let raw: RawNameday = self.fetcher.get_json(self.url.as_str(), &[]).await?;
        raw.pick(&self.country)
    }
}

#[derive(Debug, Deserialize)]
struct RawNameday {
    nameday: HashMap<String, Value>,
}

impl RawNameday {
    fn pick(&self, country: &str) -> Result<NamedayInfo, FetchError> {
        let name = self
            .nameday
            .get(country)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| FetchError::Payload(format!("no name-day entry for '{country}'")))?;
        Ok(NamedayInfo {
            name: name.to_string(),
        })
    }
}
