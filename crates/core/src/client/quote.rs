#![allow(missing_docs)]

use async_trait::async_trait;
use serde::Deserialize;

use crate::models::Quote;

use super::http::{FetchError, HttpFetcher};

/// Attribution used when the service omits one.
pub const UNKNOWN_AUTHOR: &str = "Unknown author";

/// Source of random quotations. Every call is independent, so it can be re-invoked freely.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Fetch one random quotation.
    async fn fetch_quote(&self) -> Result<Quote, FetchError>;
}

/// quotable.io client.
#[derive(Debug, Clone)]
pub struct QuoteClient {
    fetcher: HttpFetcher,
    url: String,
}

impl QuoteClient {
    pub fn new(fetcher: HttpFetcher, url: impl Into<String>) -> Self {
        Self {
            fetcher,
            url: url.into(),
        }
    }
}

#[async_trait]
impl QuoteSource for QuoteClient {
    async fn fetch_quote(&self) -> Result<Quote, FetchError> {
        let raw: RawQuote = self.fetcher.get_json(self.url.as_str(), &[]).await?;
        Ok(raw.into_quote())
    }
}

#[derive(Debug, Deserialize)]
struct RawQuote {
    #[serde(default)]
    author: Option<String>,
    content: String,
}

impl RawQuote {
    fn into_quote(self) -> Quote {
        let author = self
            .author
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());
        Quote {
            author,
            content: self.content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Quote {
        serde_json::from_str::<RawQuote>(json).unwrap().into_quote()
    }

    #[test]
    fn null_author_becomes_unknown() {
        let quote = parse(r#"{"author": null, "content": "x"}"#);
        assert_eq!(
            quote,
            Quote {
                author: UNKNOWN_AUTHOR.to_string(),
                content: "x".to_string(),
            }
        );
    }

    #[test]
    fn present_author_is_kept() {
        let quote = parse(r#"{"_id": "abc", "author": "Y", "content": "x", "length": 1}"#);
        assert_eq!(quote.author, "Y");
        assert_eq!(quote.content, "x");
    }

    #[test]
    fn missing_or_blank_author_becomes_unknown() {
        assert_eq!(parse(r#"{"content": "x"}"#).author, UNKNOWN_AUTHOR);
        assert_eq!(parse(r#"{"author": "  ", "content": "x"}"#).author, UNKNOWN_AUTHOR);
    }

    #[test]
    fn missing_content_is_malformed() {
        assert!(serde_json::from_str::<RawQuote>(r#"{"author": "Y"}"#).is_err());
    }
}
