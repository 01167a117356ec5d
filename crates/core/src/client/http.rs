use reqwest::{Client, IntoUrl};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Failure of a single outbound call.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Connection, TLS or body read failure.
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
    /// Non-2xx response.
    #[error("unexpected status {status} from {url}")]
    Status {
        /// HTTP status code returned by the service.
        status: u16,
        /// Requested URL.
        url: String,
    },
    /// Body could not be decoded or lacked required data.
    #[error("malformed payload: {0}")]
    Payload(String),
    /// Authenticated call attempted without a key.
    #[error("weather API key is not configured")]
    MissingApiKey,
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Payload(err.to_string())
    }
}

/// Thin JSON GET helper shared by every service client.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher with a shared connection pool.
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .user_agent(concat!("dayboard/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_default(),
        }
    }

    /// GET `url` with query pairs and decode the JSON body.
    pub async fn get_json<T, U>(&self, url: U, query: &[(&str, String)]) -> Result<T, FetchError>
    where
        T: DeserializeOwned,
        U: IntoUrl,
    {
        let request = self
            .client
            .get(url)
            .query(query)
            .build()
            .map_err(transport)?;
        // Query strings may carry the API key; keep them out of logs and errors.
        let mut shown = request.url().clone();
        shown.set_query(None);
        let url = shown.to_string();
        debug!(%url, "GET");

        let response = self
            .client
            .execute(request)
            .await
            .map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.bytes().await.map_err(transport)?;
        Ok(serde_json::from_slice(&body)?)
    }
}

fn transport(err: reqwest::Error) -> FetchError {
    FetchError::Transport(err.without_url())
}
