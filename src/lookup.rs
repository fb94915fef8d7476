//! Movie lookup against the OMDb HTTP API.
//!
//! One GET per search, parameterised by title and API key, with a bounded
//! timeout. A `"Response": "False"` body is a normal "not found" outcome;
//! everything else that goes wrong is a [`LookupError`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::LookupConfig;
use crate::logging::OperationTimer;
use crate::metrics;
use crate::models::MovieRecord;

/// Why a lookup did not produce an answer
#[derive(Error, Debug)]
pub enum LookupError {
    /// No response within the configured timeout
    #[error("Request timed out after {0:?}. Please check your internet connection and try again.")]
    Timeout(Duration),

    /// The service could not be reached
    #[error("Could not connect to the movie database: {0}")]
    Connection(String),

    /// The service answered with a non-success HTTP status
    #[error("Movie database returned HTTP {0}")]
    Status(u16),

    /// The body was not the JSON we expect
    #[error("Unexpected response from the movie database: {0}")]
    Decode(String),

    /// Any other request failure
    #[error("Request to the movie database failed: {0}")]
    Transport(String),

    /// The client could not be built from its settings
    #[error("Invalid lookup configuration: {0}")]
    Config(String),
}

impl LookupError {
    /// Label used for logs and metrics
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Timeout(_) => "timeout",
            Self::Connection(_) => "connection",
            Self::Status(_) => "status",
            Self::Decode(_) => "decode",
            Self::Transport(_) => "transport",
            Self::Config(_) => "config",
        }
    }
}

/// Answer to a successful lookup request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The service matched the title
    Found(MovieRecord),
    /// The service responded but had no match
    NotFound,
}

impl SearchOutcome {
    const fn label(&self) -> &'static str {
        match self {
            Self::Found(_) => "found",
            Self::NotFound => "not_found",
        }
    }
}

/// Something that can look a movie up by title
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MovieLookup {
    /// Look a movie up by exact title
    async fn search(&self, title: &str) -> Result<SearchOutcome, LookupError>;
}

/// Only the fields needed to tell a match from a miss
#[derive(Deserialize)]
struct ResponseFlag {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Error")]
    error: Option<String>,
}

/// OMDb client
pub struct OmdbClient {
    client: Client,
    base_url: Url,
    api_key: String,
    timeout: Duration,
}

impl OmdbClient {
    /// Build a client for `base_url` with a per-request `timeout`
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, LookupError> {
        let base_url = Url::parse(base_url).map_err(|e| LookupError::Config(format!("bad base URL {base_url}: {e}")))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LookupError::Config(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            api_key: api_key.to_string(),
            timeout,
        })
    }

    /// Build a client from the `[lookup]` configuration section
    pub fn from_config(config: &LookupConfig, api_key: &str) -> Result<Self, LookupError> {
        if api_key.is_empty() {
            warn!("No OMDb API key configured; lookups will be rejected by the service");
        }
        Self::new(&config.base_url, api_key, Duration::from_secs(config.timeout_secs))
    }

    async fn fetch(&self, title: &str) -> Result<SearchOutcome, LookupError> {
        let response = self
            .client
            .get(self.base_url.clone())
            .query(&[("t", title), ("apikey", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(|e| self.classify(e))?;
        parse_body(status, &body)
    }

    fn classify(&self, err: reqwest::Error) -> LookupError {
        // The request URL carries the API key
        let err = err.without_url();
        if err.is_timeout() {
            LookupError::Timeout(self.timeout)
        } else if err.is_connect() {
            LookupError::Connection(err.to_string())
        } else if err.is_decode() {
            LookupError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            LookupError::Status(status.as_u16())
        } else {
            LookupError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl MovieLookup for OmdbClient {
    async fn search(&self, title: &str) -> Result<SearchOutcome, LookupError> {
        let timer = OperationTimer::new("movie_lookup");
        let result = self.fetch(title).await;
        let duration = timer.finish();

        match &result {
            Ok(outcome) => {
                info!(title, outcome = outcome.label(), "Movie lookup finished");
                metrics::record_lookup(outcome.label(), duration);
            },
            Err(err) => {
                warn!(title, error = %err, "Movie lookup failed");
                metrics::record_lookup(err.as_str(), duration);
            },
        }

        result
    }
}

fn parse_body(status: StatusCode, body: &str) -> Result<SearchOutcome, LookupError> {
    let flag: ResponseFlag = serde_json::from_str(body).map_err(|e| LookupError::Decode(e.to_string()))?;

    if flag.response.eq_ignore_ascii_case("false") {
        debug!(%status, reason = flag.error.as_deref().unwrap_or("none given"), "No match");
        return Ok(SearchOutcome::NotFound);
    }

    let movie: MovieRecord = serde_json::from_str(body).map_err(|e| LookupError::Decode(e.to_string()))?;
    Ok(SearchOutcome::Found(movie))
}
