//! Typed client for the location reference endpoints.
//!
//! The service talks to the API through the [`LocationBackend`] trait so
//! tests can substitute an in-process mock. [`HttpLocationBackend`] is the
//! production implementation over reqwest.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::config::LocationsConfig;
use crate::error::LocationError;
use crate::models::RawLocationRecord;

/// User agent reported to the marketplace API.
pub const USER_AGENT: &str = concat!("roombid-locations/", env!("CARGO_PKG_VERSION"));

/// The search endpoint rejects terms shorter than this; the client never
/// sends them and answers with an empty result instead.
pub const MIN_REMOTE_SEARCH_CHARS: usize = 2;

/// Raw result buckets of a remote location search.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchBuckets {
    #[serde(default)]
    pub provinces: Vec<RawLocationRecord>,
    #[serde(default)]
    pub districts: Vec<RawLocationRecord>,
}

/// Remote source of location reference data.
#[async_trait]
pub trait LocationBackend: Send + Sync {
    /// `GET /locations/popular?limit=N`
    async fn fetch_popular(&self, limit: usize) -> Result<Vec<RawLocationRecord>, LocationError>;

    /// `GET /locations/search?q=&limit=`
    async fn search(&self, term: &str, limit: usize) -> Result<SearchBuckets, LocationError>;

    /// `GET /locations/provinces`
    async fn fetch_provinces(&self) -> Result<Vec<RawLocationRecord>, LocationError>;

    /// `GET /locations/districts`
    async fn fetch_districts(&self) -> Result<Vec<RawLocationRecord>, LocationError>;
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct PopularData {
    #[serde(default)]
    suggestions: Vec<RawLocationRecord>,
}

#[derive(Debug, Deserialize)]
struct SearchData {
    #[serde(default)]
    results: SearchBuckets,
}

/// HTTP implementation of [`LocationBackend`].
pub struct HttpLocationBackend {
    client: Client,
    base_url: Url,
}

impl HttpLocationBackend {
    /// Create a client from configuration.
    pub fn new(config: &LocationsConfig) -> Result<Self, LocationError> {
        Self::with_timeout(&config.base_url, config.request_timeout())
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, LocationError> {
        // Trailing slash so Url::join appends instead of replacing the last
        // path segment.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url = Url::parse(&normalized)?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()
            .expect("Failed to create HTTP client");

        Ok(Self { client, base_url })
    }

    async fn get_envelope<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, LocationError> {
        let url = self.base_url.join(path)?;
        debug!(%url, "requesting location endpoint");

        let response = self.client.get(url).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LocationError::Remote(format!(
                "{} returned HTTP {}",
                path, status
            )));
        }

        let envelope: Envelope<T> = response.json().await?;
        if !envelope.success {
            return Err(LocationError::Remote(envelope.message.unwrap_or_else(
                || format!("{} reported failure", path),
            )));
        }
        envelope
            .data
            .ok_or_else(|| LocationError::Remote(format!("{} returned no data payload", path)))
    }
}

#[async_trait]
impl LocationBackend for HttpLocationBackend {
    async fn fetch_popular(&self, limit: usize) -> Result<Vec<RawLocationRecord>, LocationError> {
        let data: PopularData = self
            .get_envelope("locations/popular", &[("limit", limit.to_string())])
            .await?;
        Ok(data.suggestions)
    }

    async fn search(&self, term: &str, limit: usize) -> Result<SearchBuckets, LocationError> {
        let term = term.trim();
        if below_remote_threshold(term) {
            debug!(term, "term below remote search threshold, skipping request");
            return Ok(SearchBuckets::default());
        }

        let data: SearchData = self
            .get_envelope(
                "locations/search",
                &[("q", term.to_string()), ("limit", limit.to_string())],
            )
            .await?;
        Ok(data.results)
    }

    async fn fetch_provinces(&self) -> Result<Vec<RawLocationRecord>, LocationError> {
        self.get_envelope("locations/provinces", &[]).await
    }

    async fn fetch_districts(&self) -> Result<Vec<RawLocationRecord>, LocationError> {
        self.get_envelope("locations/districts", &[]).await
    }
}

/// True when the server would reject the term with a 400.
fn below_remote_threshold(term: &str) -> bool {
    term.chars().count() < MIN_REMOTE_SEARCH_CHARS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_threshold_counts_characters() {
        assert!(below_remote_threshold(""));
        assert!(below_remote_threshold("h"));
        assert!(below_remote_threshold("à"));
        assert!(!below_remote_threshold("hà"));
    }

    #[test]
    fn test_base_url_normalization() {
        let backend =
            HttpLocationBackend::with_timeout("http://localhost:3000/api", Duration::from_secs(5))
                .unwrap();
        let joined = backend.base_url.join("locations/popular").unwrap();
        assert_eq!(joined.as_str(), "http://localhost:3000/api/locations/popular");
    }
}
