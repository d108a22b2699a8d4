//! Configuration for the location subsystem.
//!
//! Loaded from TOML with per-field defaults, so a partial file (or none at
//! all) yields a working configuration pointed at the local API.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Default quiescence window between keystrokes and a resolve call (ms).
pub const DEFAULT_DEBOUNCE_MS: u64 = 200;

/// Default per-request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Default number of suggestions returned by a resolve call.
pub const DEFAULT_SUGGESTION_LIMIT: usize = 10;

/// Default number of popular locations fetched on a cache miss.
pub const DEFAULT_POPULAR_LIMIT: usize = 20;

/// Runtime configuration for [`LocationService`](crate::LocationService).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationsConfig {
    /// Base URL of the marketplace API, e.g. `http://localhost:3000/api`.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Quiescence window applied by the debounced resolver (ms).
    pub debounce_ms: u64,
    /// Default number of suggestions returned by resolve.
    pub suggestion_limit: usize,
    /// Default number of popular locations fetched on a cache miss.
    pub popular_limit: usize,
}

impl Default for LocationsConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api".to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
            popular_limit: DEFAULT_POPULAR_LIMIT,
        }
    }
}

impl LocationsConfig {
    /// Per-request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Debounce window as a [`Duration`].
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Load configuration from a TOML file.
    pub fn from_toml_path(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config = toml::from_str(&raw)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LocationsConfig::default();
        assert_eq!(config.debounce(), Duration::from_millis(200));
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.suggestion_limit, 10);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: LocationsConfig =
            toml::from_str("base_url = \"https://api.roombid.vn/api\"\ndebounce_ms = 150")
                .unwrap();
        assert_eq!(config.base_url, "https://api.roombid.vn/api");
        assert_eq!(config.debounce_ms, 150);
        assert_eq!(config.popular_limit, DEFAULT_POPULAR_LIMIT);
    }
}
