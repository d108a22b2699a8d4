//! Error taxonomy for the location subsystem.
//!
//! None of these variants cross the public service boundary as errors:
//! entry points convert them into `ServiceResponse` envelopes or fallback
//! results. `Superseded` is silent by contract and is only ever logged at
//! debug level.

use thiserror::Error;

/// Errors raised by remote location operations.
#[derive(Debug, Error)]
pub enum LocationError {
    /// Transport-level failure (connect, timeout, body decode).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered but reported failure or returned a non-2xx
    /// status. Carries the server-provided message when there is one.
    #[error("{0}")]
    Remote(String),

    /// An endpoint URL could not be constructed from the configured base.
    #[error("invalid endpoint url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A newer operation in the same category superseded this one.
    /// Never surfaced to callers as an error.
    #[error("superseded by a newer request")]
    Superseded,
}

impl LocationError {
    /// True when this result must be discarded without committing state.
    pub fn is_superseded(&self) -> bool {
        matches!(self, Self::Superseded)
    }
}
