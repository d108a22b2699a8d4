//! Uniform response envelope returned by every public entry point.
//!
//! Nothing is thrown past the service boundary: failures become
//! `success: false` with a message, supersession becomes an empty
//! non-committing payload.

use serde::{Deserialize, Serialize};

use super::location::LocationEntry;

/// Where a set of suggestions came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionSource {
    /// The in-memory reference index.
    Local,
    /// The remote search endpoint.
    Remote,
    /// The cached popular-locations list.
    Fallback,
}

/// Envelope shared by all public operations.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
}

impl<T> ServiceResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data,
        }
    }

    pub fn failure(message: impl Into<String>, data: T) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data,
        }
    }

    /// Failure with no message: used for superseded operations, which are
    /// never surfaced as errors.
    pub fn silent_failure(data: T) -> Self {
        Self {
            success: false,
            message: None,
            data,
        }
    }
}

/// Suggestion payload of a resolve or popular-locations call.
///
/// A payload with no `source` and no suggestions is non-committing: the
/// operation that produced it was superseded and its result must not be
/// applied to visible state.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_term: Option<String>,
    pub suggestions: Vec<LocationEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SuggestionSource>,
}

impl SuggestionData {
    pub fn new(
        search_term: Option<String>,
        suggestions: Vec<LocationEntry>,
        source: SuggestionSource,
    ) -> Self {
        Self {
            search_term,
            suggestions,
            source: Some(source),
        }
    }

    /// Empty non-committing payload for a superseded operation.
    pub fn superseded(search_term: impl Into<String>) -> Self {
        Self {
            search_term: Some(search_term.into()),
            suggestions: Vec::new(),
            source: None,
        }
    }
}
