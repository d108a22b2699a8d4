//! Location resolution and search-result caching for the RoomBid
//! marketplace client.
//!
//! The subsystem keeps a client-side index of administrative regions
//! (provinces and districts) for search-as-you-type autocompletion, plus a
//! fingerprint-keyed cache that memoizes the image/review enrichment of
//! paginated search results. Remote calls are coordinated through
//! per-category cancellation tokens so stale responses never overwrite
//! fresher ones.

pub mod api;
pub mod cache;
pub mod cancel;
pub mod config;
pub mod error;
pub mod index;
pub mod models;
pub mod services;

pub use crate::api::{HttpLocationBackend, LocationBackend, SearchBuckets};
pub use crate::cache::{auction_cache_key, filter_fingerprint, room_cache_key, SearchCache};
pub use crate::cancel::{CancelToken, CancellationRegistry, OperationCategory, OperationState};
pub use crate::config::LocationsConfig;
pub use crate::error::LocationError;
pub use crate::index::ReferenceDataset;
pub use crate::models::{
    LocationEntry, LocationKind, RawLocationRecord, ServiceResponse, SuggestionData,
    SuggestionSource,
};
pub use crate::services::{DebouncedResolver, LoadSummary, LocationService, PopularityProvider};
