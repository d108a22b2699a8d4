//! Location service: reference data loading and suggestion resolution.
//!
//! Constructed once with its backend and handed to consumers by reference.
//! The reference dataset is loaded all-or-nothing, exactly once; until it is
//! available, suggestion resolution falls through to the remote search
//! endpoint and, past that, to a filter over the cached popular list.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::sync::Mutex as StdMutex;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::api::LocationBackend;
use crate::cancel::{CancelToken, CancellationRegistry, OperationCategory};
use crate::config::LocationsConfig;
use crate::error::LocationError;
use crate::index::ReferenceDataset;
use crate::models::{
    LocationEntry, LocationKind, ServiceResponse, SuggestionData, SuggestionSource,
};

use super::popular::PopularityProvider;

/// Counts committed by a successful reference load.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct LoadSummary {
    pub provinces: usize,
    pub districts: usize,
    pub total: usize,
}

/// Entry point for location autocompletion.
pub struct LocationService {
    backend: Arc<dyn LocationBackend>,
    config: LocationsConfig,
    registry: Arc<CancellationRegistry>,
    dataset: Arc<RwLock<ReferenceDataset>>,
    loaded: AtomicBool,
    loading: AtomicBool,
    last_load_error: StdMutex<Option<String>>,
    popular: PopularityProvider,
}

impl LocationService {
    pub fn new(backend: Arc<dyn LocationBackend>, config: LocationsConfig) -> Self {
        let registry = Arc::new(CancellationRegistry::new());
        let popular =
            PopularityProvider::new(backend.clone(), registry.clone(), config.popular_limit);
        Self {
            backend,
            config,
            registry,
            dataset: Arc::new(RwLock::new(ReferenceDataset::default())),
            loaded: AtomicBool::new(false),
            loading: AtomicBool::new(false),
            last_load_error: StdMutex::new(None),
            popular,
        }
    }

    /// Kick off the initial reference load. Mirrors mounting the provider in
    /// the client: call once at startup.
    pub async fn init(&self) -> ServiceResponse<LoadSummary> {
        self.load_all().await
    }

    /// Cancel every live operation. Call on teardown.
    pub fn dispose(&self) {
        debug!("disposing location service");
        self.registry.cancel_all();
    }

    pub fn config(&self) -> &LocationsConfig {
        &self.config
    }

    pub fn registry(&self) -> &CancellationRegistry {
        &self.registry
    }

    pub fn popular(&self) -> &PopularityProvider {
        &self.popular
    }

    /// Whether the local index is available.
    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    /// Error recorded by the most recent failed reference load.
    pub fn last_load_error(&self) -> Option<String> {
        self.last_load_error.lock().unwrap().clone()
    }

    /// Load the province and district reference datasets.
    ///
    /// Idempotent: a call while the dataset is loaded, or while another load
    /// is in flight, is a no-op; callers never trigger a second concurrent
    /// load. Both fetches must succeed for the dataset to be committed; a
    /// failure in either leaves it unloaded and records the error for
    /// inspection without raising it.
    pub async fn load_all(&self) -> ServiceResponse<LoadSummary> {
        if self.loaded.load(Ordering::Acquire) {
            return ServiceResponse::ok(self.summary().await);
        }
        if self
            .loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("reference load already in flight");
            return ServiceResponse::ok(LoadSummary::default());
        }

        let token = self.registry.begin(OperationCategory::AllLocations);
        let outcome = self.run_reference_load(&token).await;
        // In-flight flag cleared regardless of outcome.
        self.loading.store(false, Ordering::Release);

        match outcome {
            Ok(summary) => ServiceResponse::ok(summary),
            Err(err) if err.is_superseded() => {
                debug!("reference load superseded, leaving dataset unloaded");
                ServiceResponse::silent_failure(LoadSummary::default())
            }
            Err(err) => {
                let message = err.to_string();
                *self.last_load_error.lock().unwrap() = Some(message.clone());
                self.registry
                    .fail(OperationCategory::AllLocations, &token, message.clone());
                warn!(error = %err, "reference load failed, dataset stays unloaded");
                ServiceResponse::failure(message, LoadSummary::default())
            }
        }
    }

    async fn run_reference_load(&self, token: &CancelToken) -> Result<LoadSummary, LocationError> {
        debug!("loading province and district reference datasets");
        let (provinces, districts) = tokio::join!(
            self.backend.fetch_provinces(),
            self.backend.fetch_districts()
        );
        if token.is_cancelled() {
            return Err(LocationError::Superseded);
        }
        // Either failure fails the whole load; no partial commit.
        let provinces = provinces?;
        let districts = districts?;

        let provinces: Vec<LocationEntry> = provinces
            .iter()
            .map(|raw| LocationEntry::from_raw(LocationKind::Province, raw))
            .collect();
        let districts: Vec<LocationEntry> = districts
            .iter()
            .map(|raw| LocationEntry::from_raw(LocationKind::District, raw))
            .collect();

        let summary = LoadSummary {
            provinces: provinces.len(),
            districts: districts.len(),
            total: provinces.len() + districts.len(),
        };

        {
            let mut dataset = self.dataset.write().await;
            *dataset = ReferenceDataset::from_parts(provinces, districts);
        }
        self.loaded.store(true, Ordering::Release);
        *self.last_load_error.lock().unwrap() = None;
        self.registry.complete(OperationCategory::AllLocations, token);
        info!(
            provinces = summary.provinces,
            districts = summary.districts,
            total = summary.total,
            "loaded location reference datasets"
        );
        Ok(summary)
    }

    /// Resolve suggestions for a search term.
    ///
    /// Blank terms delegate to the popularity provider. With the reference
    /// dataset loaded, resolution is a synchronous local search and makes no
    /// network call. Otherwise the remote search endpoint is used; if that
    /// fails for any reason other than supersession, the cached popular list
    /// is filtered instead; this path never reports an error.
    pub async fn resolve(&self, term: &str, limit: usize) -> ServiceResponse<SuggestionData> {
        let trimmed = term.trim();
        if trimmed.is_empty() {
            return self.popular.get(limit).await;
        }

        if self.is_loaded() {
            let dataset = self.dataset.read().await;
            let suggestions = dataset.search(trimmed, limit);
            debug!(term = trimmed, hits = suggestions.len(), "resolved from local index");
            return ServiceResponse::ok(SuggestionData::new(
                Some(trimmed.to_string()),
                suggestions,
                SuggestionSource::Local,
            ));
        }

        let token = self.registry.begin(OperationCategory::Search);
        match self.backend.search(trimmed, limit).await {
            Ok(_) if token.is_cancelled() => {
                debug!(term = trimmed, "search superseded, response discarded");
                ServiceResponse::ok(SuggestionData::superseded(trimmed))
            }
            Ok(buckets) => {
                self.registry.complete(OperationCategory::Search, &token);
                let mut suggestions: Vec<LocationEntry> = Vec::with_capacity(
                    buckets.provinces.len() + buckets.districts.len(),
                );
                suggestions.extend(
                    buckets
                        .provinces
                        .iter()
                        .map(|raw| LocationEntry::from_raw(LocationKind::Province, raw)),
                );
                suggestions.extend(
                    buckets
                        .districts
                        .iter()
                        .map(|raw| LocationEntry::from_raw(LocationKind::District, raw)),
                );
                suggestions.truncate(limit);
                ServiceResponse::ok(SuggestionData::new(
                    Some(trimmed.to_string()),
                    suggestions,
                    SuggestionSource::Remote,
                ))
            }
            Err(_) if token.is_cancelled() => {
                debug!(term = trimmed, "superseded search failed, ignoring");
                ServiceResponse::ok(SuggestionData::superseded(trimmed))
            }
            Err(err) => {
                self.registry
                    .fail(OperationCategory::Search, &token, err.to_string());
                warn!(
                    error = %err,
                    term = trimmed,
                    "remote search failed, filtering cached popular locations"
                );
                let suggestions = self.filter_popular(trimmed, limit).await;
                ServiceResponse::ok(SuggestionData::new(
                    Some(trimmed.to_string()),
                    suggestions,
                    SuggestionSource::Fallback,
                ))
            }
        }
    }

    /// Popular locations, served through the provider's cache.
    pub async fn get_popular(&self, limit: usize) -> ServiceResponse<SuggestionData> {
        self.popular.get(limit).await
    }

    /// Resolve with the configured default suggestion limit.
    pub async fn suggest(&self, term: &str) -> ServiceResponse<SuggestionData> {
        self.resolve(term, self.config.suggestion_limit).await
    }

    /// Case-insensitive substring filter over the cached popular list.
    async fn filter_popular(&self, term: &str, limit: usize) -> Vec<LocationEntry> {
        let needle = term.to_lowercase();
        self.popular
            .cached_snapshot()
            .await
            .into_iter()
            .filter(|entry| {
                entry.name.to_lowercase().contains(&needle)
                    || entry.display_text.to_lowercase().contains(&needle)
            })
            .take(limit)
            .collect()
    }

    async fn summary(&self) -> LoadSummary {
        let dataset = self.dataset.read().await;
        LoadSummary {
            provinces: dataset.provinces.len(),
            districts: dataset.districts.len(),
            total: dataset.all.len(),
        }
    }
}
