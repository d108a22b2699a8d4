//! Cache-augmented access to the popular-locations list.
//!
//! Concurrent callers share a single in-flight fetch: the first miss
//! installs a shared future in the flight slot and everyone else awaits the
//! same future. The slot is cleared in the fetch's own cleanup step whether
//! it succeeded or failed, so the wait is always bounded and a failed fetch
//! is never served to later callers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::api::LocationBackend;
use crate::cancel::{CancellationRegistry, OperationCategory};
use crate::error::LocationError;
use crate::models::{LocationEntry, ServiceResponse, SuggestionData, SuggestionSource};

type FlightResult = Result<Vec<LocationEntry>, Arc<LocationError>>;
type Flight = Shared<BoxFuture<'static, FlightResult>>;

/// Provider of the top-N frequently used locations.
pub struct PopularityProvider {
    backend: Arc<dyn LocationBackend>,
    registry: Arc<CancellationRegistry>,
    store: Arc<RwLock<Vec<LocationEntry>>>,
    initialized: Arc<AtomicBool>,
    flight: Arc<Mutex<Option<Flight>>>,
    /// Minimum count requested from the endpoint on a miss, so small UI
    /// requests still warm a usefully sized cache.
    fetch_floor: usize,
}

impl PopularityProvider {
    pub fn new(
        backend: Arc<dyn LocationBackend>,
        registry: Arc<CancellationRegistry>,
        fetch_floor: usize,
    ) -> Self {
        Self {
            backend,
            registry,
            store: Arc::new(RwLock::new(Vec::new())),
            initialized: Arc::new(AtomicBool::new(false)),
            flight: Arc::new(Mutex::new(None)),
            fetch_floor,
        }
    }

    /// Whether a popular set has been fetched and committed.
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Current cached popular list; used by the resolver's fallback filter.
    pub async fn cached_snapshot(&self) -> Vec<LocationEntry> {
        self.store.read().await.clone()
    }

    /// The first `limit` popular locations.
    ///
    /// Served from cache when the committed set is large enough; otherwise
    /// joins or starts the single in-flight fetch. Cancellation or failure
    /// yields an empty `success: false` response and leaves the provider
    /// uninitialized so a later call retries.
    pub async fn get(&self, limit: usize) -> ServiceResponse<SuggestionData> {
        if self.initialized.load(Ordering::Acquire) {
            let store = self.store.read().await;
            if store.len() >= limit {
                debug!(cached = store.len(), limit, "serving popular locations from cache");
                let suggestions = store.iter().take(limit).cloned().collect();
                return ServiceResponse::ok(SuggestionData::new(
                    None,
                    suggestions,
                    SuggestionSource::Fallback,
                ));
            }
        }

        let flight = {
            let mut slot = self.flight.lock().await;
            match slot.as_ref() {
                Some(flight) => {
                    debug!("joining in-flight popular locations fetch");
                    flight.clone()
                }
                None => {
                    let flight = self.start_fetch(limit.max(self.fetch_floor));
                    *slot = Some(flight.clone());
                    flight
                }
            }
        };

        match flight.await {
            Ok(entries) => {
                let suggestions = entries.into_iter().take(limit).collect();
                ServiceResponse::ok(SuggestionData::new(
                    None,
                    suggestions,
                    SuggestionSource::Fallback,
                ))
            }
            Err(err) if err.is_superseded() => {
                debug!("popular locations fetch superseded");
                ServiceResponse::silent_failure(SuggestionData::default())
            }
            Err(err) => ServiceResponse::failure(err.to_string(), SuggestionData::default()),
        }
    }

    fn start_fetch(&self, limit: usize) -> Flight {
        let backend = self.backend.clone();
        let registry = self.registry.clone();
        let store = self.store.clone();
        let initialized = self.initialized.clone();
        let slot = self.flight.clone();

        async move {
            let token = registry.begin(OperationCategory::PopularLocations);
            debug!(limit, "fetching popular locations");

            let result: FlightResult = match backend.fetch_popular(limit).await {
                Ok(_) if token.is_cancelled() => {
                    debug!("discarding superseded popular locations response");
                    Err(Arc::new(LocationError::Superseded))
                }
                Ok(raw) => {
                    let entries: Vec<LocationEntry> =
                        raw.iter().map(LocationEntry::from_record).collect();
                    {
                        let mut store = store.write().await;
                        *store = entries.clone();
                    }
                    initialized.store(true, Ordering::Release);
                    registry.complete(OperationCategory::PopularLocations, &token);
                    info!(count = entries.len(), "loaded popular locations");
                    Ok(entries)
                }
                Err(_) if token.is_cancelled() => {
                    debug!("superseded popular locations fetch failed, ignoring");
                    Err(Arc::new(LocationError::Superseded))
                }
                Err(err) => {
                    registry.fail(OperationCategory::PopularLocations, &token, err.to_string());
                    warn!(error = %err, "failed to fetch popular locations");
                    Err(Arc::new(err))
                }
            };

            // Flight slot cleared regardless of outcome.
            slot.lock().await.take();
            result
        }
        .boxed()
        .shared()
    }
}
