//! Debounced suggestion resolution.
//!
//! Each keystroke submits a cancellable delayed task: the task waits out the
//! quiescence window, then resolves and delivers its response, unless a
//! newer submission superseded it at any point. Combined with the search
//! category's latest-request-wins token, only the newest term's suggestions
//! are ever delivered.

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::debug;

use crate::cancel::CancelToken;
use crate::models::{ServiceResponse, SuggestionData};

use super::locations::LocationService;

/// Debounce front-end over [`LocationService::resolve`].
pub struct DebouncedResolver {
    service: Arc<LocationService>,
    delay: Duration,
    current: Mutex<Option<CancelToken>>,
}

impl DebouncedResolver {
    /// Create a resolver using the service's configured debounce window.
    pub fn new(service: Arc<LocationService>) -> Self {
        let delay = service.config().debounce();
        Self::with_delay(service, delay)
    }

    pub fn with_delay(service: Arc<LocationService>, delay: Duration) -> Self {
        Self {
            service,
            delay,
            current: Mutex::new(None),
        }
    }

    /// Submit a keystroke. Supersedes any pending or in-flight submission;
    /// the response is sent on `tx` only if this submission is still the
    /// newest when it completes.
    pub fn submit(
        &self,
        term: impl Into<String>,
        limit: usize,
        tx: mpsc::Sender<ServiceResponse<SuggestionData>>,
    ) {
        let term = term.into();
        let token = {
            let mut current = self.current.lock().unwrap();
            if let Some(previous) = current.take() {
                previous.cancel();
            }
            let token = CancelToken::new();
            *current = Some(token.clone());
            token
        };

        let service = self.service.clone();
        let delay = self.delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if token.is_cancelled() {
                debug!(term = %term, "debounced resolve superseded before firing");
                return;
            }

            let response = service.resolve(&term, limit).await;

            if token.is_cancelled() {
                debug!(term = %term, "debounced resolve superseded mid-flight, dropping response");
                return;
            }
            let _ = tx.send(response).await;
        });
    }

    /// Cancel the pending submission, if any, without replacing it.
    pub fn cancel_pending(&self) {
        if let Some(token) = self.current.lock().unwrap().take() {
            token.cancel();
        }
    }
}
