//! Per-category cooperative cancellation.
//!
//! Each logical operation category has at most one live token at a time:
//! beginning a new operation cancels the previous token before issuing a
//! fresh one. Handlers check their token after every awaited network call
//! and return without side effects once superseded.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::debug;

/// Logical operation categories, one cancellation slot each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationCategory {
    PopularLocations,
    AllLocations,
    Search,
}

impl OperationCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PopularLocations => "popular_locations",
            Self::AllLocations => "all_locations",
            Self::Search => "search",
        }
    }
}

/// Cloneable cancellation handle for one operation.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once a newer operation has superseded this one.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Whether two handles belong to the same operation.
    fn same_operation(&self, other: &CancelToken) -> bool {
        Arc::ptr_eq(&self.cancelled, &other.cancelled)
    }
}

/// Lifecycle of one category's current operation.
///
/// `Cancelled` and `Failed` are terminal and non-committing; only a
/// `Completed` operation has updated externally visible state.
#[derive(Debug, Clone, Default)]
pub enum OperationState {
    #[default]
    Idle,
    InFlight(CancelToken),
    Completed,
    Cancelled,
    Failed(String),
}

impl OperationState {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::InFlight(_))
    }
}

/// Registry holding the current operation state per category.
#[derive(Debug, Default)]
pub struct CancellationRegistry {
    states: Mutex<HashMap<OperationCategory, OperationState>>,
}

impl CancellationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a new operation: the previous live token in `category`, if
    /// any, is cancelled before the replacement is stored and returned.
    pub fn begin(&self, category: OperationCategory) -> CancelToken {
        let mut states = self.states.lock().unwrap();
        let slot = states.entry(category).or_default();
        if let OperationState::InFlight(previous) = slot {
            debug!(category = category.as_str(), "superseding in-flight operation");
            previous.cancel();
        }
        let token = CancelToken::new();
        *slot = OperationState::InFlight(token.clone());
        token
    }

    /// Mark the operation as committed. No-op unless `token` is still the
    /// category's current one.
    pub fn complete(&self, category: OperationCategory, token: &CancelToken) {
        self.transition(category, token, OperationState::Completed);
    }

    /// Mark the operation as failed. No-op unless `token` is still current.
    pub fn fail(&self, category: OperationCategory, token: &CancelToken, message: impl Into<String>) {
        self.transition(category, token, OperationState::Failed(message.into()));
    }

    /// Cancel every live token; used on service teardown.
    pub fn cancel_all(&self) {
        let mut states = self.states.lock().unwrap();
        for (category, slot) in states.iter_mut() {
            if let OperationState::InFlight(token) = slot {
                debug!(category = category.as_str(), "cancelling operation on teardown");
                token.cancel();
                *slot = OperationState::Cancelled;
            }
        }
    }

    pub fn is_in_flight(&self, category: OperationCategory) -> bool {
        self.state(category).is_in_flight()
    }

    /// Snapshot of the category's current state.
    pub fn state(&self, category: OperationCategory) -> OperationState {
        self.states
            .lock()
            .unwrap()
            .get(&category)
            .cloned()
            .unwrap_or_default()
    }

    fn transition(&self, category: OperationCategory, token: &CancelToken, next: OperationState) {
        let mut states = self.states.lock().unwrap();
        if let Some(slot) = states.get_mut(&category) {
            if let OperationState::InFlight(current) = slot {
                if current.same_operation(token) {
                    *slot = next;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_supersedes_previous_token() {
        let registry = CancellationRegistry::new();
        let first = registry.begin(OperationCategory::Search);
        assert!(!first.is_cancelled());

        let second = registry.begin(OperationCategory::Search);
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        assert!(registry.is_in_flight(OperationCategory::Search));
    }

    #[test]
    fn test_categories_are_independent() {
        let registry = CancellationRegistry::new();
        let search = registry.begin(OperationCategory::Search);
        let popular = registry.begin(OperationCategory::PopularLocations);
        assert!(!search.is_cancelled());
        assert!(!popular.is_cancelled());
    }

    #[test]
    fn test_stale_token_cannot_transition() {
        let registry = CancellationRegistry::new();
        let stale = registry.begin(OperationCategory::AllLocations);
        let current = registry.begin(OperationCategory::AllLocations);

        registry.complete(OperationCategory::AllLocations, &stale);
        assert!(registry.is_in_flight(OperationCategory::AllLocations));

        registry.complete(OperationCategory::AllLocations, &current);
        assert!(matches!(
            registry.state(OperationCategory::AllLocations),
            OperationState::Completed
        ));
    }

    #[test]
    fn test_failed_is_terminal_with_message() {
        let registry = CancellationRegistry::new();
        let token = registry.begin(OperationCategory::Search);
        registry.fail(OperationCategory::Search, &token, "boom");
        match registry.state(OperationCategory::Search) {
            OperationState::Failed(message) => assert_eq!(message, "boom"),
            other => panic!("unexpected state: {:?}", other),
        }
    }

    #[test]
    fn test_cancel_all_marks_live_operations_cancelled() {
        let registry = CancellationRegistry::new();
        let search = registry.begin(OperationCategory::Search);
        let load = registry.begin(OperationCategory::AllLocations);

        registry.cancel_all();
        assert!(search.is_cancelled());
        assert!(load.is_cancelled());
        assert!(matches!(
            registry.state(OperationCategory::Search),
            OperationState::Cancelled
        ));
    }
}
