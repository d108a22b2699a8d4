//! Service layer for location resolution.
//!
//! Services hold the subsystem's shared state and are constructed once,
//! then passed by reference to consumers.

pub mod debounce;
pub mod locations;
pub mod popular;

pub use debounce::DebouncedResolver;
pub use locations::{LoadSummary, LocationService};
pub use popular::PopularityProvider;
