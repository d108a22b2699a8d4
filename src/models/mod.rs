//! Data models for the location subsystem.

mod location;
mod response;

pub use location::{LocationEntry, LocationKind, RawLocationRecord};
pub use response::{ServiceResponse, SuggestionData, SuggestionSource};
