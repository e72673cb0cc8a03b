//! Domain models for harvested disclosure events.

mod hash;
mod listing;

pub use hash::ContentHash;
pub use listing::{EnrichedRecord, ListingRecord};
