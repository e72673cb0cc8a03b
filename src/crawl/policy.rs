//! What the crawl does on meeting a record that is already cached.

use crate::models::ContentHash;

/// Decision for an already cached record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeenAction {
    /// End the crawl immediately.
    Stop,
    /// Ignore the record and carry on.
    Skip,
}

pub trait TerminationPolicy: Send + Sync {
    fn on_seen(&self, hash: &ContentHash) -> SeenAction;

    fn name(&self) -> &'static str;
}

/// Stop at the first cached record.
///
/// Listings are newest first, so everything after a cached record is assumed
/// to be cached too. Older records that show up late are never picked up by
/// this policy; [`ExhaustPages`] covers them.
#[derive(Debug, Clone, Copy, Default)]
pub struct StopAtFirstSeen;

impl TerminationPolicy for StopAtFirstSeen {
    fn on_seen(&self, _hash: &ContentHash) -> SeenAction {
        SeenAction::Stop
    }

    fn name(&self) -> &'static str {
        "stop-at-first-seen"
    }
}

/// Walk the whole result set, skipping cached records.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExhaustPages;

impl TerminationPolicy for ExhaustPages {
    fn on_seen(&self, _hash: &ContentHash) -> SeenAction {
        SeenAction::Skip
    }

    fn name(&self) -> &'static str {
        "exhaust-pages"
    }
}
