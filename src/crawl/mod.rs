//! Incremental crawl of the portal's search results.
//!
//! Pages are fetched one at a time starting at 1. Each page is parsed,
//! deduplicated and enriched: records not yet cached get their detail page
//! fetched. Only then are the page's records written to the cache in order,
//! and a record that was already cached is handed to the
//! [`TerminationPolicy`]. A page without records ends the crawl.

mod dedup;
mod policy;

pub use dedup::{dedupe, Dedup};
pub use policy::{ExhaustPages, SeenAction, StopAtFirstSeen, TerminationPolicy};

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::models::{ContentHash, EnrichedRecord, ListingRecord};
use crate::repository::{CacheError, RecordCache};
use crate::scrapers::{
    fetch_detail, fetch_page, ListingPage, ParseError, PortalConfig, PortalTransport,
    ScrapeError, SearchConfig, TransportError,
};
use crate::utils::DateRange;

/// Crawl cadence and limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Pause between result pages, in milliseconds.
    pub page_delay_ms: u64,
    /// Stop after this many pages (0 = no limit).
    pub max_pages: u32,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            page_delay_ms: 1000,
            max_pages: 0,
        }
    }
}

/// Errors that abort a crawl.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl From<ScrapeError> for CrawlError {
    fn from(e: ScrapeError) -> Self {
        match e {
            ScrapeError::Transport(e) => Self::Transport(e),
            ScrapeError::Parse(e) => Self::Parse(e),
        }
    }
}

/// Why the crawl ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A page came back without records.
    EmptyPage,
    /// The termination policy stopped at an already cached record.
    AlreadyCached,
    /// The configured page limit was reached.
    PageLimit,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPage => write!(f, "result set exhausted"),
            Self::AlreadyCached => write!(f, "reached already cached records"),
            Self::PageLimit => write!(f, "page limit reached"),
        }
    }
}

/// Summary of a finished crawl.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlOutcome {
    /// Records newly written to the cache.
    pub inserted: usize,
    /// Already cached records passed over by the policy.
    pub skipped: usize,
    /// Result pages fetched.
    pub pages: u32,
    pub stop_reason: StopReason,
}

/// A page record ready to be committed to the cache.
enum PageEntry {
    /// Already cached when the page was enriched.
    Seen(ContentHash),
    Fresh(ContentHash, EnrichedRecord),
}

/// Drives one crawl run.
pub struct Crawler {
    portal: PortalConfig,
    search: SearchConfig,
    settings: CrawlConfig,
    policy: Box<dyn TerminationPolicy>,
}

impl Crawler {
    /// Crawler with the default [`StopAtFirstSeen`] policy.
    pub fn new(portal: PortalConfig, search: SearchConfig, settings: CrawlConfig) -> Self {
        Self {
            portal,
            search,
            settings,
            policy: Box::new(StopAtFirstSeen),
        }
    }

    pub fn with_policy(mut self, policy: impl TerminationPolicy + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    /// Crawl `range` until the policy, an empty page or the page limit stops
    /// it.
    ///
    /// A failure leaves the cache as it was before the failing page, so a
    /// failed run can simply be repeated.
    pub async fn run<T, C>(
        &self,
        transport: &T,
        cache: &C,
        range: &DateRange,
    ) -> Result<CrawlOutcome, CrawlError>
    where
        T: PortalTransport + ?Sized,
        C: RecordCache + ?Sized,
    {
        let base_url =
            Url::parse(&self.portal.home_url).map_err(|e| TransportError::InvalidUrl {
                url: self.portal.home_url.clone(),
                reason: e.to_string(),
            })?;

        info!(
            "Crawling {} - {} ({})",
            range.start_param(),
            range.finish_param(),
            self.policy.name()
        );

        let mut inserted = 0;
        let mut skipped = 0;
        let mut page_number: u32 = 1;

        let stop_reason = 'pages: loop {
            let html = fetch_page(transport, &self.portal, &self.search, page_number, range).await?;
            let records = self.page_records(&html, &base_url, page_number)?;

            if records.is_empty() {
                info!("Page {} has no records", page_number);
                break 'pages StopReason::EmptyPage;
            }
            info!("Page {}: {} records", page_number, records.len());

            // Nothing from this page is written until every detail fetch
            // on it has succeeded.
            let entries = self.enrich_page(transport, cache, records).await?;

            for entry in entries {
                let (hash, existed) = match entry {
                    PageEntry::Seen(hash) => (hash, true),
                    PageEntry::Fresh(hash, enriched) => {
                        let existed = cache.put_if_absent(&hash, &enriched)?;
                        if !existed {
                            inserted += 1;
                            info!("Cached [{}] {}", hash.prefix(8), enriched.title());
                        }
                        (hash, existed)
                    }
                };

                if existed {
                    match self.policy.on_seen(&hash) {
                        SeenAction::Stop => {
                            info!("Record {} already cached, stopping", hash.prefix(8));
                            break 'pages StopReason::AlreadyCached;
                        }
                        SeenAction::Skip => {
                            debug!("Record {} already cached, skipping", hash.prefix(8));
                            skipped += 1;
                        }
                    }
                }
            }

            if self.settings.max_pages > 0 && page_number >= self.settings.max_pages {
                info!("Stopping after {} pages", page_number);
                break 'pages StopReason::PageLimit;
            }

            if self.settings.page_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.settings.page_delay_ms)).await;
            }
            page_number += 1;
        };

        Ok(CrawlOutcome {
            inserted,
            skipped,
            pages: page_number,
            stop_reason,
        })
    }

    /// Fetch the detail of every uncached record on a page, in page order.
    ///
    /// Cached records are only marked as seen. When the policy would stop at
    /// one, the records after it are left out.
    async fn enrich_page<T, C>(
        &self,
        transport: &T,
        cache: &C,
        records: Vec<ListingRecord>,
    ) -> Result<Vec<PageEntry>, CrawlError>
    where
        T: PortalTransport + ?Sized,
        C: RecordCache + ?Sized,
    {
        let mut entries = Vec::with_capacity(records.len());
        for record in records {
            let hash = record.content_hash();
            if cache.has(&hash)? {
                let stops = self.policy.on_seen(&hash) == SeenAction::Stop;
                entries.push(PageEntry::Seen(hash));
                if stops {
                    break;
                }
                continue;
            }
            let enriched = fetch_detail(transport, &self.portal, record).await?;
            entries.push(PageEntry::Fresh(hash, enriched));
        }
        Ok(entries)
    }

    /// Parse and dedupe one page.
    ///
    /// Kept synchronous: the parsed document must not live across an await.
    fn page_records(
        &self,
        html: &str,
        base_url: &Url,
        page_number: u32,
    ) -> Result<Vec<ListingRecord>, ParseError> {
        let page = ListingPage::parse(html)?;
        let rows = page
            .records(base_url, &self.portal.id_param)
            .collect::<Result<Vec<_>, _>>()?;

        let total = rows.len();
        let records: Vec<ListingRecord> = dedupe(rows).collect();
        if records.len() < total {
            warn!(
                "Page {} repeated {} records",
                page_number,
                total - records.len()
            );
        }
        Ok(records)
    }
}
