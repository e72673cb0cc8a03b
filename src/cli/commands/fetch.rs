//! Fetch command.

use std::path::PathBuf;

use anyhow::Context;
use console::style;

use crate::config::Config;
use crate::crawl::{Crawler, ExhaustPages};
use crate::repository::SqliteRecordCache;
use crate::scrapers::{PortalSessionProvider, SessionProvider};
use crate::utils::DateRange;

/// Fetch and cache events posted in the last `days` days.
pub async fn cmd_fetch(
    config: &Config,
    days: u32,
    full: bool,
    max_pages: Option<u32>,
    save_cookies: Option<PathBuf>,
) -> anyhow::Result<()> {
    let cache = SqliteRecordCache::new(&config.cache_path)
        .with_context(|| format!("Failed to open cache {}", config.cache_path.display()))?;

    let provider = PortalSessionProvider::from_config(config, save_cookies)?;
    let session = provider
        .acquire_session()
        .await
        .context("Failed to start a portal session")?;

    let mut settings = config.crawl.clone();
    if let Some(limit) = max_pages {
        settings.max_pages = limit;
    }
    let mut crawler = Crawler::new(config.portal.clone(), config.search.clone(), settings);
    if full {
        crawler = crawler.with_policy(ExhaustPages);
    }

    let range = DateRange::ending_today(days);
    println!(
        "{} Fetching events from {} to {}",
        style("→").cyan(),
        range.start_param(),
        range.finish_param()
    );

    let outcome = crawler
        .run(&session, &cache, &range)
        .await
        .context("Crawl aborted")?;

    println!("Cached {} new records.", outcome.inserted);
    println!(
        "  {}",
        style(format!(
            "{} pages, {} skipped, {}",
            outcome.pages, outcome.skipped, outcome.stop_reason
        ))
        .dim()
    );
    Ok(())
}
