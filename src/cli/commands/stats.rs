//! Stats command.

use std::collections::HashSet;

use console::style;

use crate::config::Config;
use crate::repository::{RecordCache, SqliteRecordCache};

/// Show what the cache holds.
pub fn cmd_stats(config: &Config) -> anyhow::Result<()> {
    if !config.cache_path.exists() {
        println!(
            "{} No cache at {}",
            style("!").yellow(),
            config.cache_path.display()
        );
        return Ok(());
    }

    let cache = SqliteRecordCache::new(&config.cache_path)?;
    let records = cache.records()?;

    println!("\n{}", style("Cache Statistics").bold());
    println!("{}", "-".repeat(40));
    println!("{:<16} {}", "Database:", config.cache_path.display());
    println!("{:<16} {}", "Records:", records.len());

    let organizations: HashSet<&str> = records
        .iter()
        .map(|c| c.record.organization())
        .collect();
    println!("{:<16} {}", "Organizations:", organizations.len());

    let timestamps = || records.iter().map(|c| c.record.timestamp());
    if let (Some(oldest), Some(newest)) = (timestamps().min(), timestamps().max()) {
        println!("{:<16} {}", "Oldest event:", oldest.format("%Y-%m-%d %H:%M"));
        println!("{:<16} {}", "Newest event:", newest.format("%Y-%m-%d %H:%M"));
    }

    match cache.latest_cached_at()? {
        Some(at) => println!(
            "{:<16} {}",
            "Last cached:",
            at.format("%Y-%m-%d %H:%M:%S UTC")
        ),
        None => println!("{:<16} {}", "Last cached:", style("never").dim()),
    }
    Ok(())
}
