//! Report command.

use std::path::PathBuf;

use anyhow::Context;
use console::style;

use crate::config::Config;
use crate::report::{render_reports, ReportFilter};
use crate::repository::SqliteRecordCache;

/// Write matching cached events to report files.
pub fn cmd_report(
    config: &Config,
    org: &[String],
    summary: &[String],
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let cache = SqliteRecordCache::new(&config.cache_path)
        .with_context(|| format!("Failed to open cache {}", config.cache_path.display()))?;
    let base = output.unwrap_or_else(|| config.reports_dir.clone());
    let filter = ReportFilter::new(org, summary);

    let paths = render_reports(&cache, &filter, &base)?;
    for path in &paths {
        println!("Saved \"{}\".", path.display());
    }

    if paths.is_empty() {
        println!("{} No matching records", style("!").yellow());
    } else {
        println!(
            "{} Wrote {} reports to {}",
            style("✓").green(),
            paths.len(),
            base.display()
        );
    }
    Ok(())
}
