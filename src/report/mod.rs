//! Report files rendered from cached records.
//!
//! One UTF-8 text file per record, at
//! `<base>/<YYYY-MM-DD>/<title-slug>-<summary-hash>.txt`. Files are rewritten
//! on every run.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::models::{ContentHash, EnrichedRecord};
use crate::repository::{CacheError, RecordCache};
use crate::utils::{slugify_words, strip_blank_lines};

/// Title words kept in a report file name.
pub const SLUG_WORDS: usize = 4;

/// Hex digits of the summary hash appended to a report file name.
pub const SHORT_HASH_LEN: usize = 6;

const REPORT_DATE_FORMAT: &str = "%Y-%m-%d";
const REPORT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Case-insensitive substring filters on organization and summary.
///
/// Within one list any term may match; both lists must be satisfied. An
/// empty list matches everything.
#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    organizations: Vec<String>,
    summaries: Vec<String>,
}

impl ReportFilter {
    pub fn new<O, S>(organizations: O, summaries: S) -> Self
    where
        O: IntoIterator,
        O::Item: AsRef<str>,
        S: IntoIterator,
        S::Item: AsRef<str>,
    {
        Self {
            organizations: lowercase_terms(organizations),
            summaries: lowercase_terms(summaries),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.organizations.is_empty() && self.summaries.is_empty()
    }

    pub fn matches(&self, record: &EnrichedRecord) -> bool {
        includes(record.organization(), &self.organizations)
            && includes(&record.summary, &self.summaries)
    }
}

fn lowercase_terms<I>(terms: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    terms
        .into_iter()
        .map(|t| t.as_ref().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// `terms` must already be lower-cased.
fn includes(text: &str, terms: &[String]) -> bool {
    if terms.is_empty() {
        return true;
    }
    let text = text.to_lowercase();
    terms.iter().any(|term| text.contains(term.as_str()))
}

/// Where the report for `record` goes under `base`.
pub fn report_path(base: &Path, record: &EnrichedRecord) -> PathBuf {
    let date = record.timestamp().format(REPORT_DATE_FORMAT).to_string();
    let mut slug = slugify_words(record.title(), SLUG_WORDS);
    if slug.is_empty() {
        slug = "untitled".to_string();
    }
    let hash = ContentHash::of_text(&record.summary);
    base.join(date)
        .join(format!("{}-{}.txt", slug, hash.prefix(SHORT_HASH_LEN)))
}

/// Report file body.
pub fn render_article(record: &EnrichedRecord) -> String {
    format!(
        "\n[{}]\n\"{}\"\n---\n{}\n---\n{}\n---\n",
        record.timestamp().format(REPORT_TIMESTAMP_FORMAT),
        record.organization(),
        record.title(),
        strip_blank_lines(&record.summary),
    )
}

/// Write one report file, creating its date directory.
pub fn write_report(base: &Path, record: &EnrichedRecord) -> Result<PathBuf, ReportError> {
    let path = report_path(base, record);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|source| ReportError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    fs::write(&path, render_article(record)).map_err(|source| ReportError::Io {
        path: path.clone(),
        source,
    })?;
    debug!("Wrote {}", path.display());
    Ok(path)
}

/// Render every cached record accepted by `filter` into `base`.
///
/// Returns the written paths in cache order.
pub fn render_reports<C>(
    cache: &C,
    filter: &ReportFilter,
    base: &Path,
) -> Result<Vec<PathBuf>, ReportError>
where
    C: RecordCache + ?Sized,
{
    let cached = cache.records()?;
    let total = cached.len();

    let paths = cached
        .iter()
        .filter(|c| filter.matches(&c.record))
        .map(|c| write_report(base, &c.record))
        .collect::<Result<Vec<_>, _>>()?;

    info!(
        "Rendered {} of {} cached records into {}",
        paths.len(),
        total,
        base.display()
    );
    Ok(paths)
}
