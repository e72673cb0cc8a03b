//! Error types for portal access and page parsing.

use thiserror::Error;

/// Failure to talk to the portal (HTTP or browser).
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },
    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("Browser error: {0}")]
    Browser(String),
    #[error("Cookies file {path}: {reason}")]
    Cookies { path: String, reason: String },
}

/// Markup that does not have the expected shape.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("row {row}: expected at least 2 cells, found {found}")]
    MissingCells { row: usize, found: usize },
    #[error("row {row}: expected organization and title links, found {found}")]
    MissingAnchors { row: usize, found: usize },
    #[error("row {row}: title link has no href")]
    MissingHref { row: usize },
    #[error("row {row}: unrecognized timestamp {value:?}")]
    BadTimestamp { row: usize, value: String },
    #[error("row {row}: cannot resolve detail link {href:?}")]
    BadDetailUrl { row: usize, href: String },
    #[error("content region {selector:?} not found on {url}")]
    MissingContent { url: String, selector: String },
    #[error("invalid CSS selector {selector:?}")]
    Selector { selector: String },
}

/// Either kind of failure while fetching a page and reading it.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}
