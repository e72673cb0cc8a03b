//! edisclose - incremental harvester for corporate disclosure events.
//!
//! Crawls the paginated event search of a disclosure portal, caches every new
//! event (with its full text) in a local SQLite file, and renders selected
//! cached events into plain-text report files.

pub mod cli;
pub mod config;
pub mod crawl;
pub mod models;
pub mod report;
pub mod repository;
pub mod scrapers;
pub mod utils;
