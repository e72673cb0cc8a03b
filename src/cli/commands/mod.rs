//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod fetch;
mod report;
mod stats;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "edisclose")]
#[command(about = "Incremental harvester for corporate disclosure events")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery of edisclose.toml / edisclose.json)
    #[arg(short, long, global = true, env = "EDISCLOSE_CONFIG")]
    config: Option<PathBuf>,

    /// Cache database file (overrides config file)
    #[arg(long, global = true, env = "EDISCLOSE_CACHE")]
    cache: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and cache recently posted events
    Fetch {
        /// Fetch events posted in the last N days (at most 36500)
        #[arg(short, long, default_value = "30", value_parser = clap::value_parser!(u32).range(0..=36_500))]
        days: u32,
        /// Walk every result page instead of stopping at the first cached event
        #[arg(long)]
        full: bool,
        /// Limit number of result pages (0 = unlimited, overrides config)
        #[arg(long)]
        max_pages: Option<u32>,
        /// Write the browser's session cookies to this file
        #[arg(long)]
        save_cookies: Option<PathBuf>,
    },

    /// Write cached events to report files
    ///
    /// Optionally restrict to organizations and/or summaries containing ANY of
    /// the passed terms. Terms are not case-sensitive.
    Report {
        /// Only events whose organization contains this text (repeatable)
        #[arg(short, long)]
        org: Vec<String>,
        /// Only events whose summary contains this text (repeatable)
        #[arg(short, long)]
        summary: Vec<String>,
        /// Output directory (overrides config)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Show cache statistics
    Stats,
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let cwd = std::env::current_dir()?;
    let mut config = Config::load(cli.config.as_deref(), &cwd)?;
    if let Some(ref cache) = cli.cache {
        config.cache_path = cache.clone();
    }
    Ok(config)
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Fetch {
            days,
            full,
            max_pages,
            save_cookies,
        } => fetch::cmd_fetch(&config, days, full, max_pages, save_cookies).await,
        Commands::Report {
            org,
            summary,
            output,
        } => report::cmd_report(&config, &org, &summary, output),
        Commands::Stats => stats::cmd_stats(&config),
    }
}
