// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Two subcommands, one per exercise:
// - crawl:    the rate-limited recursive crawler
// - pipeline: the tweet producer/consumer pipeline
//
// Every flag is optional. Anything left out comes from --config (YAML) or the
// built-in defaults, see src/config.rs.
// =============================================================================

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Settings;

#[derive(Parser, Debug)]
#[command(
    name = "concurrency-drills",
    version = "0.1.0",
    about = "A rate-limited recursive crawler and a concurrent producer/consumer pipeline",
    long_about = "concurrency-drills runs two small concurrency exercises on tokio: a recursive \
                  crawler over a mock website that never starts two fetches less than an interval \
                  apart, and a tweet pipeline where producing and classifying overlap."
)]
pub struct Cli {
    /// YAML settings file (see README / src/config.rs for the keys)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print debug diagnostics to stderr (RUST_LOG overrides this)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl a mock website, at most one fetch per interval
    ///
    /// Example: concurrency-drills crawl http://golang.org/ --depth 3
    Crawl {
        /// URL to start from (default: http://golang.org/)
        root: Option<String>,

        /// How many levels deep to crawl (0 = fetch nothing)
        #[arg(long)]
        depth: Option<usize>,

        /// Minimum milliseconds between two fetch starts
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Cap on tasks fetching at the same time
        #[arg(long)]
        max_concurrency: Option<usize>,

        /// YAML site map to crawl instead of the built-in golang.org tree
        #[arg(long)]
        site_map: Option<PathBuf>,

        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Stream tweets through a concurrent producer/consumer pipeline
    ///
    /// Example: concurrency-drills pipeline --sequential
    Pipeline {
        /// Run the slow baseline (produce everything, then classify)
        #[arg(long)]
        sequential: bool,

        /// Milliseconds each read from the stream takes
        #[arg(long)]
        produce_delay_ms: Option<u64>,

        /// Milliseconds each classification takes
        #[arg(long)]
        classify_delay_ms: Option<u64>,

        /// Keyword to look for (repeatable); the first one names the topic
        #[arg(long = "topic")]
        topics: Vec<String>,

        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Commands {
    // Writes any flags the user gave on top of the loaded settings
    pub fn apply_to(&self, settings: &mut Settings) {
        match self {
            Commands::Crawl {
                root,
                depth,
                interval_ms,
                max_concurrency,
                site_map,
                ..
            } => {
                let crawl = &mut settings.crawl;
                if let Some(root) = root {
                    crawl.root = root.clone();
                }
                if let Some(depth) = depth {
                    crawl.depth = *depth;
                }
                if let Some(interval_ms) = interval_ms {
                    crawl.interval_ms = *interval_ms;
                }
                if max_concurrency.is_some() {
                    crawl.max_concurrency = *max_concurrency;
                }
                if site_map.is_some() {
                    crawl.site_map = site_map.clone();
                }
            }
            Commands::Pipeline {
                produce_delay_ms,
                classify_delay_ms,
                topics,
                ..
            } => {
                let pipeline = &mut settings.pipeline;
                if let Some(ms) = produce_delay_ms {
                    pipeline.produce_delay_ms = *ms;
                }
                if let Some(ms) = classify_delay_ms {
                    pipeline.classify_delay_ms = *ms;
                }
                if !topics.is_empty() {
                    pipeline.topics = topics.clone();
                }
            }
        }
    }
}
