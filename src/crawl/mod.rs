// src/crawl/mod.rs
// =============================================================================
// This module handles the rate-limited recursive crawl.
//
// Features:
// - One tokio task per discovered link (no worker pool by default)
// - A single shared RateGate: at most one fetch starts per interval across
//   the WHOLE task tree
// - A JoinBarrier so the driver knows when the dynamically growing tree is done
// - Fetch failures only prune their own branch
//
// Submodules:
// - gate: the shared rate gate
// - barrier: the join barrier and its completion tokens
// - fetcher: the page source (trait + in-memory mock)
// - crawler: the recursive crawl itself
// =============================================================================

mod barrier;
mod crawler;
mod fetcher;
mod gate;

pub use crawler::{crawl_site, CrawlEvent, CrawlOptions, CrawlReport, Crawler};
pub use fetcher::{Fetcher, MockFetcher};
pub use gate::RateGate;
