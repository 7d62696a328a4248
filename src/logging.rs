// src/logging.rs
// =============================================================================
// Diagnostic logging setup.
//
// Normal results (found pages, classified tweets, summaries) go to stdout with
// println!. Diagnostics (gate permits, spawned tasks, failures) go through
// `tracing` and end up on stderr, so `--json` output stays clean.
//
// RUST_LOG wins if it is set, e.g. RUST_LOG=concurrency_drills=debug
// =============================================================================

use tracing_subscriber::EnvFilter;

pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // try_init: a second call (e.g. from tests) must not panic
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
