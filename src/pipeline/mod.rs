// src/pipeline/mod.rs
// =============================================================================
// This module holds the producer/consumer pipeline.
//
// Submodules:
// - stream: Tweet, the TweetSource trait and the mock stream
// - classify: decides whether a tweet talks about the topic
// - run: producer, consumer and the two drivers (concurrent / sequential)
// =============================================================================

mod classify;
mod run;
mod stream;

pub use classify::{Classifier, Verdict};
pub use run::{run_pipeline, run_sequential, PipelineReport};
pub use stream::MockStream;
