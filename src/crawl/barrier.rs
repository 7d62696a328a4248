// src/crawl/barrier.rs
// =============================================================================
// A join barrier for a tree of tasks whose size we don't know up front.
//
// Every crawl task owns a CompletionToken. The token is created by the
// PARENT (register()) before the child is spawned, and the count goes down
// when the token is dropped. This way:
// - the count can never hit zero while a child is about to start
// - a task can't forget to say it's done (Drop runs on every exit path)
// - a task can't say it's done twice
//
// Rust concepts:
// - Drop: Code that runs automatically when a value goes out of scope
// - Atomics: Lock-free counters shared between threads
// - tokio::sync::Notify: Wake up tasks that are waiting for an event
// =============================================================================

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct Shared {
    outstanding: AtomicUsize,
    zero: Notify,
}

// Counts outstanding tasks and lets the driver wait for all of them
#[derive(Debug, Clone, Default)]
pub struct JoinBarrier {
    shared: Arc<Shared>,
}

// Proof that one task is still running; dropping it marks the task as done
#[derive(Debug)]
#[must_use = "dropping the token immediately marks the task as finished"]
pub struct CompletionToken {
    shared: Arc<Shared>,
}

impl JoinBarrier {
    pub fn new() -> Self {
        Self::default()
    }

    // Adds one outstanding task and returns its token
    pub fn register(&self) -> CompletionToken {
        self.shared.outstanding.fetch_add(1, Ordering::AcqRel);
        CompletionToken {
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn outstanding(&self) -> usize {
        self.shared.outstanding.load(Ordering::Acquire)
    }

    // Waits until every registered token has been dropped
    pub async fn wait(&self) {
        loop {
            // Subscribe BEFORE checking the counter, otherwise the last
            // token could drop between the check and the subscription and
            // we would sleep forever.
            let notified = self.shared.zero.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.outstanding() == 0 {
                return;
            }

            notified.await;
        }
    }
}

impl Drop for CompletionToken {
    fn drop(&mut self) {
        if self.shared.outstanding.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.shared.zero.notify_waiters();
        }
    }
}
