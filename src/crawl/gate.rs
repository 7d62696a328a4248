// src/crawl/gate.rs
// =============================================================================
// This module implements the shared rate gate used by every crawl task.
//
// How it works:
// 1. One gate is created by the driver and shared (Arc) with every task
// 2. Each task calls acquire() right before it fetches a page
// 3. acquire() hands out at most one permit per period, no matter how many
//    tasks are waiting at the same time
//
// The waiting tasks line up behind a tokio Mutex (which is fair / FIFO), and
// whoever holds the lock waits for the next tick of a tokio Interval.
//
// Rust concepts:
// - tokio::time::Interval: A periodic timer
// - tokio::sync::Mutex: An async lock that can be held across .await
// =============================================================================

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

// Hands out at most one permit per `period` to competing tasks
#[derive(Debug)]
pub struct RateGate {
    period: Duration,
    ticker: Mutex<Interval>,
}

impl RateGate {
    // Creates a gate whose first permit is available right away
    //
    // Panics if `period` is zero (tokio refuses zero-length intervals).
    // Settings::validate() rejects that value before we ever get here.
    pub fn new(period: Duration) -> Self {
        let mut ticker = time::interval(period);

        // If nobody asked for a permit for a while, do NOT let the missed ticks
        // pile up into a burst. The next permit comes now and the one after
        // that a full period later.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        Self {
            period,
            ticker: Mutex::new(ticker),
        }
    }

    // Waits until this caller is allowed to start a fetch
    //
    // Returns the instant the permit was granted.
    pub async fn acquire(&self) -> Instant {
        let mut ticker = self.ticker.lock().await;
        // tick() reports when the tick was scheduled, which can be in the past
        // after an idle stretch. We care about when the caller actually got in.
        ticker.tick().await;
        let granted = Instant::now();
        tracing::debug!(?granted, "rate gate permit granted");
        granted
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}
