// src/crawl/crawler.rs
// =============================================================================
// This module implements the recursive, rate-limited crawler.
//
// How it works:
// 1. The driver registers a token for the root and crawls it inline
// 2. A crawl with depth 0 does nothing (no fetch, no children)
// 3. Otherwise the task waits for the shared RateGate, then fetches the page
// 4. On success, every linked URL gets its own tokio task with depth - 1
//    (the token is registered BEFORE the task is spawned)
// 5. On failure, the error is recorded and that branch stops there
// 6. The driver waits on the JoinBarrier until every token is dropped
//
// There is no "visited" set on purpose: the same URL can be fetched again
// through a different path.
//
// Rust concepts:
// - Arc<Self>: Every task shares the same Crawler
// - BoxFuture: A boxed future, needed because crawl() spawns itself
// - tokio::spawn: Run a future as an independent task
// =============================================================================

use futures::future::{BoxFuture, FutureExt};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex, Semaphore};
use tokio::time::Instant;

use super::barrier::{CompletionToken, JoinBarrier};
use super::fetcher::Fetcher;
use super::gate::RateGate;

// What happened when one task tried to fetch its URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CrawlEvent {
    /// The page was fetched; `children` tasks were spawned for its links
    Found {
        url: String,
        depth: usize,
        body: String,
        children: usize,
    },
    /// The fetch failed and the branch was pruned
    Failed {
        url: String,
        depth: usize,
        error: String,
    },
}

impl CrawlEvent {
    pub fn url(&self) -> &str {
        match self {
            CrawlEvent::Found { url, .. } | CrawlEvent::Failed { url, .. } => url,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, CrawlEvent::Found { .. })
    }
}

// Knobs that don't change what gets crawled, only how
#[derive(Debug, Clone, Default)]
pub struct CrawlOptions {
    /// Cap on tasks fetching at the same time (None = unbounded)
    pub max_concurrency: Option<usize>,
    /// Receives the instant of every fetch start
    pub fetch_signal: Option<mpsc::UnboundedSender<Instant>>,
    /// Print "found: ..." / error lines while crawling
    pub echo: bool,
}

// Summary of one crawl run
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub root: String,
    pub depth: usize,
    pub fetches: usize,
    pub found: usize,
    pub failed: usize,
    pub elapsed_ms: u64,
    pub events: Vec<CrawlEvent>,
}

impl CrawlReport {
    fn new(root: &str, depth: usize, events: Vec<CrawlEvent>, elapsed_ms: u64) -> Self {
        let found = events.iter().filter(|e| e.is_found()).count();
        Self {
            root: root.to_string(),
            depth,
            fetches: events.len(),
            found,
            failed: events.len() - found,
            elapsed_ms,
            events,
        }
    }
}

pub struct Crawler {
    fetcher: Arc<dyn Fetcher>,
    gate: Arc<RateGate>,
    slots: Option<Semaphore>,
    fetch_signal: Option<mpsc::UnboundedSender<Instant>>,
    echo: bool,
}

// State that belongs to ONE crawl_site call: its task tree and its events.
// Two runs on the same Crawler share the gate but nothing else.
#[derive(Debug, Default)]
pub struct CrawlRun {
    barrier: JoinBarrier,
    events: Mutex<Vec<CrawlEvent>>,
}

impl CrawlRun {
    async fn record(&self, event: CrawlEvent) {
        self.events.lock().await.push(event);
    }
}

impl Crawler {
    pub fn new(fetcher: Arc<dyn Fetcher>, gate: Arc<RateGate>, options: CrawlOptions) -> Self {
        Self {
            fetcher,
            gate,
            slots: options.max_concurrency.map(Semaphore::new),
            fetch_signal: options.fetch_signal,
            echo: options.echo,
        }
    }

    // Crawls `url` and, recursively, everything it links to
    //
    // `token` belongs to this task and is dropped when the task finishes.
    // The children are NOT awaited here; the run's barrier tracks them.
    pub fn crawl(
        self: Arc<Self>,
        run: Arc<CrawlRun>,
        url: String,
        depth: usize,
        token: CompletionToken,
    ) -> BoxFuture<'static, ()> {
        async move {
            let _token = token;

            if depth == 0 {
                return;
            }

            // Only held while this task fetches, never while children run
            let slot = match &self.slots {
                Some(slots) => slots.acquire().await.ok(),
                None => None,
            };

            let started = self.gate.acquire().await;
            if let Some(signal) = &self.fetch_signal {
                // The receiver may have gone away; the crawl doesn't care
                let _ = signal.send(started);
            }

            let page = match self.fetcher.fetch(&url).await {
                Ok(page) => page,
                Err(e) => {
                    tracing::warn!(%url, depth, error = %e, "fetch failed, pruning branch");
                    if self.echo {
                        println!("{}", e);
                    }
                    run.record(CrawlEvent::Failed {
                        url,
                        depth,
                        error: e.to_string(),
                    })
                    .await;
                    return;
                }
            };
            drop(slot);

            if self.echo {
                println!("found: {} {:?}", url, page.body);
            }

            let children = page.urls.len();
            run.record(CrawlEvent::Found {
                url: url.clone(),
                depth,
                body: page.body,
                children,
            })
            .await;

            for child in page.urls {
                let child_token = run.barrier.register();
                tracing::debug!(parent = %url, %child, depth = depth - 1, "spawning crawl task");
                tokio::spawn(Arc::clone(&self).crawl(
                    Arc::clone(&run),
                    child,
                    depth - 1,
                    child_token,
                ));
            }
        }
        .boxed()
    }
}

// Crawls from `root` down to `depth` levels and waits for the whole tree
pub async fn crawl_site(crawler: Arc<Crawler>, root: &str, depth: usize) -> CrawlReport {
    let start = Instant::now();

    let run = Arc::new(CrawlRun::default());

    let token = run.barrier.register();
    crawler
        .crawl(Arc::clone(&run), root.to_string(), depth, token)
        .await;
    run.barrier.wait().await;

    let events = std::mem::take(&mut *run.events.lock().await);
    let report = CrawlReport::new(root, depth, events, start.elapsed().as_millis() as u64);

    tracing::info!(
        root,
        depth,
        fetches = report.fetches,
        failed = report.failed,
        elapsed_ms = report.elapsed_ms,
        "crawl finished"
    );
    report
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why does crawl() return BoxFuture instead of being an `async fn`?
//    - crawl() spawns more crawl() futures, so its future type would contain
//      itself. The compiler needs a fixed size, so we box it.
//    - .boxed() comes from futures::FutureExt and also proves the future is Send
//
// 2. Why register the token in the parent?
//    - If the child registered itself, the parent could finish first and the
//      count could touch zero before the child even started
//
// 3. Why is the gate an Arc<RateGate> and not created per task?
//    - One gate per task would let every task fetch immediately
//    - The whole tree must share ONE gate for the 1-per-second rule to hold
// -----------------------------------------------------------------------------
