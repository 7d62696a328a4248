// src/pipeline/run.rs
// =============================================================================
// The producer/consumer pipeline.
//
// How it works:
// 1. The producer runs in its own tokio task. It pulls tweets from the
//    source and sends them into a capacity-1 channel
// 2. The consumer runs in the calling task, receives tweets and classifies
//    them while the producer is already reading the next one
// 3. At end of stream the producer returns and its Sender is dropped, which
//    closes the channel
// 4. The consumer drains what is left, sees the closed channel and stops
//
// Total time is roughly the slower stage times N, not the sum of both stages.
//
// Rust concepts:
// - tokio::sync::mpsc: An async channel; recv() returns None once every
//   Sender is gone
// - JoinHandle: Lets us wait for a spawned task and get its return value
// =============================================================================

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinError;
use tokio::time::Instant;

use super::classify::{Classifier, Verdict};
use super::stream::{StreamError, Tweet, TweetSource};

// Tweets in flight between producer and consumer
const HANDOFF_CAPACITY: usize = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classified {
    pub username: String,
    pub text: String,
    pub verdict: Verdict,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub concurrent: bool,
    pub produced: usize,
    pub elapsed_ms: u64,
    pub items: Vec<Classified>,
}

impl PipelineReport {
    pub fn mentioning(&self) -> usize {
        self.items
            .iter()
            .filter(|c| c.verdict == Verdict::MentionsTopic)
            .count()
    }
}

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("producer task failed: {0}")]
    Producer(#[from] JoinError),
}

// Reads the source until end of stream, sending every tweet downstream
//
// Returns how many tweets were sent. Dropping `tweets` on return is what
// closes the channel for the consumer.
pub async fn produce<S: TweetSource>(mut source: S, tweets: mpsc::Sender<Tweet>) -> usize {
    let mut sent = 0;
    loop {
        match source.next().await {
            Ok(tweet) => {
                if tweets.send(tweet).await.is_err() {
                    tracing::warn!(sent, "consumer went away, producer stopping early");
                    break;
                }
                sent += 1;
            }
            Err(StreamError::EndOfStream) => {
                tracing::debug!(sent, "end of stream, closing handoff channel");
                break;
            }
        }
    }
    sent
}

// Classifies every tweet until the channel is closed and empty
pub async fn consume(
    mut tweets: mpsc::Receiver<Tweet>,
    classifier: &Classifier,
    echo: bool,
) -> Vec<Classified> {
    let mut results = Vec::new();
    while let Some(tweet) = tweets.recv().await {
        results.push(classify_one(tweet, classifier, echo).await);
    }
    results
}

async fn classify_one(tweet: Tweet, classifier: &Classifier, echo: bool) -> Classified {
    let verdict = classifier.classify(&tweet).await;
    if echo {
        match verdict {
            Verdict::MentionsTopic => {
                println!("{} \ttweets about {}", tweet.username, classifier.topic())
            }
            Verdict::Other => {
                println!("{} \tdoes not tweet about {}", tweet.username, classifier.topic())
            }
        }
    }
    Classified {
        username: tweet.username,
        text: tweet.text,
        verdict,
    }
}

// Runs producer and consumer concurrently
pub async fn run_pipeline<S>(
    source: S,
    classifier: &Classifier,
    echo: bool,
) -> Result<PipelineReport, PipelineError>
where
    S: TweetSource + 'static,
{
    let start = Instant::now();
    let (tx, rx) = mpsc::channel(HANDOFF_CAPACITY);

    let producer = tokio::spawn(produce(source, tx));
    let items = consume(rx, classifier, echo).await;
    let produced = producer.await?;

    let report = PipelineReport {
        concurrent: true,
        produced,
        elapsed_ms: start.elapsed().as_millis() as u64,
        items,
    };
    tracing::info!(
        produced = report.produced,
        consumed = report.items.len(),
        elapsed_ms = report.elapsed_ms,
        "pipeline finished"
    );
    Ok(report)
}

// Baseline: read everything first, then classify everything
pub async fn run_sequential<S: TweetSource>(
    mut source: S,
    classifier: &Classifier,
    echo: bool,
) -> PipelineReport {
    let start = Instant::now();

    let mut tweets = Vec::new();
    while let Ok(tweet) = source.next().await {
        tweets.push(tweet);
    }

    let produced = tweets.len();
    let mut items = Vec::with_capacity(produced);
    for tweet in tweets {
        items.push(classify_one(tweet, classifier, echo).await);
    }

    PipelineReport {
        concurrent: false,
        produced,
        elapsed_ms: start.elapsed().as_millis() as u64,
        items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::stream::MockStream;
    use std::time::Duration;

    fn classifier(delay_ms: u64) -> Classifier {
        Classifier::new(
            &["golang".to_string(), "gopher".to_string()],
            Duration::from_millis(delay_ms),
        )
    }

    fn numbered(n: usize) -> Vec<Tweet> {
        (0..n)
            .map(|i| Tweet::new(&format!("user{}", i), &format!("tweet number {}", i)))
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_three_tweets_then_end_of_stream() {
        let tweets = vec![
            Tweet::new("a", "I love #golang"),
            Tweet::new("b", "rust all the things"),
            Tweet::new("c", "gopher plushies"),
        ];
        let source = MockStream::new(tweets.clone(), Duration::from_millis(320));

        let report = run_pipeline(source, &classifier(330), false).await.unwrap();

        assert_eq!(report.produced, 3);
        assert_eq!(report.items.len(), 3);
        let verdicts: Vec<_> = report.items.iter().map(|c| c.verdict).collect();
        assert_eq!(
            verdicts,
            vec![Verdict::MentionsTopic, Verdict::Other, Verdict::MentionsTopic]
        );
        assert_eq!(report.mentioning(), 2);
    }

    #[tokio::test]
    async fn test_order_is_preserved_without_loss_or_duplicates() {
        let tweets = numbered(50);
        let source = MockStream::new(tweets.clone(), Duration::ZERO);

        let report = run_pipeline(source, &classifier(0), false).await.unwrap();

        let received: Vec<&str> = report.items.iter().map(|c| c.username.as_str()).collect();
        let expected: Vec<&str> = tweets.iter().map(|t| t.username.as_str()).collect();
        assert_eq!(received, expected);
        assert_eq!(report.produced, 50);
    }

    #[tokio::test]
    async fn test_producer_closes_channel_at_end_of_stream() {
        let (tx, mut rx) = mpsc::channel(8);
        let source = MockStream::new(numbered(3), Duration::ZERO);

        let sent = produce(source, tx).await;

        assert_eq!(sent, 3);
        for _ in 0..3 {
            assert!(rx.recv().await.is_some());
        }
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_producer_stops_when_consumer_is_gone() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let source = MockStream::new(numbered(3), Duration::ZERO);

        assert_eq!(produce(source, tx).await, 0);
    }

    #[tokio::test]
    async fn test_empty_stream_finishes() {
        let source = MockStream::new(Vec::new(), Duration::ZERO);

        let report = run_pipeline(source, &classifier(0), false).await.unwrap();

        assert_eq!(report.produced, 0);
        assert!(report.items.is_empty());
    }

    #[tokio::test]
    async fn test_blank_topic_keeps_unrelated_tweets_other() {
        let classifier = Classifier::new(&["golang".to_string(), "".to_string()], Duration::ZERO);

        let report = run_pipeline(MockStream::sample(Duration::ZERO), &classifier, false)
            .await
            .unwrap();

        let others: Vec<&str> = report
            .items
            .iter()
            .filter(|c| c.verdict == Verdict::Other)
            .map(|c| c.text.as_str())
            .collect();
        assert_eq!(others.len(), 1);
        assert!(others[0].contains("#coding"));
        assert_eq!(report.mentioning(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_run_overlaps_the_stages() {
        let concurrent = run_pipeline(
            MockStream::sample(Duration::from_millis(320)),
            &classifier(330),
            false,
        )
        .await
        .unwrap();
        let sequential = run_sequential(
            MockStream::sample(Duration::from_millis(320)),
            &classifier(330),
            false,
        )
        .await;

        // 5 x 330ms of classifying plus the first 320ms read
        assert!(concurrent.elapsed_ms >= 1650);
        assert!(concurrent.elapsed_ms < 2100);
        // 6 reads (the last one hits end of stream) plus 5 classifications
        assert!(sequential.elapsed_ms >= 3500);

        assert_eq!(concurrent.items, sequential.items);
        assert_eq!(concurrent.mentioning(), 4);
    }
}
