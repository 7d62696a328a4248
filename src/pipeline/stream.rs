// src/pipeline/stream.rs
// =============================================================================
// The tweet source the producer reads from.
//
// A TweetSource hands out one tweet per next() call and then reports
// StreamError::EndOfStream forever. MockStream replays a fixed list and
// pretends every read is slow (it sleeps before answering).
// =============================================================================

use async_trait::async_trait;
use serde::Serialize;
use std::collections::VecDeque;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tweet {
    pub username: String,
    pub text: String,
}

impl Tweet {
    pub fn new(username: &str, text: &str) -> Self {
        Self {
            username: username.to_string(),
            text: text.to_string(),
        }
    }
}

// End of stream is the normal way a source finishes, not a failure
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamError {
    #[error("end of stream")]
    EndOfStream,
}

#[async_trait]
pub trait TweetSource: Send {
    async fn next(&mut self) -> Result<Tweet, StreamError>;
}

#[derive(Debug, Clone)]
pub struct MockStream {
    tweets: VecDeque<Tweet>,
    delay: Duration,
}

impl MockStream {
    pub fn new(tweets: Vec<Tweet>, delay: Duration) -> Self {
        Self {
            tweets: tweets.into(),
            delay,
        }
    }

    // The five sample tweets
    pub fn sample(delay: Duration) -> Self {
        Self::new(
            vec![
                Tweet::new(
                    "davecheney",
                    "#golang top tip: if your unit tests import any other package you wrote, including themselves, they're not unit tests.",
                ),
                Tweet::new(
                    "beertocode",
                    "Backend developer, doing frontend featuring the eternal struggle of centering something. #coding",
                ),
                Tweet::new(
                    "ironzeb",
                    "Re: Popularity of Golang in China: My thinking nowadays is that it had a lot to do with this book and author https://github.com/astaxie/build-web-application-with-golang",
                ),
                Tweet::new(
                    "beertocode",
                    "Looking forward to the #gopher meetup in Hsinchu tonight with @ironzeb!",
                ),
                Tweet::new(
                    "vampirewalk666",
                    "I just wrote a golang slack bot! It reports the state of github repository. #Slack #golang",
                ),
            ],
            delay,
        )
    }

    pub fn remaining(&self) -> usize {
        self.tweets.len()
    }
}

#[async_trait]
impl TweetSource for MockStream {
    async fn next(&mut self) -> Result<Tweet, StreamError> {
        // Every read costs time, including the one that finds nothing left
        tokio::time::sleep(self.delay).await;
        self.tweets.pop_front().ok_or(StreamError::EndOfStream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_mock_stream_yields_then_ends() {
        let mut stream = MockStream::new(
            vec![Tweet::new("a", "first"), Tweet::new("b", "second")],
            Duration::from_millis(320),
        );

        assert_eq!(stream.next().await.unwrap().username, "a");
        assert_eq!(stream.next().await.unwrap().username, "b");
        assert_eq!(stream.next().await, Err(StreamError::EndOfStream));
        // Stays exhausted
        assert_eq!(stream.next().await, Err(StreamError::EndOfStream));
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_read_costs_the_delay() {
        let mut stream = MockStream::sample(Duration::from_millis(320));
        assert_eq!(stream.remaining(), 5);

        let start = tokio::time::Instant::now();
        stream.next().await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(320));
        assert!(start.elapsed() < Duration::from_millis(330));
    }
}
