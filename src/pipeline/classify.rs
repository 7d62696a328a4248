// src/pipeline/classify.rs
// =============================================================================
// Decides whether a tweet talks about a topic.
//
// A tweet "mentions" the topic when its text contains any of the keywords,
// ignoring case. Classification is deliberately slow (configurable delay) so
// that the pipeline has something to overlap with the producer.
// =============================================================================

use serde::Serialize;
use std::time::Duration;

use super::stream::Tweet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    MentionsTopic,
    Other,
}

#[derive(Debug, Clone)]
pub struct Classifier {
    keywords: Vec<String>,
    delay: Duration,
}

impl Classifier {
    // The first keyword doubles as the topic name in printed output.
    // Blank keywords are dropped: "" is contained in every text.
    pub fn new(keywords: &[String], delay: Duration) -> Self {
        Self {
            keywords: keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            delay,
        }
    }

    pub fn topic(&self) -> &str {
        self.keywords.first().map(String::as_str).unwrap_or("")
    }

    pub fn mentions_topic(&self, tweet: &Tweet) -> bool {
        let text = tweet.text.to_lowercase();
        self.keywords.iter().any(|k| text.contains(k.as_str()))
    }

    pub async fn classify(&self, tweet: &Tweet) -> Verdict {
        tokio::time::sleep(self.delay).await;
        if self.mentions_topic(tweet) {
            Verdict::MentionsTopic
        } else {
            Verdict::Other
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn golang() -> Classifier {
        Classifier::new(&["golang".to_string(), "gopher".to_string()], Duration::ZERO)
    }

    #[test]
    fn test_keyword_match_ignores_case() {
        let tweet = Tweet::new("ironzeb", "Re: Popularity of Golang in China");
        assert!(golang().mentions_topic(&tweet));
    }

    #[test]
    fn test_any_keyword_matches() {
        let tweet = Tweet::new("beertocode", "the #gopher meetup in Hsinchu");
        assert!(golang().mentions_topic(&tweet));
    }

    #[tokio::test]
    async fn test_unrelated_tweet_is_other() {
        let tweet = Tweet::new("beertocode", "centering something. #coding");
        assert_eq!(golang().classify(&tweet).await, Verdict::Other);
    }

    #[tokio::test]
    async fn test_blank_keyword_does_not_match_everything() {
        let classifier = Classifier::new(
            &["".to_string(), "golang".to_string(), "   ".to_string()],
            Duration::ZERO,
        );
        let unrelated = Tweet::new("beertocode", "centering something. #coding");

        assert_eq!(classifier.classify(&unrelated).await, Verdict::Other);
        assert_eq!(classifier.topic(), "golang");
    }

    #[test]
    fn test_topic_is_first_keyword() {
        assert_eq!(golang().topic(), "golang");
        assert_eq!(Classifier::new(&[], Duration::ZERO).topic(), "");
    }
}
