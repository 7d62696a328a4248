// src/crawl/fetcher.rs
// =============================================================================
// The page source the crawler talks to.
//
// The crawler never does real network I/O. It only knows about the Fetcher
// trait, and this file ships an in-memory implementation (MockFetcher) that
// serves a small fake website. The fake website can be the built-in
// golang.org tree or a YAML site map loaded from disk.
//
// YAML site map format:
//
//   "http://example.com/":
//     body: "Home"
//     urls: ["http://example.com/a", "http://example.com/b"]
//   "http://example.com/a":
//     body: "Page A"
//
// Rust concepts:
// - Traits: Let the crawler work with any page source
// - async-trait: Async methods inside traits
// - HashMap: Fast lookup from URL to page
// =============================================================================

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::config::ConfigError;

// One fetched page: its body and the links found on it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub body: String,
    #[serde(default)]
    pub urls: Vec<String>,
}

// The only way a fetch can fail. There is no retry.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("not found: {url}")]
    NotFound { url: String },
}

// Anything that can turn a URL into a Page
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Page, FetchError>;
}

// A fake website held in memory
#[derive(Debug, Clone, Default)]
pub struct MockFetcher {
    pages: HashMap<String, Page>,
}

impl MockFetcher {
    pub fn new(pages: HashMap<String, Page>) -> Self {
        Self { pages }
    }

    // The classic golang.org tree. Note that /cmd/ is linked but missing,
    // so every visit to it is a fetch failure.
    pub fn golang_org() -> Self {
        let mut fetcher = Self::default();
        fetcher.insert(
            "http://golang.org/",
            "The Go Programming Language",
            &["http://golang.org/pkg/", "http://golang.org/cmd/"],
        );
        fetcher.insert(
            "http://golang.org/pkg/",
            "Packages",
            &[
                "http://golang.org/",
                "http://golang.org/cmd/",
                "http://golang.org/pkg/fmt/",
                "http://golang.org/pkg/os/",
            ],
        );
        fetcher.insert(
            "http://golang.org/pkg/fmt/",
            "Package fmt",
            &["http://golang.org/", "http://golang.org/pkg/"],
        );
        fetcher.insert(
            "http://golang.org/pkg/os/",
            "Package os",
            &["http://golang.org/", "http://golang.org/pkg/"],
        );
        fetcher
    }

    // Loads a site map from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let pages: HashMap<String, Page> = serde_yaml::from_str(content)?;
        Ok(Self::new(pages))
    }

    pub fn insert(&mut self, url: &str, body: &str, urls: &[&str]) {
        self.pages.insert(
            url.to_string(),
            Page {
                body: body.to_string(),
                urls: urls.iter().map(|u| u.to_string()).collect(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<Page, FetchError> {
        self.pages.get(url).cloned().ok_or_else(|| FetchError::NotFound {
            url: url.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_golang_org_root() {
        let fetcher = MockFetcher::golang_org();
        let page = fetcher.fetch("http://golang.org/").await.unwrap();
        assert_eq!(page.body, "The Go Programming Language");
        assert_eq!(page.urls.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_page_is_not_found() {
        let fetcher = MockFetcher::golang_org();
        let err = fetcher.fetch("http://golang.org/cmd/").await.unwrap_err();
        assert_eq!(err.to_string(), "not found: http://golang.org/cmd/");
    }

    #[tokio::test]
    async fn test_load_site_map_from_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "\"http://example.com/\":\n  body: Home\n  urls: [\"http://example.com/a\"]\n\"http://example.com/a\":\n  body: Page A\n"
        )
        .unwrap();

        let fetcher = MockFetcher::from_yaml_file(file.path()).unwrap();
        assert_eq!(fetcher.len(), 2);

        let leaf = fetcher.fetch("http://example.com/a").await.unwrap();
        assert_eq!(leaf.body, "Page A");
        assert!(leaf.urls.is_empty());
    }

    #[test]
    fn test_bad_yaml_is_an_error() {
        let result = MockFetcher::from_yaml_str("- just\n- a list\n");
        assert!(matches!(result, Err(ConfigError::Yaml(_))));
    }
}
