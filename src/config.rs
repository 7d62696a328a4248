// src/config.rs
// =============================================================================
// Settings for both commands.
//
// Where values come from (later wins):
// 1. Built-in defaults (Default impls below)
// 2. An optional YAML file passed with --config
// 3. Command-line flags (applied in main.rs)
//
// Example config.yml (every key is optional):
//
//   crawl:
//     root: "http://golang.org/"
//     depth: 4
//     interval_ms: 1000
//     max_concurrency: 8
//     site_map: "site.yml"
//   pipeline:
//     produce_delay_ms: 320
//     classify_delay_ms: 330
//     topics: ["golang", "gopher"]
//
// Rust concepts:
// - #[serde(default)]: Missing fields fall back to Default::default()
// - thiserror: Derive Display/Error for our own error enum
// =============================================================================

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid setting: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub crawl: CrawlSettings,
    pub pipeline: PipelineSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlSettings {
    /// Where the crawl starts
    pub root: String,
    /// How many levels to crawl (0 = fetch nothing)
    pub depth: usize,
    /// Minimum spacing between two fetch starts
    pub interval_ms: u64,
    /// Optional cap on tasks fetching at once
    pub max_concurrency: Option<usize>,
    /// YAML site map to crawl instead of the built-in golang.org tree
    pub site_map: Option<PathBuf>,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            root: "http://golang.org/".to_string(),
            depth: 4,
            interval_ms: 1000,
            max_concurrency: None,
            site_map: None,
        }
    }
}

impl CrawlSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    pub produce_delay_ms: u64,
    pub classify_delay_ms: u64,
    /// Keywords; the first one is also the topic name shown in output
    pub topics: Vec<String>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            produce_delay_ms: 320,
            classify_delay_ms: 330,
            topics: vec!["golang".to_string(), "gopher".to_string()],
        }
    }
}

impl PipelineSettings {
    pub fn produce_delay(&self) -> Duration {
        Duration::from_millis(self.produce_delay_ms)
    }

    pub fn classify_delay(&self) -> Duration {
        Duration::from_millis(self.classify_delay_ms)
    }
}

impl Settings {
    // Defaults when no file is given, otherwise the file on top of defaults
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_yaml_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    // Rejects values that would panic or hang later on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.crawl.interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "crawl.interval_ms must be greater than 0".to_string(),
            ));
        }
        if self.crawl.max_concurrency == Some(0) {
            return Err(ConfigError::Invalid(
                "crawl.max_concurrency must be at least 1".to_string(),
            ));
        }
        if self.pipeline.topics.is_empty() {
            return Err(ConfigError::Invalid(
                "pipeline.topics needs at least one keyword".to_string(),
            ));
        }
        // A blank keyword is contained in every text and would match everything
        if self.pipeline.topics.iter().any(|t| t.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "pipeline.topics must not contain blank keywords".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::load(None).unwrap();
        assert_eq!(settings.crawl.depth, 4);
        assert_eq!(settings.crawl.interval(), Duration::from_secs(1));
        assert_eq!(settings.pipeline.topics[0], "golang");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "crawl:\n  depth: 2\n  max_concurrency: 3\n").unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();

        assert_eq!(settings.crawl.depth, 2);
        assert_eq!(settings.crawl.max_concurrency, Some(3));
        assert_eq!(settings.crawl.interval_ms, 1000);
        assert_eq!(settings.pipeline, PipelineSettings::default());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = Settings::load(Some(Path::new("/definitely/not/here.yml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let settings = Settings::from_yaml_str("crawl:\n  interval_ms: 0\n").unwrap();
        assert!(matches!(settings.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_zero_concurrency_is_rejected() {
        let settings = Settings::from_yaml_str("crawl:\n  max_concurrency: 0\n").unwrap();
        assert!(matches!(settings.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_empty_topics_are_rejected() {
        let settings = Settings::from_yaml_str("pipeline:\n  topics: []\n").unwrap();
        assert!(matches!(settings.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_blank_topic_next_to_real_one_is_rejected() {
        let settings =
            Settings::from_yaml_str("pipeline:\n  topics: [\"golang\", \"\"]\n").unwrap();
        assert!(matches!(settings.validate(), Err(ConfigError::Invalid(_))));

        let settings =
            Settings::from_yaml_str("pipeline:\n  topics: [\"  \", \"golang\"]\n").unwrap();
        assert!(matches!(settings.validate(), Err(ConfigError::Invalid(_))));
    }
}
