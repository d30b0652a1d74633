// src/config.rs
// =============================================================================
// Crawl configuration.
//
// CrawlConfig is built once, validated, and then only ever read. Every crawl
// component gets a shared reference to it.
//
// Where values come from (highest priority first):
// 1. Command-line flags / SITE_HARVESTER_* environment variables (cli.rs)
// 2. An optional YAML file passed with --config (FileConfig below)
// 3. The defaults in this file
// =============================================================================

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_MAX_DEPTH: usize = 3;
pub const DEFAULT_MAX_PAGES: usize = 100;
pub const DEFAULT_TIMEOUT_SECS: f64 = 10.0;
pub const DEFAULT_DELAY_SECS: f64 = 1.0;
pub const DEFAULT_THREAD_COUNT: usize = 5;
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Immutable settings for one crawler instance
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Number of breadth-first waves to run (1 = only the seed page)
    pub max_depth: usize,
    /// Hard ceiling on pages saved per crawl
    pub max_pages: usize,
    /// Per-request HTTP timeout
    pub timeout: Duration,
    /// Pause each worker takes after a successful page
    pub delay: Duration,
    /// Whether to fetch and obey robots.txt
    pub respect_robots: bool,
    /// Size of the worker pool
    pub thread_count: usize,
    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_pages: DEFAULT_MAX_PAGES,
            timeout: Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS),
            delay: Duration::from_secs_f64(DEFAULT_DELAY_SECS),
            respect_robots: false,
            thread_count: DEFAULT_THREAD_COUNT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl CrawlConfig {
    pub fn builder() -> CrawlConfigBuilder {
        CrawlConfigBuilder::new()
    }

    // Builds the shared HTTP client every crawl request goes through.
    // The timeout and user-agent live on the client so no request can forget them.
    pub fn http_client(&self) -> Result<reqwest::Client, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.clone())
            .build()?;
        Ok(client)
    }
}

/// Builder for CrawlConfig; build() checks the bounds
#[derive(Debug, Default)]
pub struct CrawlConfigBuilder {
    config: CrawlConfig,
}

impl CrawlConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: CrawlConfig::default(),
        }
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    pub fn max_pages(mut self, max_pages: usize) -> Self {
        self.config.max_pages = max_pages;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.config.delay = delay;
        self
    }

    pub fn respect_robots(mut self, respect_robots: bool) -> Self {
        self.config.respect_robots = respect_robots;
        self
    }

    pub fn thread_count(mut self, thread_count: usize) -> Self {
        self.config.thread_count = thread_count;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Validate and return the finished configuration
    pub fn build(self) -> Result<CrawlConfig, ConfigError> {
        let checks = [
            ("max_depth", self.config.max_depth),
            ("max_pages", self.config.max_pages),
            ("thread_count", self.config.thread_count),
        ];
        for (field, value) in checks {
            if value < 1 {
                return Err(ConfigError::BelowMinimum { field });
            }
        }
        Ok(self.config)
    }
}

// Shape of the optional YAML config file.
//
// Every field is optional; anything missing falls back to the defaults.
//
//   crawler:
//     max_depth: 2
//     max_pages: 50
//     timeout_secs: 5
//     delay_secs: 0.5
//     respect_robots: true
//     thread_count: 8
//   storage:
//     output_dir: crawled_data
//     upload_endpoint: http://localhost:9000
//     bucket: crawl-artifacts
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub crawler: CrawlerSection,
    pub storage: StorageSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CrawlerSection {
    pub max_depth: Option<usize>,
    pub max_pages: Option<usize>,
    pub timeout_secs: Option<f64>,
    pub delay_secs: Option<f64>,
    pub respect_robots: Option<bool>,
    pub thread_count: Option<usize>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    pub output_dir: Option<PathBuf>,
    pub upload_endpoint: Option<String>,
    pub bucket: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(text: &str) -> Result<Self, serde_yaml::Error> {
        // An empty file is a valid "use the defaults" config
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = CrawlConfig::builder().build().unwrap();
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.max_pages, 100);
        assert_eq!(config.thread_count, 5);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert!(!config.respect_robots);
    }

    #[test]
    fn test_zero_bounds_rejected() {
        let err = CrawlConfig::builder().max_pages(0).build().unwrap_err();
        assert!(matches!(err, ConfigError::BelowMinimum { field: "max_pages" }));

        let err = CrawlConfig::builder().thread_count(0).build().unwrap_err();
        assert!(matches!(err, ConfigError::BelowMinimum { field: "thread_count" }));

        let err = CrawlConfig::builder().max_depth(0).build().unwrap_err();
        assert!(matches!(err, ConfigError::BelowMinimum { field: "max_depth" }));
    }

    #[test]
    fn test_parse_partial_file() {
        let yaml = "crawler:\n  max_pages: 7\n  delay_secs: 0.25\nstorage:\n  bucket: pages\n";
        let file = FileConfig::parse(yaml).unwrap();
        assert_eq!(file.crawler.max_pages, Some(7));
        assert_eq!(file.crawler.delay_secs, Some(0.25));
        assert_eq!(file.crawler.max_depth, None);
        assert_eq!(file.storage.bucket.as_deref(), Some("pages"));
    }

    #[test]
    fn test_parse_empty_file() {
        let file = FileConfig::parse("").unwrap();
        assert!(file.crawler.max_pages.is_none());
        assert!(file.storage.output_dir.is_none());
    }

    #[test]
    fn test_load_missing_file() {
        let err = FileConfig::load(Path::new("/definitely/not/here.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
