// src/error.rs
// =============================================================================
// Error types shared by the crawl engine.
//
// The engine sorts failures into a few kinds, and each kind is handled
// differently:
// - Bad configuration or a bad seed URL: reported to the caller
// - Fetch failures (timeouts, 404s, DNS...): logged, page skipped
// - Local persistence failures: MUST reach the caller, never swallowed
// - Remote upload failures: logged only (see sink/upload.rs)
//
// The binary (main.rs) wraps these in anyhow::Error with extra context.
// =============================================================================

use std::path::PathBuf;
use thiserror::Error;

use crate::sink::SinkError;

/// Invalid crawl configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A bound that must be at least 1 was 0
    #[error("{field} must be at least 1")]
    BelowMinimum { field: &'static str },

    /// A duration in seconds was negative, NaN or too large
    #[error("{field} must be a non-negative number of seconds, got {value}")]
    InvalidDuration { field: &'static str, value: f64 },

    /// The config file could not be read
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid YAML for our schema
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The HTTP client could not be built from the configuration
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Errors that end a crawl invocation
#[derive(Debug, Error)]
pub enum CrawlError {
    /// A saved page could not be written to local storage
    #[error(transparent)]
    Sink(#[from] SinkError),

    /// crawl() was called on a crawler that already finished
    #[error("crawler already finished; build a new one for another seed")]
    AlreadyFinished,

    /// A worker task died before replying
    #[error("worker for {url} exited without a result")]
    WorkerLost { url: String },
}

pub type Result<T> = std::result::Result<T, CrawlError>;
