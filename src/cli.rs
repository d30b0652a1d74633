// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Every crawl setting can be given three ways (highest priority first):
// 1. a flag:                 --max-pages 50
// 2. an environment variable: SITE_HARVESTER_MAX_PAGES=50
// 3. the YAML config file:   --config harvester.yaml
// and falls back to the defaults in config.rs.
//
// Rust concepts:
// - Derive macros: clap generates the parser from these structs
// - Option<T>: "not given" is different from "given as the default value",
//   which is what lets a flag override the config file
// =============================================================================

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{CrawlConfig, FileConfig};
use crate::error::ConfigError;

pub const DEFAULT_OUTPUT_DIR: &str = "crawled_data";
pub const DEFAULT_BUCKET: &str = "crawl-artifacts";

#[derive(Parser, Debug)]
#[command(
    name = "site-harvester",
    version,
    about = "Crawl a website politely and save the text of its pages",
    long_about = "site-harvester crawls a site breadth-first from a seed URL, stays on the \
                  seed's domain, and saves the visible text of every page it fetches, plus \
                  an index mapping URLs to saved files."
)]
pub struct Cli {
    /// Also write logs to <DIR>/crawler.log
    #[arg(long, global = true, env = "SITE_HARVESTER_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl one or more sites, one after another
    ///
    /// Example: site-harvester crawl https://example.com --max-depth 2 --max-pages 20
    Crawl(CrawlArgs),
}

#[derive(Args, Debug)]
pub struct CrawlArgs {
    /// Seed URLs (each one is crawled separately)
    pub urls: Vec<String>,

    /// File with one seed URL per line ("-" reads stdin)
    #[arg(long, env = "SITE_HARVESTER_SEEDS")]
    pub seeds: Option<PathBuf>,

    /// YAML config file
    #[arg(long, env = "SITE_HARVESTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory that receives <domain>/<id>.txt files and <domain>/index.txt
    #[arg(short, long, env = "SITE_HARVESTER_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Number of breadth-first waves (1 = only the seed page)
    #[arg(long, env = "SITE_HARVESTER_MAX_DEPTH")]
    pub max_depth: Option<usize>,

    /// Maximum pages saved per seed
    #[arg(long, env = "SITE_HARVESTER_MAX_PAGES")]
    pub max_pages: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long, env = "SITE_HARVESTER_TIMEOUT")]
    pub timeout: Option<f64>,

    /// Pause in seconds each worker takes after a page
    #[arg(long, env = "SITE_HARVESTER_DELAY")]
    pub delay: Option<f64>,

    /// Obey robots.txt ("--respect-robots" or "--respect-robots=false")
    #[arg(
        long,
        env = "SITE_HARVESTER_RESPECT_ROBOTS",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub respect_robots: Option<bool>,

    /// Number of concurrent workers
    #[arg(long, env = "SITE_HARVESTER_THREADS")]
    pub threads: Option<usize>,

    /// User-Agent header to send
    #[arg(long, env = "SITE_HARVESTER_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Base URL of the remote storage endpoint; uploads are off without it
    #[arg(long, env = "SITE_HARVESTER_UPLOAD_ENDPOINT")]
    pub upload_endpoint: Option<String>,

    /// Bucket name used in upload URLs
    #[arg(long, env = "SITE_HARVESTER_BUCKET")]
    pub bucket: Option<String>,

    /// Print a JSON report instead of the summary
    #[arg(long)]
    pub json: bool,
}

/// Where uploads go
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTarget {
    pub endpoint: String,
    pub bucket: String,
}

/// Fully resolved settings for a run
#[derive(Debug, Clone)]
pub struct Settings {
    pub crawl: CrawlConfig,
    pub output_dir: PathBuf,
    pub upload: Option<UploadTarget>,
}

impl CrawlArgs {
    // Layers flags/env over the config file over defaults
    pub fn resolve(&self) -> Result<Settings, ConfigError> {
        let file = match &self.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        self.resolve_with(file)
    }

    fn resolve_with(&self, file: FileConfig) -> Result<Settings, ConfigError> {
        let crawler = file.crawler;
        let mut builder = CrawlConfig::builder();

        if let Some(max_depth) = self.max_depth.or(crawler.max_depth) {
            builder = builder.max_depth(max_depth);
        }
        if let Some(max_pages) = self.max_pages.or(crawler.max_pages) {
            builder = builder.max_pages(max_pages);
        }
        if let Some(secs) = self.timeout.or(crawler.timeout_secs) {
            builder = builder.timeout(seconds("timeout", secs)?);
        }
        if let Some(secs) = self.delay.or(crawler.delay_secs) {
            builder = builder.delay(seconds("delay", secs)?);
        }
        if let Some(respect) = self.respect_robots.or(crawler.respect_robots) {
            builder = builder.respect_robots(respect);
        }
        if let Some(threads) = self.threads.or(crawler.thread_count) {
            builder = builder.thread_count(threads);
        }
        if let Some(user_agent) = self.user_agent.clone().or(crawler.user_agent) {
            builder = builder.user_agent(user_agent);
        }

        let storage = file.storage;
        let output_dir = self
            .output
            .clone()
            .or(storage.output_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));

        let upload = self
            .upload_endpoint
            .clone()
            .or(storage.upload_endpoint)
            .map(|endpoint| UploadTarget {
                endpoint,
                bucket: self
                    .bucket
                    .clone()
                    .or(storage.bucket)
                    .unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
            });

        Ok(Settings {
            crawl: builder.build()?,
            output_dir,
            upload,
        })
    }
}

fn seconds(field: &'static str, value: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(value).map_err(|_| ConfigError::InvalidDuration { field, value })
}
