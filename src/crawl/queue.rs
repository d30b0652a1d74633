// src/crawl/queue.rs
// =============================================================================
// This module implements website crawling with a breadth-first approach.
//
// How it works:
// 1. Validate the seed URL and load robots.txt (if enabled)
// 2. Put the seed in the queue; this is wave 1
// 3. Hand every URL of the current wave to the worker pool
// 4. Wait for the whole wave to finish (no wave N+1 work starts early)
// 5. The links the wave discovered become the next wave
// 6. Repeat until the queue is empty, max_pages pages are saved, or
//    max_depth waves have run
//
// Politeness:
// - Each worker sleeps for the configured delay after every page
// - Only the seed's domain is crawled
// - robots.txt can be honored
//
// Rust concepts:
// - Arc: shared ownership of the crawl state between worker tasks
// - Mutex: one worker at a time updates the crawled/queued sets
// - State machine enums: Idle -> WaveRunning(n) -> Done
// =============================================================================

use reqwest::Client;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

use super::frontier::Frontier;
use super::normalize::{is_valid, normalize, origin_of};
use super::pool::WorkerPool;
use super::robots::RobotsPolicy;
use super::worker::WorkerContext;
use crate::config::CrawlConfig;
use crate::error::{ConfigError, CrawlError, Result};
use crate::sink::{Artifact, ContentSink, Uploader};

/// Where a crawler is in its life
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlState {
    /// Built, crawl() not called yet
    Idle,
    /// Processing the given wave (1-based)
    WaveRunning(usize),
    /// Finished; a crawler runs exactly one crawl
    Done,
}

/// Result of one crawl
#[derive(Debug, Clone, Serialize)]
pub struct CrawlOutcome {
    /// The seed as given
    pub seed: String,
    /// Every URL fetched and saved, sorted
    pub crawled: Vec<String>,
    /// Number of waves that ran
    pub waves: usize,
    /// Saved pages, sorted by URL
    pub artifacts: Vec<Artifact>,
}

impl CrawlOutcome {
    fn empty(seed: &str) -> Self {
        Self {
            seed: seed.to_string(),
            crawled: Vec::new(),
            waves: 0,
            artifacts: Vec::new(),
        }
    }
}

/// Crawls one seed's domain
pub struct Crawler {
    config: CrawlConfig,
    client: Client,
    uploader: Arc<dyn Uploader>,
    state: CrawlState,
}

impl Crawler {
    pub fn new(
        config: CrawlConfig,
        uploader: Arc<dyn Uploader>,
    ) -> std::result::Result<Self, ConfigError> {
        let client = config.http_client()?;
        Ok(Self {
            config,
            client,
            uploader,
            state: CrawlState::Idle,
        })
    }

    pub fn state(&self) -> CrawlState {
        self.state
    }

    // Crawls from `start_url`, saving pages under `output_root`.
    //
    // An invalid seed is not an error: it is logged and the outcome is empty.
    // Err means a page could not be saved locally (or the crawler was
    // already used).
    #[instrument(
        skip(self, output_root),
        fields(max_depth = self.config.max_depth, max_pages = self.config.max_pages)
    )]
    pub async fn crawl(&mut self, start_url: &str, output_root: &Path) -> Result<CrawlOutcome> {
        if self.state != CrawlState::Idle {
            return Err(CrawlError::AlreadyFinished);
        }

        let seed = match self.canonical_seed(start_url) {
            Some(seed) => seed,
            None => {
                error!(url = start_url, "invalid starting URL");
                self.state = CrawlState::Done;
                return Ok(CrawlOutcome::empty(start_url));
            }
        };

        info!(url = %seed, output = %output_root.display(), "starting crawl");

        let robots_base = origin_of(&seed).unwrap_or_else(|| seed.clone());
        let robots =
            RobotsPolicy::load(&self.client, &robots_base, self.config.respect_robots).await;

        let mut frontier = Frontier::new(self.config.max_pages);
        frontier.seed(seed.clone());

        let ctx = Arc::new(WorkerContext {
            config: self.config.clone(),
            client: self.client.clone(),
            robots,
            frontier: Mutex::new(frontier),
            sink: ContentSink::new(output_root, self.uploader.clone()),
            start_url: seed,
        });
        let pool = WorkerPool::spawn(ctx.clone(), self.config.thread_count);

        let result = self.run_waves(&ctx, &pool).await;
        pool.shutdown().await;
        self.state = CrawlState::Done;

        let (waves, mut artifacts) = result?;
        artifacts.sort_by(|a, b| a.url.cmp(&b.url));
        let crawled = ctx.frontier.lock().await.crawled_urls();

        info!(
            pages = crawled.len(),
            waves,
            output = %ctx.sink.output_root().display(),
            "crawl completed"
        );

        Ok(CrawlOutcome {
            seed: start_url.to_string(),
            crawled,
            waves,
            artifacts,
        })
    }

    // The wave loop. Returns how many waves ran and what they saved.
    async fn run_waves(
        &mut self,
        ctx: &WorkerContext,
        pool: &WorkerPool,
    ) -> Result<(usize, Vec<Artifact>)> {
        let mut artifacts = Vec::new();
        let mut wave = 1;

        loop {
            let work = {
                let mut frontier = ctx.frontier.lock().await;
                if frontier.queued_count() == 0
                    || frontier.is_full()
                    || wave > self.config.max_depth
                {
                    break;
                }
                frontier.start_wave()
            };

            self.state = CrawlState::WaveRunning(wave);
            info!(wave, urls = work.len(), "starting wave");

            let mut discovered = 0;
            let mut persistence_failure = None;

            for (url, result) in pool.run_wave(work, wave).await {
                match result {
                    Ok(outcome) => {
                        discovered += outcome.links.len();
                        artifacts.extend(outcome.artifact);
                    }
                    Err(CrawlError::Sink(e)) => {
                        error!(url = %url, error = %e, "failed to save page");
                        persistence_failure.get_or_insert(CrawlError::Sink(e));
                    }
                    Err(e) => warn!(url = %url, error = %e, "page dropped"),
                }
            }

            // The wave has fully finished; now a save failure may end the crawl
            if let Some(err) = persistence_failure {
                return Err(err);
            }

            let crawled = ctx.frontier.lock().await.crawled_count();
            debug!(wave, discovered, crawled, "wave finished");
            wave += 1;
        }

        Ok((wave - 1, artifacts))
    }

    fn canonical_seed(&self, start_url: &str) -> Option<String> {
        let start_url = start_url.trim();
        if !is_valid(start_url) {
            return None;
        }
        normalize(start_url, start_url)
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why waves instead of one queue?
//    - A wave is every URL at one depth
//    - The scheduler waits for the whole wave before building the next one,
//      so pages are always visited in breadth-first order, even with many
//      workers running at once
//
// 2. Where are duplicates stopped?
//    - Frontier::reserve() refuses URLs that are crawled or being fetched
//    - Frontier::admit() refuses links that are crawled, in the current wave
//      or already queued, so two workers finding the same link queue it once
//    - Both run while holding the frontier lock
//
// 3. Why is the pool passed in by reference?
//    - The same workers serve every wave; the pool is only shut down after
//      the last wave
// -----------------------------------------------------------------------------
