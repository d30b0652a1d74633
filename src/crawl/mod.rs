// src/crawl/mod.rs
// =============================================================================
// This module handles website crawling.
//
// Features:
// - Breadth-first crawling in waves starting from a seed URL
// - Respects same-domain restriction (doesn't crawl external sites)
// - Configurable depth and page limits
// - A fixed pool of concurrent workers per crawl
// - Optional robots.txt support
// - Polite crawling with delays between requests
//
// Submodules, leaves first:
// - normalize: canonical URLs and domain checks
// - robots: robots.txt policy
// - fetch: one HTTP GET
// - frontier: crawled/queued sets shared by workers
// - worker: fetch, extract and save one page
// - pool: the long-lived worker pool
// - queue: the wave scheduler (Crawler)
// =============================================================================

mod fetch;
mod frontier;
pub mod normalize;
mod pool;
mod queue;
mod robots;
mod worker;

// Re-export the main crawling API
pub use queue::{CrawlOutcome, Crawler};
