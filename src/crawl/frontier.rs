// src/crawl/frontier.rs
// =============================================================================
// Shared crawl state for one crawl.
//
// The sets, all holding canonical URLs:
// - crawled:   pages fetched with 200 OK (never shrinks, at most max_pages)
// - wave:      this wave's work list
// - in_flight: URLs a worker is fetching right now
// - queued:    links discovered this wave, to be fetched next wave
//
// Workers share one Frontier behind a tokio Mutex. The two operations that
// race between workers are each done inside a single lock:
// - reserve(): "already crawled or claimed?" + "page limit reached?" + claim
// - commit():  "page limit reached?" + mark crawled
// - admit():   "crawled, claimed or queued already?" + queue it
//
// Only crawled pages count toward max_pages. A claim never holds a slot, so
// a fetch that fails can't crowd out its siblings; commit() is the cutoff
// that keeps max_pages from being overshot.
// =============================================================================

use std::collections::HashSet;

/// Answer to a worker asking to fetch a URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reservation {
    /// Go ahead; call commit() on success or release() on failure
    Granted,
    /// Fetched before, or another worker holds it
    AlreadySeen,
    /// Crawled pages already fill max_pages
    LimitReached,
}

#[derive(Debug)]
pub struct Frontier {
    max_pages: usize,
    crawled: HashSet<String>,
    // This wave's work list
    wave: HashSet<String>,
    // Subset of `wave` currently being fetched
    in_flight: HashSet<String>,
    // Next wave, built up by admit()
    queued: HashSet<String>,
}

impl Frontier {
    pub fn new(max_pages: usize) -> Self {
        Self {
            max_pages,
            crawled: HashSet::new(),
            wave: HashSet::new(),
            in_flight: HashSet::new(),
            queued: HashSet::new(),
        }
    }

    pub fn seed(&mut self, url: String) {
        if !self.crawled.contains(&url) {
            self.queued.insert(url);
        }
    }

    pub fn crawled_count(&self) -> usize {
        self.crawled.len()
    }

    pub fn queued_count(&self) -> usize {
        self.queued.len()
    }

    pub fn is_full(&self) -> bool {
        self.crawled.len() >= self.max_pages
    }

    // Moves the queued set into the current wave and returns it as a work
    // list. The queued set starts the next wave empty.
    pub fn start_wave(&mut self) -> Vec<String> {
        self.wave = std::mem::take(&mut self.queued);
        let mut work: Vec<String> = self.wave.iter().cloned().collect();
        work.sort();
        work
    }

    // Check-then-claim, atomic because the caller holds the lock
    pub fn reserve(&mut self, url: &str) -> Reservation {
        if self.crawled.contains(url) || self.in_flight.contains(url) {
            return Reservation::AlreadySeen;
        }
        if self.is_full() {
            return Reservation::LimitReached;
        }
        self.in_flight.insert(url.to_string());
        Reservation::Granted
    }

    // The page came back 200: it now counts as crawled, unless siblings
    // filled max_pages while it was in flight. Returns false when refused;
    // the claim is dropped either way.
    pub fn commit(&mut self, url: &str) -> bool {
        if !self.in_flight.remove(url) || self.is_full() {
            return false;
        }
        self.crawled.insert(url.to_string())
    }

    // The fetch failed: drop the claim
    pub fn release(&mut self, url: &str) {
        self.in_flight.remove(url);
    }

    // Queues every link not crawled, not in this wave, and not already queued.
    // Returns only the links this call added.
    pub fn admit(&mut self, links: impl IntoIterator<Item = String>) -> Vec<String> {
        let mut admitted = Vec::new();
        for link in links {
            if self.crawled.contains(&link) || self.wave.contains(&link) {
                continue;
            }
            if self.queued.insert(link.clone()) {
                admitted.push(link);
            }
        }
        admitted
    }

    // Sorted copy of the crawled set
    pub fn crawled_urls(&self) -> Vec<String> {
        let mut urls: Vec<String> = self.crawled.iter().cloned().collect();
        urls.sort();
        urls
    }
}
