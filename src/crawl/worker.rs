// src/crawl/worker.rs
// =============================================================================
// Fetch-and-extract for a single URL.
//
// How it works:
// 1. Skip the URL if it is past max_depth, already crawled/claimed, over the
//    page limit, or disallowed by robots.txt
// 2. Fetch it; anything but 200 OK is logged and skipped
// 3. Mark it crawled (unless other workers filled max_pages meanwhile),
//    extract the text and save it through the sink
// 4. Queue its same-domain links that nobody has seen yet
// 5. Sleep for the configured delay (politeness)
//
// Fetch and parse problems never escape this function; they just mean "no
// page, no links". The one error returned is a failed local save.
// =============================================================================

use reqwest::Client;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::fetch::fetch_page;
use super::frontier::{Frontier, Reservation};
use super::normalize::same_domain;
use super::robots::RobotsPolicy;
use crate::config::CrawlConfig;
use crate::extract::extract_page;
use crate::sink::{Artifact, ContentSink, SinkError};

/// Everything a worker reads or updates during one crawl
pub struct WorkerContext {
    pub config: CrawlConfig,
    pub client: Client,
    pub robots: RobotsPolicy,
    pub frontier: Mutex<Frontier>,
    pub sink: ContentSink,
    /// Canonical seed URL; its host bounds the crawl
    pub start_url: String,
}

/// What one page contributed to the crawl
#[derive(Debug, Default)]
pub struct PageOutcome {
    /// Newly queued links for the next wave
    pub links: Vec<String>,
    /// Present when the page was fetched and saved
    pub artifact: Option<Artifact>,
}

impl PageOutcome {
    fn skipped() -> Self {
        Self::default()
    }
}

pub async fn crawl_page(
    ctx: &WorkerContext,
    url: &str,
    depth: usize,
) -> Result<PageOutcome, SinkError> {
    if depth > ctx.config.max_depth {
        debug!(url, depth, "skipping, beyond max depth");
        return Ok(PageOutcome::skipped());
    }

    let reservation = ctx.frontier.lock().await.reserve(url);
    match reservation {
        Reservation::Granted => {}
        Reservation::AlreadySeen => {
            debug!(url, "skipping, already crawled");
            return Ok(PageOutcome::skipped());
        }
        Reservation::LimitReached => {
            debug!(url, "skipping, page limit reached");
            return Ok(PageOutcome::skipped());
        }
    }

    if !ctx.robots.is_allowed(url) {
        ctx.frontier.lock().await.release(url);
        info!(url, "skipping, disallowed by robots.txt");
        return Ok(PageOutcome::skipped());
    }

    info!(url, depth, "crawling");
    let html = match fetch_page(&ctx.client, url).await {
        Ok(html) => html,
        Err(e) => {
            ctx.frontier.lock().await.release(url);
            warn!(url, error = %e, "failed to fetch");
            return Ok(PageOutcome::skipped());
        }
    };

    if !ctx.frontier.lock().await.commit(url) {
        debug!(url, "skipping, page limit reached while fetching");
        return Ok(PageOutcome::skipped());
    }

    let page = extract_page(&html, url);
    let artifact = ctx.sink.save(url, &page.text).await?;

    let same_site: Vec<String> = page
        .links
        .into_iter()
        .filter(|link| same_domain(link, &ctx.start_url))
        .collect();
    let links = ctx.frontier.lock().await.admit(same_site);
    debug!(url, new_links = links.len(), "extracted links");

    if !ctx.config.delay.is_zero() {
        tokio::time::sleep(ctx.config.delay).await;
    }

    Ok(PageOutcome {
        links,
        artifact: Some(artifact),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::NoopUploader;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    fn context(
        server_url: &str,
        output: &TempDir,
        max_pages: usize,
        robots: RobotsPolicy,
    ) -> WorkerContext {
        let config = CrawlConfig::builder()
            .max_depth(2)
            .max_pages(max_pages)
            .delay(Duration::ZERO)
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        WorkerContext {
            client: config.http_client().unwrap(),
            config,
            robots,
            frontier: Mutex::new(Frontier::new(max_pages)),
            sink: ContentSink::new(output.path(), Arc::new(NoopUploader)),
            start_url: server_url.to_string(),
        }
    }

    #[tokio::test]
    async fn test_crawl_page_saves_and_filters_links() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/a")
            .with_status(200)
            .with_body(
                r#"<p>Page A</p>
                   <a href="/b">B</a>
                   <a href="/b/#again">B again</a>
                   <a href="/a">Self</a>
                   <a href="https://external.test/c">C</a>"#,
            )
            .create_async()
            .await;

        let output = TempDir::new().unwrap();
        let ctx = context(&server.url(), &output, 10, RobotsPolicy::Disabled);
        let url = format!("{}/a", server.url());

        ctx.frontier.lock().await.seed(url.clone());
        ctx.frontier.lock().await.start_wave();

        let outcome = crawl_page(&ctx, &url, 1).await.unwrap();
        assert_eq!(outcome.links, vec![format!("{}/b", server.url())]);
        let artifact = outcome.artifact.unwrap();
        assert_eq!(artifact.url, url);
        assert!(artifact.text.contains("Page A"));
        assert_eq!(ctx.frontier.lock().await.crawled_urls(), vec![url.clone()]);
    }

    #[tokio::test]
    async fn test_404_records_nothing() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/gone")
            .with_status(404)
            .with_body("<a href='/elsewhere'>x</a>")
            .create_async()
            .await;

        let output = TempDir::new().unwrap();
        let ctx = context(&server.url(), &output, 10, RobotsPolicy::Disabled);
        let url = format!("{}/gone", server.url());

        let outcome = crawl_page(&ctx, &url, 1).await.unwrap();
        assert!(outcome.links.is_empty());
        assert!(outcome.artifact.is_none());
        assert_eq!(ctx.frontier.lock().await.crawled_count(), 0);
        assert!(std::fs::read_dir(output.path()).unwrap().next().is_none());
    }

    #[tokio::test]
    async fn test_preconditions_skip_without_fetching() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", mockito::Matcher::Any)
            .with_status(200)
            .expect(0)
            .create_async()
            .await;

        let output = TempDir::new().unwrap();
        let robots = RobotsPolicy::parse("User-agent: *\nDisallow: /private\n");
        let ctx = context(&server.url(), &output, 1, robots);

        // Too deep
        let deep = format!("{}/deep", server.url());
        assert!(crawl_page(&ctx, &deep, 3).await.unwrap().artifact.is_none());

        // Disallowed, and the claim is handed back afterwards
        let private = format!("{}/private/x", server.url());
        assert!(crawl_page(&ctx, &private, 1).await.unwrap().artifact.is_none());
        {
            let mut frontier = ctx.frontier.lock().await;
            assert_eq!(frontier.reserve(&private), Reservation::Granted);
            frontier.release(&private);

            // Fill the only slot
            assert_eq!(frontier.reserve("http://other"), Reservation::Granted);
            assert!(frontier.commit("http://other"));
        }

        // Limit reached
        let other = format!("{}/other", server.url());
        assert!(crawl_page(&ctx, &other, 1).await.unwrap().artifact.is_none());

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_limit_filled_during_fetch_discards_page() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/slow")
            .with_status(200)
            .with_chunked_body(|w| {
                std::thread::sleep(Duration::from_millis(300));
                w.write_all(br#"<p>late</p><a href="/next">next</a>"#)
            })
            .create_async()
            .await;

        let output = TempDir::new().unwrap();
        let ctx = context(&server.url(), &output, 1, RobotsPolicy::Disabled);
        let slow = format!("{}/slow", server.url());

        // Another worker finishes a page while /slow is still downloading
        let sibling = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            let mut frontier = ctx.frontier.lock().await;
            assert_eq!(frontier.reserve("http://sibling"), Reservation::Granted);
            assert!(frontier.commit("http://sibling"));
        };
        let (outcome, _) = tokio::join!(crawl_page(&ctx, &slow, 1), sibling);
        let outcome = outcome.unwrap();

        assert!(outcome.artifact.is_none());
        assert!(outcome.links.is_empty());
        assert_eq!(
            ctx.frontier.lock().await.crawled_urls(),
            vec!["http://sibling"]
        );
        assert!(std::fs::read_dir(output.path()).unwrap().next().is_none());
    }
}
