// src/crawl/robots.rs
// =============================================================================
// A deliberately small robots.txt policy.
//
// Two states:
// - Disabled: robots.txt is never fetched, every URL is allowed
// - Enabled: URLs whose path starts with a "Disallow:" prefix from a
//   "User-agent: *" block are refused
//
// Wildcards, Allow: lines and Crawl-delay are not supported.
//
// If robots.txt can't be fetched (network error, 404, 500...) the policy
// fails open: Enabled with no rules, so the crawl is never blocked by it.
// =============================================================================

use reqwest::{Client, StatusCode};
use std::collections::HashSet;
use tracing::{debug, info, warn};

use super::normalize::path_of;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RobotsPolicy {
    /// respect_robots = false
    Disabled,
    /// respect_robots = true; prefixes from the "*" block
    Enabled { disallowed: HashSet<String> },
}

impl RobotsPolicy {
    // Fetches `{base_url}/robots.txt` when enabled.
    //
    // base_url is an origin such as "https://example.com" (no trailing slash).
    pub async fn load(client: &Client, base_url: &str, enabled: bool) -> Self {
        if !enabled {
            info!("robots.txt directives will be ignored as requested");
            return RobotsPolicy::Disabled;
        }

        let robots_url = format!("{}/robots.txt", base_url.trim_end_matches('/'));
        let response = match client.get(&robots_url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(
                    url = %robots_url,
                    error = %e,
                    "could not fetch robots.txt, crawling unrestricted"
                );
                return Self::unrestricted();
            }
        };

        if response.status() != StatusCode::OK {
            warn!(
                url = %robots_url,
                status = response.status().as_u16(),
                "robots.txt unavailable, crawling unrestricted"
            );
            return Self::unrestricted();
        }

        match response.text().await {
            Ok(body) => {
                let policy = Self::parse(&body);
                if let RobotsPolicy::Enabled { disallowed } = &policy {
                    debug!(url = %robots_url, rules = disallowed.len(), "loaded robots.txt");
                }
                policy
            }
            Err(e) => {
                warn!(
                    url = %robots_url,
                    error = %e,
                    "could not read robots.txt body, crawling unrestricted"
                );
                Self::unrestricted()
            }
        }
    }

    // Parses robots.txt text into an Enabled policy.
    //
    // Keys are case-insensitive, values keep their case (paths are
    // case-sensitive). Each "User-agent:" line decides whether the lines
    // after it apply to us.
    pub fn parse(body: &str) -> Self {
        let mut disallowed = HashSet::new();
        let mut in_wildcard_block = false;

        for line in body.lines() {
            // Drop comments, then whitespace
            let line = line.split('#').next().unwrap_or("").trim();
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();

            match key.trim().to_ascii_lowercase().as_str() {
                "user-agent" => in_wildcard_block = value == "*",
                "disallow" if in_wildcard_block && !value.is_empty() => {
                    disallowed.insert(value.to_string());
                }
                _ => {}
            }
        }

        RobotsPolicy::Enabled { disallowed }
    }

    // Checks a URL against the policy
    pub fn is_allowed(&self, url: &str) -> bool {
        match self {
            RobotsPolicy::Disabled => true,
            RobotsPolicy::Enabled { disallowed } => {
                let path = path_of(url);
                !disallowed.iter().any(|prefix| path.starts_with(prefix.as_str()))
            }
        }
    }

    fn unrestricted() -> Self {
        RobotsPolicy::Enabled {
            disallowed: HashSet::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn test_client() -> Client {
        Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap()
    }

    fn rules(policy: &RobotsPolicy) -> HashSet<String> {
        match policy {
            RobotsPolicy::Enabled { disallowed } => disallowed.clone(),
            RobotsPolicy::Disabled => panic!("expected an enabled policy"),
        }
    }

    #[test]
    fn test_parse_wildcard_block_only() {
        let body = "\
User-agent: googlebot
Disallow: /google-only

User-agent: *
Disallow: /private
DISALLOW: /Tmp/  # trailing comment
Disallow:

User-Agent: otherbot
Disallow: /other
";
        let policy = RobotsPolicy::parse(body);
        let expected: HashSet<String> =
            ["/private", "/Tmp/"].iter().map(|s| s.to_string()).collect();
        assert_eq!(rules(&policy), expected);
    }

    #[test]
    fn test_is_allowed_prefix_match() {
        let policy = RobotsPolicy::parse("User-agent: *\nDisallow: /private\n");
        assert!(!policy.is_allowed("https://x.test/private"));
        assert!(!policy.is_allowed("https://x.test/private/page?x=1"));
        assert!(!policy.is_allowed("https://x.test/private-notes"));
        assert!(policy.is_allowed("https://x.test/public"));
        assert!(policy.is_allowed("https://x.test"));
    }

    #[test]
    fn test_disabled_allows_everything() {
        let policy = RobotsPolicy::Disabled;
        assert!(policy.is_allowed("https://x.test/private"));
    }

    #[tokio::test]
    async fn test_disabled_never_fetches() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/robots.txt")
            .with_status(200)
            .with_body("User-agent: *\nDisallow: /\n")
            .expect(0)
            .create_async()
            .await;

        let policy = RobotsPolicy::load(&test_client(), &server.url(), false).await;
        assert_eq!(policy, RobotsPolicy::Disabled);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_load_enabled() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/robots.txt")
            .with_status(200)
            .with_body("User-agent: *\nDisallow: /admin\n")
            .create_async()
            .await;

        let policy = RobotsPolicy::load(&test_client(), &server.url(), true).await;
        let admin = format!("{}/admin/panel", server.url());
        let home = format!("{}/home", server.url());
        assert!(!policy.is_allowed(&admin));
        assert!(policy.is_allowed(&home));
    }

    #[tokio::test]
    async fn test_fail_open_on_404() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/robots.txt")
            .with_status(404)
            .create_async()
            .await;

        let policy = RobotsPolicy::load(&test_client(), &server.url(), true).await;
        assert!(rules(&policy).is_empty());
        assert!(policy.is_allowed(&format!("{}/anything", server.url())));
    }

    #[tokio::test]
    async fn test_fail_open_when_unreachable() {
        // Nothing listens on port 1
        let policy = RobotsPolicy::load(&test_client(), "http://127.0.0.1:1", true).await;
        assert!(rules(&policy).is_empty());
        for path in ["/", "/private", "/a/b/c"] {
            assert!(policy.is_allowed(&format!("http://127.0.0.1:1{path}")));
        }
    }
}
