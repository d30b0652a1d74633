// src/crawl/normalize.rs
// =============================================================================
// URL canonicalization and domain scoping.
//
// Every URL the crawler stores or compares goes through normalize() first, so
// two spellings of the same page ("/docs/", "/docs#intro", "/docs") end up as
// one string:
//
//   https://Example.com/docs/#intro  ->  https://example.com/docs
//
// Canonical form: scheme + host (+ non-default port) + path + query,
// with no fragment and no trailing slash.
// =============================================================================

use url::Url;

// Link prefixes that can never be fetched over HTTP
const SKIPPED_PREFIXES: [&str; 3] = ["mailto:", "tel:", "javascript:"];

// Checks that a seed URL is a well-formed http(s) URL with a host.
// Never panics on garbage input, it just returns false.
pub fn is_valid(url: &str) -> bool {
    match Url::parse(url.trim()) {
        Ok(parsed) => {
            is_fetchable_scheme(&parsed)
                && parsed.host_str().map_or(false, |host| !host.is_empty())
        }
        Err(_) => false,
    }
}

// Resolves `href` against `base` and returns the canonical absolute URL.
//
// Returns None for:
//   - empty links
//   - mailto:, tel:, javascript: links
//   - pure fragments like "#section" (same page)
//   - anything that does not end up as http/https
//   - links that cannot be resolved at all
//
// normalize(normalize(x, b), b) == normalize(x, b) for every input.
pub fn normalize(href: &str, base: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if SKIPPED_PREFIXES
        .iter()
        .any(|prefix| lowered.starts_with(prefix))
    {
        return None;
    }

    // Absolute links parse on their own; relative ones need the base
    let mut resolved = match Url::parse(href) {
        Ok(url) => url,
        Err(_) => Url::parse(base).ok()?.join(href).ok()?,
    };

    if !is_fetchable_scheme(&resolved) || resolved.host_str().is_none() {
        return None;
    }

    resolved.set_fragment(None);
    Some(strip_trailing_slashes(resolved.as_str()))
}

// True when both URLs point at the same host.
// Scheme and port are ignored: http://x.test and https://x.test:8443 match.
pub fn same_domain(a: &str, b: &str) -> bool {
    match (host_of(a), host_of(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

// Lowercased host of a URL, if it has one
pub fn host_of(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(|host| host.to_ascii_lowercase()))
}

// Path component used for robots.txt matching ("" if the URL won't parse)
pub fn path_of(url: &str) -> String {
    Url::parse(url)
        .map(|parsed| parsed.path().to_string())
        .unwrap_or_default()
}

// scheme://host[:port] of a URL, where robots.txt lives
pub fn origin_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    if parsed.host_str().is_none() {
        return None;
    }
    Some(parsed.origin().ascii_serialization())
}

fn is_fetchable_scheme(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

// The url crate always serializes a bare host with a "/" path
// ("https://x.test" -> "https://x.test/"), so every trailing slash is removed
// rather than just one; otherwise a second pass could strip another.
fn strip_trailing_slashes(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}
