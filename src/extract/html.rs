// src/extract/html.rs
// =============================================================================
// This module turns a downloaded HTML page into:
// - the visible text, cleaned into one phrase per line
// - every link in the page content, resolved to canonical absolute URLs
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Is built on html5ever (Mozilla's HTML parser)
//
// Rust concepts:
// - Recursion over a tree: walking the DOM node by node
// - Iterators: For processing collections
// - Closures: Anonymous functions (|x| ...)
// =============================================================================

use scraper::{ElementRef, Html, Node};
use std::collections::HashSet;

use crate::crawl::normalize::normalize;

// Elements whose whole subtree is dropped before text and link extraction:
// code, styling, and site chrome that repeats on every page
const STRIPPED_ELEMENTS: [&str; 5] = ["script", "style", "header", "footer", "nav"];

// Elements that start a new line in the extracted text, so that
// "<p>a</p><p>b</p>" reads as two lines instead of "ab"
const BLOCK_ELEMENTS: [&str; 20] = [
    "p", "div", "br", "li", "ul", "ol", "tr", "td", "th", "h1", "h2", "h3", "h4", "h5", "h6",
    "section", "article", "title", "blockquote", "pre",
];

/// Everything the crawler needs from one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedPage {
    /// Cleaned visible text, one phrase per line
    pub text: String,
    /// Canonical absolute http(s) links, in document order, duplicates removed
    pub links: Vec<String>,
}

// Parses the page once and pulls out both text and links.
//
// Parameters:
//   html: the page body
//   page_url: the page's own URL (for resolving relative links)
//
// Anchors inside stripped elements (nav, header, footer...) are not
// followed, just like their text is not kept.
pub fn extract_page(html: &str, page_url: &str) -> ExtractedPage {
    let document = Html::parse_document(html);

    let mut raw = String::new();
    let mut hrefs = Vec::new();
    walk(document.root_element(), &mut raw, &mut hrefs);

    ExtractedPage {
        text: clean_lines(&raw),
        links: resolve_links(&hrefs, page_url),
    }
}

// Normalizes every href, keeping the first occurrence of each URL
fn resolve_links(hrefs: &[&str], page_url: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    hrefs
        .iter()
        .filter_map(|href| normalize(href, page_url))
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

// Depth-first walk that appends text nodes and collects a[href] values,
// skipping stripped subtrees entirely
fn walk<'a>(element: ElementRef<'a>, out: &mut String, hrefs: &mut Vec<&'a str>) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if STRIPPED_ELEMENTS.contains(&name) {
                    continue;
                }
                if name == "a" {
                    if let Some(href) = el.attr("href") {
                        hrefs.push(href);
                    }
                }
                let is_block = BLOCK_ELEMENTS.contains(&name);
                if is_block {
                    out.push('\n');
                }
                if let Some(child_element) = ElementRef::wrap(child) {
                    walk(child_element, out, hrefs);
                }
                if is_block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

// Splits into lines, then splits each line on runs of two spaces (layout
// padding), trims every phrase, drops empties and joins with "\n".
fn clean_lines(raw: &str) -> String {
    raw.lines()
        .flat_map(|line| line.trim().split("  "))
        .map(str::trim)
        .filter(|phrase| !phrase.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative_link() {
        let html = r#"<a href="/docs">Docs</a>"#;
        let links = extract_page(html, "https://example.com/page").links;
        assert_eq!(links, vec!["https://example.com/docs"]);
    }

    #[test]
    fn test_skip_mailto_and_anchor() {
        let html = r##"
            <a href="mailto:test@example.com">Email</a>
            <a href="#section">Jump</a>
            <a href="javascript:void(0)">Click</a>
        "##;
        let links = extract_page(html, "https://example.com").links;
        assert!(links.is_empty());
    }

    #[test]
    fn test_links_are_canonical_and_unique() {
        let html = r#"
            <a href="https://example.com/a/">A</a>
            <a href="/a#part">A again</a>
            <a href="../b">B</a>
            <a href="https://other.org">Other</a>
            <a>No href</a>
        "#;
        let links = extract_page(html, "https://example.com/x/y").links;
        assert_eq!(
            links,
            vec![
                "https://example.com/a",
                "https://example.com/b",
                "https://other.org",
            ]
        );
    }

    #[test]
    fn test_text_strips_chrome_and_code() {
        let html = r#"
            <html>
              <head><style>body { color: red; }</style></head>
              <body>
                <header>Site Header</header>
                <nav><a href="/">Home</a></nav>
                <h1>Title</h1>
                <p>First   paragraph.</p>
                <script>var hidden = 1;</script>
                <p>Second<b> bold</b> words.</p>
                <footer>Copyright</footer>
              </body>
            </html>
        "#;
        let page = extract_page(html, "https://example.com");
        assert_eq!(page.text, "Title\nFirst\nparagraph.\nSecond bold words.");
        // The only link sits inside <nav>
        assert!(page.links.is_empty());
    }

    #[test]
    fn test_links_in_site_chrome_are_not_followed() {
        let html = r#"
            <header><a href="/h">Header link</a></header>
            <nav><a href="/n">Nav link</a></nav>
            <p><a href="/p">Content link</a></p>
            <script>document.write('<a href="/s">x</a>');</script>
            <footer><a href="/f">Footer link</a></footer>
        "#;
        let links = extract_page(html, "https://x.test").links;
        assert_eq!(links, vec!["https://x.test/p"]);
    }

    #[test]
    fn test_block_elements_break_lines() {
        let text = extract_page(
            "<div>one</div><div>two</div><ul><li>three</li></ul>",
            "https://example.com",
        )
        .text;
        assert_eq!(text, "one\ntwo\nthree");
    }

    #[test]
    fn test_extract_page_does_both() {
        let page = extract_page(
            r#"<p>Hello <a href="/next">next page</a></p>"#,
            "https://example.com/start",
        );
        assert_eq!(page.text, "Hello next page");
        assert_eq!(page.links, vec!["https://example.com/next"]);
    }

    #[test]
    fn test_empty_document() {
        let page = extract_page("", "https://example.com");
        assert_eq!(page, ExtractedPage::default());
    }
}
