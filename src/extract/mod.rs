// src/extract/mod.rs
// =============================================================================
// Page content extraction.
//
// Submodules:
// - html: visible text and links from an HTML document
// =============================================================================

mod html;

pub use html::{extract_page, ExtractedPage};
