// ABOUTME: DOM cleaning and traversal utilities for HTML article extraction.
// ABOUTME: Boilerplate detection, block-level paragraph collection, metadata, and JSON-LD lookup.

//! DOM utilities for turning parsed HTML into paragraphs.
//!
//! - `cleaners`: decides which elements are noise (tags, class/id tokens, roles).
//! - `blocks`: walks a subtree and emits one string per block-level text run.
//! - `metadata`: title, author, site name, and language from the document head.
//! - `ld_json`: `articleBody` lookup inside JSON-LD scripts.

pub mod blocks;
pub mod cleaners;
pub mod ld_json;
pub mod metadata;

/// Collapse every run of whitespace to one space and trim the ends.
pub fn normalize_spaces(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
