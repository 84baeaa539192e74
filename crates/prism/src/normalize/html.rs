// ABOUTME: HTML article normalization: picks a content root, collects block text, and filters noise.
// ABOUTME: Falls back to JSON-LD articleBody when the DOM yields too little text.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::plain::split_paragraphs;
use crate::document::SourceMetadata;
use crate::dom::blocks::collect_blocks;
use crate::dom::cleaners::in_boilerplate;
use crate::dom::ld_json::find_article_body;
use crate::dom::metadata::extract_metadata;
use crate::dom::normalize_spaces;

/// Article containers, most specific first.
const CONTENT_ROOT_SELECTORS: &[&str] = &[
    "[itemprop='articleBody']",
    "article",
    ".article-content",
    ".post-content",
    ".entry-content",
    ".post-body",
    "main",
    "#content",
    ".content",
];

/// A content root must yield at least this much text to be used.
const MIN_ROOT_CHARS: usize = 300;
/// Below this much DOM text the JSON-LD articleBody is consulted.
const LD_JSON_FALLBACK_CHARS: usize = 500;
/// Only paragraphs shorter than this are checked against the noise phrases.
const NOISE_MAX_CHARS: usize = 120;

static NOISE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(follow us on|sign up|subscribe to|advertisement|read more|related articles?|cookie policy|share this|click here|\d+\s+min(ute)?s?\s+read|posted (on|by)|published on|comments?\s*\d*$|leave a (reply|comment))",
    )
    .unwrap()
});

static BODY_SELECTOR: Lazy<Option<Selector>> = Lazy::new(|| Selector::parse("body").ok());

/// Paragraphs and metadata recovered from one HTML page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HtmlContent {
    pub paragraphs: Vec<String>,
    pub metadata: SourceMetadata,
}

fn total_chars(paragraphs: &[String]) -> usize {
    paragraphs.iter().map(|p| p.chars().count()).sum()
}

fn is_noise(paragraph: &str) -> bool {
    paragraph.chars().count() < NOISE_MAX_CHARS && NOISE_RE.is_match(paragraph)
}

/// Drop short, noisy, and repeated paragraphs, keeping order.
fn filter_paragraphs(blocks: Vec<String>, min_chars: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    blocks
        .into_iter()
        .filter(|p| p.chars().count() >= min_chars)
        .filter(|p| !is_noise(p))
        .filter(|p| seen.insert(p.to_lowercase()))
        .collect()
}

fn root_paragraphs(root: ElementRef<'_>, min_chars: usize) -> Vec<String> {
    filter_paragraphs(collect_blocks(root), min_chars)
}

/// Paragraphs from the first article container that holds enough text.
fn content_root_paragraphs(doc: &Html, min_chars: usize) -> Option<Vec<String>> {
    CONTENT_ROOT_SELECTORS.iter().find_map(|s| {
        let sel = Selector::parse(s).ok()?;
        let root = doc.select(&sel).find(|el| !in_boilerplate(el))?;
        let paragraphs = root_paragraphs(root, min_chars);
        if total_chars(&paragraphs) >= MIN_ROOT_CHARS {
            tracing::debug!(selector = %s, paragraphs = paragraphs.len(), "using content root");
            Some(paragraphs)
        } else {
            None
        }
    })
}

fn body_paragraphs(doc: &Html, min_chars: usize) -> Vec<String> {
    BODY_SELECTOR
        .as_ref()
        .and_then(|sel| doc.select(sel).next())
        .map(|body| root_paragraphs(body, min_chars))
        .unwrap_or_default()
}

fn ld_json_paragraphs(doc: &Html, min_chars: usize) -> Option<Vec<String>> {
    let body = find_article_body(doc)?;
    // articleBody is sometimes markup rather than text.
    let text = if body.contains('<') {
        let fragment = Html::parse_fragment(&body);
        collect_blocks(fragment.root_element()).join("\n\n")
    } else {
        body
    };
    let blocks = split_paragraphs(&text)
        .iter()
        .map(|p| normalize_spaces(p))
        .collect();
    Some(filter_paragraphs(blocks, min_chars))
}

/// Extract readable paragraphs and metadata from an HTML page.
pub fn html_content(html: &str, min_paragraph_chars: usize) -> HtmlContent {
    let doc = Html::parse_document(html);

    let mut paragraphs = content_root_paragraphs(&doc, min_paragraph_chars)
        .unwrap_or_else(|| body_paragraphs(&doc, min_paragraph_chars));

    let dom_chars = total_chars(&paragraphs);
    if dom_chars < LD_JSON_FALLBACK_CHARS {
        if let Some(ld) = ld_json_paragraphs(&doc, min_paragraph_chars) {
            if total_chars(&ld) > dom_chars {
                tracing::debug!(dom_chars, "using JSON-LD articleBody");
                paragraphs = ld;
            }
        }
    }

    HtmlContent {
        paragraphs,
        metadata: extract_metadata(&doc),
    }
}
