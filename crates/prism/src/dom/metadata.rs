// ABOUTME: Best-effort document metadata from HTML: title, author, site name, language.
// ABOUTME: Each field tries an ordered list of selectors and keeps the first non-empty value.

use scraper::{Html, Selector};

use super::normalize_spaces;
use crate::document::SourceMetadata;

const TITLE_TEXT_SELECTORS: &[&str] = &["head > title", "h1"];
const TITLE_META_SELECTORS: &[&str] = &["meta[property='og:title']", "meta[name='twitter:title']"];
const AUTHOR_META_SELECTORS: &[&str] = &[
    "meta[name='author']",
    "meta[property='article:author']",
    "meta[name='parsely-author']",
];
const AUTHOR_TEXT_SELECTORS: &[&str] = &["[rel='author']", "[itemprop='author']", ".byline"];
const SITE_NAME_SELECTORS: &[&str] = &["meta[property='og:site_name']", "meta[name='application-name']"];

fn first_text(doc: &Html, selectors: &[&str]) -> Option<String> {
    selectors.iter().find_map(|s| {
        let sel = Selector::parse(s).ok()?;
        doc.select(&sel)
            .map(|el| normalize_spaces(&el.text().collect::<String>()))
            .find(|t| !t.is_empty())
    })
}

fn first_content(doc: &Html, selectors: &[&str]) -> Option<String> {
    selectors.iter().find_map(|s| {
        let sel = Selector::parse(s).ok()?;
        doc.select(&sel)
            .filter_map(|el| el.value().attr("content"))
            .map(normalize_spaces)
            .find(|t| !t.is_empty())
    })
}

/// Pull metadata out of a parsed document. Missing fields stay None.
pub fn extract_metadata(doc: &Html) -> SourceMetadata {
    let title = first_text(doc, &TITLE_TEXT_SELECTORS[..1])
        .or_else(|| first_content(doc, TITLE_META_SELECTORS))
        .or_else(|| first_text(doc, &TITLE_TEXT_SELECTORS[1..]));
    let author = first_content(doc, AUTHOR_META_SELECTORS)
        .or_else(|| first_text(doc, AUTHOR_TEXT_SELECTORS))
        .map(|a| a.trim_start_matches("By ").trim_start_matches("by ").to_string());
    let site_name = first_content(doc, SITE_NAME_SELECTORS);
    let language = Selector::parse("html")
        .ok()
        .and_then(|sel| {
            doc.select(&sel)
                .next()
                .and_then(|el| el.value().attr("lang"))
                .map(|l| l.trim().to_string())
        })
        .filter(|l| !l.is_empty());

    SourceMetadata {
        title,
        author,
        site_name,
        language,
        ..Default::default()
    }
}
