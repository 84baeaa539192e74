// ABOUTME: JSON-LD articleBody lookup for pages that ship the full article as structured data.
// ABOUTME: Walks @graph/mainEntity holders and arrays; script bodies that fail to parse are skipped.

use scraper::{Html, Selector};
use serde_json::Value;

/// Find the first non-empty `articleBody` in any JSON-LD script.
pub fn find_article_body(doc: &Html) -> Option<String> {
    let selector = Selector::parse("script[type='application/ld+json']").ok()?;
    doc.select(&selector).find_map(|script| {
        let text = script.text().collect::<String>();
        match serde_json::from_str::<Value>(text.trim()) {
            Ok(value) => article_body_in(&value),
            Err(e) => {
                tracing::debug!(error = %e, "skipping unparseable JSON-LD block");
                None
            }
        }
    })
}

fn article_body_in(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => {
            if let Some(body) = map.get("articleBody") {
                let text = match body {
                    Value::String(s) => s.clone(),
                    Value::Array(parts) => parts
                        .iter()
                        .filter_map(Value::as_str)
                        .collect::<Vec<_>>()
                        .join("\n\n"),
                    _ => String::new(),
                };
                if !text.trim().is_empty() {
                    return Some(text);
                }
            }
            for key in ["@graph", "mainEntity", "mainEntityOfPage", "itemListElement"] {
                if let Some(found) = map.get(key).and_then(article_body_in) {
                    return Some(found);
                }
            }
            None
        }
        Value::Array(items) => items.iter().find_map(article_body_in),
        _ => None,
    }
}
