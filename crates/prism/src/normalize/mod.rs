// ABOUTME: The Cleaner/Normalizer: turns a FetchResult into a CanonicalDocument.
// ABOUTME: Dispatches on ContentKind to the HTML, plain-text, and transcript paths.

pub mod html;
pub mod plain;
pub mod transcript;

use crate::document::{CanonicalDocument, SourceMetadata};
use crate::error::ExtractError;
use crate::fetch::{ContentKind, FetchResult};
use crate::source::SourceKind;

/// Longest content prefix used to label an error when there is no URL.
const ERROR_LABEL_CHARS: usize = 80;

/// Tunables for normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// HTML paragraphs shorter than this (in characters) are dropped.
    pub min_paragraph_chars: usize,
    /// Sentences per pseudo-paragraph for untimed transcripts (clamped to 3..=6).
    pub sentences_per_paragraph: usize,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            min_paragraph_chars: 20,
            sentences_per_paragraph: 5,
        }
    }
}

fn source_kind_for(kind: ContentKind) -> SourceKind {
    match kind {
        ContentKind::PlainText => SourceKind::RawText,
        ContentKind::Html => SourceKind::ArticleUrl,
        ContentKind::Transcript => SourceKind::VideoUrl,
    }
}

/// Clean fetched content into a canonical document.
///
/// Fails with `EmptyAfterCleaning` when no paragraph survives.
pub fn normalize(
    result: FetchResult,
    opts: &NormalizeOptions,
) -> Result<CanonicalDocument, ExtractError> {
    let FetchResult {
        kind,
        content,
        captions,
        mut metadata,
    } = result;
    let url = metadata.url.clone();

    let paragraphs = match kind {
        ContentKind::PlainText => plain::split_paragraphs(&content),
        ContentKind::Html => {
            let page = html::html_content(&content, opts.min_paragraph_chars);
            metadata.merge_missing(page.metadata);
            page.paragraphs
        }
        ContentKind::Transcript => transcript::caption_paragraphs(&captions).unwrap_or_else(|| {
            transcript::sentence_paragraphs(&content, opts.sentences_per_paragraph)
        }),
    };
    tracing::debug!(kind = %kind, paragraphs = paragraphs.len(), "normalized content");

    CanonicalDocument::from_paragraphs(paragraphs, source_kind_for(kind), metadata).ok_or_else(
        || {
            ExtractError::empty_after_cleaning(
                url.unwrap_or_else(|| content.chars().take(ERROR_LABEL_CHARS).collect()),
                "Normalize",
                Some(anyhow::anyhow!("no {} paragraphs left after cleaning", kind)),
            )
        },
    )
}

/// Normalize markup that was fetched elsewhere. `url` is recorded in the metadata.
pub fn normalize_html(
    html: &str,
    url: &str,
    opts: &NormalizeOptions,
) -> Result<CanonicalDocument, ExtractError> {
    let metadata = SourceMetadata {
        url: Some(url.to_string()).filter(|u| !u.is_empty()),
        ..Default::default()
    };
    normalize(FetchResult::html(html, metadata), opts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::Caption;
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_text_keeps_short_paragraphs() {
        let doc = normalize(
            FetchResult::plain_text("  Just a short raw note.  "),
            &NormalizeOptions::default(),
        )
        .unwrap();
        assert_eq!(doc.paragraphs(), &["Just a short raw note.".to_string()]);
        assert_eq!(doc.source_kind(), SourceKind::RawText);
    }

    #[test]
    fn two_plain_paragraphs() {
        let doc = normalize(
            FetchResult::plain_text("First one.\n\nSecond one."),
            &NormalizeOptions::default(),
        )
        .unwrap();
        assert_eq!(doc.paragraphs().len(), 2);
        assert_eq!(doc.char_count(), 21);
    }

    #[test]
    fn nav_only_html_is_empty_after_cleaning() {
        let err = normalize_html(
            "<html><body><nav><a href='/'>Home</a> <a href='/blog'>All of our blog posts</a></nav></body></html>",
            "https://example.com/article",
            &NormalizeOptions::default(),
        )
        .unwrap_err();
        assert!(err.is_empty_after_cleaning());
        assert_eq!(err.input, "https://example.com/article");
    }

    #[test]
    fn error_without_url_is_labelled_by_a_short_prefix() {
        let links: String = (0..200)
            .map(|i| format!("<a href='/p/{i}'>Archive page number {i}</a>"))
            .collect();
        let html = format!("<html><body><nav>{}</nav></body></html>", links);
        let err = normalize_html(&html, "", &NormalizeOptions::default()).unwrap_err();
        assert!(err.is_empty_after_cleaning());
        assert_eq!(err.input.chars().count(), ERROR_LABEL_CHARS);
        assert!(html.starts_with(&err.input));
    }

    #[test]
    fn whitespace_plain_text_is_empty_after_cleaning() {
        let err = normalize(FetchResult::plain_text("\n\n  \n"), &NormalizeOptions::default())
            .unwrap_err();
        assert!(err.is_empty_after_cleaning());
    }

    #[test]
    fn html_metadata_fills_gaps_only() {
        let doc = normalize_html(
            "<html lang='fr'><head><title>Titre</title></head><body><p>Un paragraphe assez long pour rester.</p></body></html>",
            "https://example.fr/a",
            &NormalizeOptions::default(),
        )
        .unwrap();
        assert_eq!(doc.metadata().url.as_deref(), Some("https://example.fr/a"));
        assert_eq!(doc.metadata().title.as_deref(), Some("Titre"));
        assert_eq!(doc.metadata().language.as_deref(), Some("fr"));
        assert_eq!(doc.source_kind(), SourceKind::ArticleUrl);
    }

    #[test]
    fn min_paragraph_chars_is_configurable() {
        let opts = NormalizeOptions {
            min_paragraph_chars: 1,
            ..Default::default()
        };
        let doc = normalize_html("<body><p>Tiny.</p></body>", "", &opts).unwrap();
        assert_eq!(doc.paragraphs(), &["Tiny.".to_string()]);
    }

    #[test]
    fn timed_transcript_uses_caption_timing() {
        let captions = vec![
            Caption {
                start: 0.0,
                duration: 1.0,
                text: "first bit".to_string(),
            },
            Caption {
                start: 5.0,
                duration: 1.0,
                text: "second bit".to_string(),
            },
        ];
        let doc = normalize(
            FetchResult::transcript(captions, SourceMetadata::default()),
            &NormalizeOptions::default(),
        )
        .unwrap();
        assert_eq!(
            doc.paragraphs(),
            &["first bit".to_string(), "second bit".to_string()]
        );
        assert_eq!(doc.source_kind(), SourceKind::VideoUrl);
    }

    #[test]
    fn untimed_transcript_groups_sentences() {
        let result = FetchResult {
            kind: ContentKind::Transcript,
            content: "One. Two. Three. Four.".to_string(),
            captions: Vec::new(),
            metadata: SourceMetadata::default(),
        };
        let opts = NormalizeOptions {
            sentences_per_paragraph: 3,
            ..Default::default()
        };
        let doc = normalize(result, &opts).unwrap();
        assert_eq!(
            doc.paragraphs(),
            &["One. Two. Three.".to_string(), "Four.".to_string()]
        );
    }
}
