// ABOUTME: CanonicalDocument, the paragraph-structured output of extraction, and its SourceMetadata.
// ABOUTME: Includes hand-off helpers: joined text, word/token estimates, and head/tail truncation.

use serde::{Deserialize, Serialize};

use crate::source::SourceKind;

/// Share of the truncation budget spent on the start of the document.
const HEAD_SHARE_PERCENT: usize = 65;

/// Best-effort facts about where a document came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// URL after redirects.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
}

impl SourceMetadata {
    /// Fill every field that is still None from `other`.
    pub fn merge_missing(&mut self, other: SourceMetadata) {
        fn fill<T>(slot: &mut Option<T>, value: Option<T>) {
            if slot.is_none() {
                *slot = value;
            }
        }
        fill(&mut self.url, other.url);
        fill(&mut self.final_url, other.final_url);
        fill(&mut self.title, other.title);
        fill(&mut self.author, other.author);
        fill(&mut self.site_name, other.site_name);
        fill(&mut self.language, other.language);
        fill(&mut self.duration_secs, other.duration_secs);
        fill(&mut self.video_id, other.video_id);
    }
}

/// Cleaned, paragraph-structured plain text.
///
/// Paragraphs are in reading order, never empty, and carry no markup. A
/// document always has at least one paragraph; failures are reported as
/// [`crate::ExtractError`] instead.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalDocument {
    paragraphs: Vec<String>,
    char_count: usize,
    source_kind: SourceKind,
    metadata: SourceMetadata,
}

impl CanonicalDocument {
    /// Build a document, dropping blank paragraphs. None if nothing is left.
    pub(crate) fn from_paragraphs(
        paragraphs: Vec<String>,
        source_kind: SourceKind,
        metadata: SourceMetadata,
    ) -> Option<Self> {
        let paragraphs: Vec<String> = paragraphs
            .into_iter()
            .filter(|p| !p.trim().is_empty())
            .collect();
        if paragraphs.is_empty() {
            return None;
        }
        let char_count = paragraphs.iter().map(|p| p.chars().count()).sum();
        Some(Self {
            paragraphs,
            char_count,
            source_kind,
            metadata,
        })
    }

    pub fn paragraphs(&self) -> &[String] {
        &self.paragraphs
    }

    /// Characters across all paragraphs, separators excluded.
    pub fn char_count(&self) -> usize {
        self.char_count
    }

    pub fn source_kind(&self) -> SourceKind {
        self.source_kind
    }

    pub fn metadata(&self) -> &SourceMetadata {
        &self.metadata
    }

    /// Paragraphs joined by blank lines.
    pub fn text(&self) -> String {
        self.paragraphs.join("\n\n")
    }

    pub fn word_count(&self) -> usize {
        self.paragraphs
            .iter()
            .map(|p| p.split_whitespace().count())
            .sum()
    }

    /// Rough model-token estimate at four characters per token.
    pub fn estimated_tokens(&self) -> usize {
        (self.char_count / 4).max(1)
    }

    /// Shorten the document to about `max_chars` characters.
    ///
    /// Keeps whole paragraphs from the start (65% of the budget) and from the
    /// end (the rest), with a `[... N characters truncated ...]` paragraph in
    /// between. A side whose first paragraph alone exceeds its budget keeps a
    /// cut of that paragraph instead. Documents that fit are returned as-is.
    pub fn truncate(&self, max_chars: usize) -> CanonicalDocument {
        if self.char_count <= max_chars {
            return self.clone();
        }
        let head_budget = max_chars * HEAD_SHARE_PERCENT / 100;
        let tail_budget = max_chars - head_budget;
        let lens: Vec<usize> = self.paragraphs.iter().map(|p| p.chars().count()).collect();
        let n = self.paragraphs.len();

        let mut head = Vec::new();
        let mut used = 0;
        let mut next = 0;
        while next < n && used + lens[next] <= head_budget {
            used += lens[next];
            head.push(self.paragraphs[next].clone());
            next += 1;
        }
        if head.is_empty() && head_budget > 0 {
            let cut: String = self.paragraphs[0].chars().take(head_budget).collect();
            head.push(cut.trim_end().to_string());
            next = 1;
        }

        let mut tail = Vec::new();
        let mut used = 0;
        let mut back = n;
        while back > next && used + lens[back - 1] <= tail_budget {
            back -= 1;
            used += lens[back];
            tail.push(self.paragraphs[back].clone());
        }
        if tail.is_empty() && tail_budget > 0 {
            let last = &self.paragraphs[n - 1];
            let cut: String = last.chars().skip(lens[n - 1] - tail_budget).collect();
            tail.push(cut.trim_start().to_string());
        }
        tail.reverse();

        let kept: usize = head
            .iter()
            .chain(tail.iter())
            .map(|p| p.chars().count())
            .sum();
        let marker = format!(
            "[... {} characters truncated ...]",
            self.char_count.saturating_sub(kept)
        );

        let mut paragraphs = head;
        paragraphs.push(marker);
        paragraphs.extend(tail);
        let paragraphs: Vec<String> = paragraphs.into_iter().filter(|p| !p.is_empty()).collect();
        let char_count = paragraphs.iter().map(|p| p.chars().count()).sum();
        CanonicalDocument {
            paragraphs,
            char_count,
            source_kind: self.source_kind,
            metadata: self.metadata.clone(),
        }
    }
}
