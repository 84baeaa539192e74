// ABOUTME: Transcript segmentation: caption timing when present, sentence grouping otherwise.
// ABOUTME: Pauses start a new paragraph and paragraphs are capped in duration.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::dom::normalize_spaces;
use crate::transcript::Caption;

/// A gap between captions at least this long starts a new paragraph.
const PAUSE_SECS: f64 = 2.0;
/// A paragraph spanning this long is closed at the next caption.
const MAX_PARAGRAPH_SECS: f64 = 60.0;
const MIN_SENTENCES: usize = 3;
const MAX_SENTENCES: usize = 6;

static SOUND_CUE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\[[^\]]*\]|\([^)]*\)|♪+)\s*$").unwrap());
static SENTENCE_END_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[.!?]+["'”’)\]]*\s+"#).unwrap());

fn has_timing(captions: &[Caption]) -> bool {
    captions.iter().any(|c| c.start > 0.0 || c.duration > 0.0)
}

/// Group timed captions into paragraphs. Sound cues such as `[Music]` are dropped.
///
/// Returns None when the captions carry no timing at all.
pub fn caption_paragraphs(captions: &[Caption]) -> Option<Vec<String>> {
    if !has_timing(captions) {
        return None;
    }

    let mut paragraphs = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut para_start = 0.0;
    let mut prev_end = 0.0;

    for caption in captions {
        let text = normalize_spaces(&caption.text);
        if text.is_empty() || SOUND_CUE_RE.is_match(&text) {
            continue;
        }
        if !current.is_empty()
            && (caption.start - prev_end >= PAUSE_SECS
                || caption.start - para_start >= MAX_PARAGRAPH_SECS)
        {
            paragraphs.push(current.join(" "));
            current.clear();
        }
        if current.is_empty() {
            para_start = caption.start;
        }
        current.push(text);
        prev_end = caption.end();
    }
    if !current.is_empty() {
        paragraphs.push(current.join(" "));
    }
    Some(paragraphs)
}

fn split_sentences(text: &str) -> Vec<String> {
    let text = normalize_spaces(text);
    let mut sentences = Vec::new();
    let mut start = 0;
    for m in SENTENCE_END_RE.find_iter(&text) {
        let sentence = text[start..m.end()].trim();
        if !sentence.is_empty() {
            sentences.push(sentence.to_string());
        }
        start = m.end();
    }
    let rest = text[start..].trim();
    if !rest.is_empty() {
        sentences.push(rest.to_string());
    }
    sentences
}

/// Group untimed transcript text into pseudo-paragraphs of `per_paragraph`
/// sentences, clamped to 3..=6.
pub fn sentence_paragraphs(text: &str, per_paragraph: usize) -> Vec<String> {
    let per_paragraph = per_paragraph.clamp(MIN_SENTENCES, MAX_SENTENCES);
    split_sentences(text)
        .chunks(per_paragraph)
        .map(|group| group.join(" "))
        .collect()
}
