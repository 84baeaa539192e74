// ABOUTME: Plain-text paragraph splitting on blank-line boundaries.

use once_cell::sync::Lazy;
use regex::Regex;

static BLANK_LINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n[^\S\n]*\n\s*").unwrap());

/// Split text into trimmed, non-empty paragraphs. Line breaks inside a
/// paragraph are kept; no length filter is applied.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    BLANK_LINE_RE
        .split(&text)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn two_paragraphs_split_on_blank_line() {
        assert_eq!(
            split_paragraphs("  First paragraph.  \n\nSecond paragraph.\n"),
            vec!["First paragraph.", "Second paragraph."]
        );
    }

    #[test]
    fn whitespace_only_lines_count_as_blank() {
        assert_eq!(
            split_paragraphs("one\n \t \n\n\ntwo\r\n\r\nthree"),
            vec!["one", "two", "three"]
        );
    }

    #[test]
    fn single_newlines_stay_inside_a_paragraph() {
        assert_eq!(split_paragraphs("line one\nline two"), vec!["line one\nline two"]);
    }

    #[test]
    fn canonical_text_is_unchanged() {
        let text = "Just a short raw note.";
        assert_eq!(split_paragraphs(text), vec![text]);
        assert!(split_paragraphs(" \n\n ").is_empty());
    }
}
