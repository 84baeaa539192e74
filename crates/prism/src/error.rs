// ABOUTME: Error types for the extraction pipeline: the ErrorCode taxonomy and the ExtractError struct.
// ABOUTME: Provides per-code constructors, boolean helpers, and actionable user-facing messages.

use std::fmt;

/// Longest input prefix echoed back in error messages.
const MAX_DISPLAYED_INPUT: usize = 80;

/// Error codes representing the categories of extraction failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// The input was empty or could not be used at all.
    InvalidInput,
    /// DNS, connection, timeout, redirect, size, or non-2xx failure while fetching.
    Network,
    /// The video has no retrievable transcript.
    NoTranscript,
    /// Cleaning removed every paragraph.
    EmptyAfterCleaning,
    /// The input does not belong to any accepted source kind.
    UnsupportedSource,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::InvalidInput => "invalid input",
            ErrorCode::Network => "network error",
            ErrorCode::NoTranscript => "no transcript",
            ErrorCode::EmptyAfterCleaning => "empty after cleaning",
            ErrorCode::UnsupportedSource => "unsupported source",
        };
        write!(f, "{}", s)
    }
}

/// The error type for every extraction step.
///
/// `input` is the raw input (or URL) the failing step was working on and `op`
/// names the step (`Classify`, `Fetch`, `Transcript`, `Normalize`, ...).
#[derive(Debug, thiserror::Error)]
pub struct ExtractError {
    pub code: ErrorCode,
    pub input: String,
    pub op: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "prism: {} {}: {}", self.op, self.display_input(), self.code)?;
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

impl ExtractError {
    fn with_code(
        code: ErrorCode,
        input: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code,
            input: input.into(),
            op: op.into(),
            source,
        }
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(
        input: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::with_code(ErrorCode::InvalidInput, input, op, source)
    }

    /// Create a Network error.
    pub fn network(
        input: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::with_code(ErrorCode::Network, input, op, source)
    }

    /// Create a NoTranscript error.
    pub fn no_transcript(
        input: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::with_code(ErrorCode::NoTranscript, input, op, source)
    }

    /// Create an EmptyAfterCleaning error.
    pub fn empty_after_cleaning(
        input: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::with_code(ErrorCode::EmptyAfterCleaning, input, op, source)
    }

    /// Create an UnsupportedSource error.
    pub fn unsupported_source(
        input: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::with_code(ErrorCode::UnsupportedSource, input, op, source)
    }

    /// Returns true if this is an InvalidInput error.
    pub fn is_invalid_input(&self) -> bool {
        self.code == ErrorCode::InvalidInput
    }

    /// Returns true if this is a Network error.
    pub fn is_network(&self) -> bool {
        self.code == ErrorCode::Network
    }

    /// Returns true if this is a NoTranscript error.
    pub fn is_no_transcript(&self) -> bool {
        self.code == ErrorCode::NoTranscript
    }

    /// Returns true if this is an EmptyAfterCleaning error.
    pub fn is_empty_after_cleaning(&self) -> bool {
        self.code == ErrorCode::EmptyAfterCleaning
    }

    /// Returns true if this is an UnsupportedSource error.
    pub fn is_unsupported_source(&self) -> bool {
        self.code == ErrorCode::UnsupportedSource
    }

    /// The underlying cause as text, e.g. `HTTP status 404`.
    pub fn detail(&self) -> Option<String> {
        self.source.as_ref().map(|s| s.to_string())
    }

    /// A message suitable for showing to the person who supplied the input.
    pub fn user_message(&self) -> String {
        match self.code {
            ErrorCode::InvalidInput => {
                "Nothing to extract: paste a URL or some text.".to_string()
            }
            ErrorCode::Network => match self.detail() {
                Some(detail) => format!("Couldn't reach that URL ({}).", detail),
                None => "Couldn't reach that URL.".to_string(),
            },
            ErrorCode::NoTranscript => "No transcript is available for this video.".to_string(),
            ErrorCode::EmptyAfterCleaning => {
                "The page had no readable article text after removing navigation and boilerplate."
                    .to_string()
            }
            ErrorCode::UnsupportedSource => {
                "That input isn't a supported article or video URL.".to_string()
            }
        }
    }

    fn display_input(&self) -> String {
        let mut chars = self.input.chars();
        let shown: String = chars.by_ref().take(MAX_DISPLAYED_INPUT).collect();
        if chars.next().is_some() {
            format!("{}...", shown)
        } else {
            shown
        }
    }
}
