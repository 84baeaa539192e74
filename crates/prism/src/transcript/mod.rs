// ABOUTME: Transcript retrieval capability for video sources.
// ABOUTME: Defines Caption/Transcript, the TranscriptSource trait, and the NoTranscripts null source.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ExtractError;
use crate::source::VideoRef;

pub mod timedtext;
pub mod youtube;

pub use youtube::YouTubeCaptions;

/// One timed caption line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Caption {
    /// Start offset in seconds.
    pub start: f64,
    /// Display duration in seconds.
    pub duration: f64,
    pub text: String,
}

impl Caption {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// A retrieved transcript plus whatever video metadata came along with it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    pub captions: Vec<Caption>,
    pub language: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub duration_secs: Option<u64>,
}

impl Transcript {
    /// True when no caption carries any text.
    pub fn is_blank(&self) -> bool {
        self.captions.iter().all(|c| c.text.trim().is_empty())
    }
}

/// Something that can produce a transcript for a video.
///
/// Implementations perform a single attempt and report a missing transcript
/// as `NoTranscript`; they never synthesize caption text.
#[async_trait]
pub trait TranscriptSource: Send + Sync + fmt::Debug {
    async fn transcript(&self, video: &VideoRef) -> Result<Transcript, ExtractError>;
}

/// A transcript source for deployments without transcript retrieval.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTranscripts;

#[async_trait]
impl TranscriptSource for NoTranscripts {
    async fn transcript(&self, video: &VideoRef) -> Result<Transcript, ExtractError> {
        Err(ExtractError::no_transcript(
            video.canonical_url(),
            "Transcript",
            Some(anyhow::anyhow!("transcript retrieval is not configured")),
        ))
    }
}
