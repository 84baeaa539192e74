// ABOUTME: The Fetcher: retrieves raw content for a classified source.
// ABOUTME: Raw text passes through, articles are fetched over HTTP, videos go through a TranscriptSource.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::document::SourceMetadata;
use crate::error::ExtractError;
use crate::resource::{fetch, FetchOptions};
use crate::source::{SourceKind, VideoRef};
use crate::transcript::{Caption, TranscriptSource};

/// What a FetchResult's content is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    PlainText,
    Html,
    Transcript,
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ContentKind::PlainText => "plain text",
            ContentKind::Html => "html",
            ContentKind::Transcript => "transcript",
        };
        write!(f, "{}", s)
    }
}

/// Raw content handed from the Fetcher to the normalizer.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResult {
    pub kind: ContentKind,
    pub content: String,
    /// Timed captions, only for transcripts. May be empty.
    pub captions: Vec<Caption>,
    pub metadata: SourceMetadata,
}

impl FetchResult {
    pub fn plain_text(content: impl Into<String>) -> Self {
        Self {
            kind: ContentKind::PlainText,
            content: content.into(),
            captions: Vec::new(),
            metadata: SourceMetadata::default(),
        }
    }

    pub fn html(content: impl Into<String>, metadata: SourceMetadata) -> Self {
        Self {
            kind: ContentKind::Html,
            content: content.into(),
            captions: Vec::new(),
            metadata,
        }
    }

    /// A transcript given as captions; `content` is the caption text, one line each.
    pub fn transcript(captions: Vec<Caption>, metadata: SourceMetadata) -> Self {
        let content = captions
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        Self {
            kind: ContentKind::Transcript,
            content,
            captions,
            metadata,
        }
    }
}

/// Retrieves content for one classified input per call. Holds only shared,
/// internally synchronized handles (HTTP pool, transcript source).
#[derive(Debug, Clone)]
pub struct Fetcher {
    http: reqwest::Client,
    fetch_opts: FetchOptions,
    transcripts: Arc<dyn TranscriptSource>,
}

impl Fetcher {
    pub fn new(
        http: reqwest::Client,
        fetch_opts: FetchOptions,
        transcripts: Arc<dyn TranscriptSource>,
    ) -> Self {
        Self {
            http,
            fetch_opts,
            transcripts,
        }
    }

    /// Retrieve the raw content for `raw`, which was classified as `kind`.
    pub async fn fetch(&self, kind: SourceKind, raw: &str) -> Result<FetchResult, ExtractError> {
        match kind {
            SourceKind::RawText => Ok(FetchResult::plain_text(raw)),
            SourceKind::ArticleUrl => self.fetch_article(raw.trim()).await,
            SourceKind::VideoUrl => self.fetch_transcript(raw.trim()).await,
        }
    }

    async fn fetch_article(&self, url: &str) -> Result<FetchResult, ExtractError> {
        let response = fetch(&self.http, url, &self.fetch_opts).await?;
        let metadata = SourceMetadata {
            url: Some(response.url.clone()),
            final_url: Some(response.final_url.clone()),
            ..Default::default()
        };
        Ok(FetchResult::html(response.text(), metadata))
    }

    async fn fetch_transcript(&self, url: &str) -> Result<FetchResult, ExtractError> {
        let video = VideoRef::parse(url).ok_or_else(|| {
            ExtractError::invalid_input(
                url,
                "Fetch",
                Some(anyhow::anyhow!("not a supported video URL")),
            )
        })?;

        let transcript = self.transcripts.transcript(&video).await?;
        if transcript.is_blank() {
            return Err(ExtractError::no_transcript(
                url,
                "Transcript",
                Some(anyhow::anyhow!("transcript has no text")),
            ));
        }
        tracing::debug!(
            video_id = %video.id,
            captions = transcript.captions.len(),
            "retrieved transcript"
        );

        let metadata = SourceMetadata {
            url: Some(url.to_string()),
            title: transcript.title,
            author: transcript.author,
            language: transcript.language,
            duration_secs: transcript.duration_secs,
            video_id: Some(video.id),
            ..Default::default()
        };
        Ok(FetchResult::transcript(transcript.captions, metadata))
    }
}
