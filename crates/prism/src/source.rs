// ABOUTME: Source classification: decides whether an input is a video URL, an article URL, or raw text.
// ABOUTME: Also parses VideoRef (host + id) from allowlisted video-hosting URLs.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ExtractError;

static YOUTUBE_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").unwrap());
static VIMEO_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{4,12}$").unwrap());

/// The kind of source an input string refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    RawText,
    ArticleUrl,
    VideoUrl,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SourceKind::RawText => "raw text",
            SourceKind::ArticleUrl => "article URL",
            SourceKind::VideoUrl => "video URL",
        };
        write!(f, "{}", s)
    }
}

/// Video hosts on the classifier allowlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoHost {
    YouTube,
    Vimeo,
}

/// A video identified by host and the host's own video id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VideoRef {
    pub host: VideoHost,
    pub id: String,
}

impl VideoRef {
    /// Parse a video reference from an allowlisted video URL.
    ///
    /// Returns None for non-URLs, hosts outside the allowlist, and allowlisted
    /// hosts whose path is not a single-video page (channels, playlists, ...).
    pub fn parse(raw: &str) -> Option<Self> {
        let url = parse_web_url(raw.trim())?;
        let host = url.host_str()?.to_ascii_lowercase();
        let host = host.strip_prefix("www.").unwrap_or(&host);
        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|p| !p.is_empty()).collect())
            .unwrap_or_default();

        match host {
            "youtube.com" | "m.youtube.com" | "music.youtube.com" => {
                let id = match segments.as_slice() {
                    ["watch"] => url
                        .query_pairs()
                        .find(|(k, _)| k == "v")
                        .map(|(_, v)| v.into_owned()),
                    ["shorts" | "embed" | "live" | "v", id, ..] => Some((*id).to_string()),
                    _ => None,
                }?;
                Self::youtube(id)
            }
            "youtu.be" => segments.first().and_then(|id| Self::youtube(id.to_string())),
            "youtube-nocookie.com" => match segments.as_slice() {
                ["embed", id, ..] => Self::youtube(id.to_string()),
                _ => None,
            },
            "vimeo.com" => match segments.as_slice() {
                [id] => Self::vimeo(id),
                _ => None,
            },
            "player.vimeo.com" => match segments.as_slice() {
                ["video", id, ..] => Self::vimeo(id),
                _ => None,
            },
            _ => None,
        }
    }

    /// Canonical watch URL for this video.
    pub fn canonical_url(&self) -> String {
        match self.host {
            VideoHost::YouTube => format!("https://www.youtube.com/watch?v={}", self.id),
            VideoHost::Vimeo => format!("https://vimeo.com/{}", self.id),
        }
    }

    fn youtube(id: String) -> Option<Self> {
        YOUTUBE_ID_RE.is_match(&id).then_some(Self {
            host: VideoHost::YouTube,
            id,
        })
    }

    fn vimeo(id: &str) -> Option<Self> {
        VIMEO_ID_RE.is_match(id).then(|| Self {
            host: VideoHost::Vimeo,
            id: id.to_string(),
        })
    }
}

/// Parse an absolute http(s) URL with a host. Strings containing whitespace
/// are never URLs, so a note that merely starts with a link stays raw text.
pub(crate) fn parse_web_url(s: &str) -> Option<Url> {
    if s.is_empty() || s.chars().any(char::is_whitespace) {
        return None;
    }
    let url = Url::parse(s).ok()?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }
    match url.host_str() {
        Some(host) if !host.is_empty() => Some(url),
        _ => None,
    }
}

/// Classify an input string. First match wins: video URL, then any
/// http(s) URL, then raw text. Empty or whitespace-only input is rejected.
pub fn classify(raw: &str) -> Result<SourceKind, ExtractError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ExtractError::invalid_input(
            raw,
            "Classify",
            Some(anyhow::anyhow!("input is empty")),
        ));
    }
    if VideoRef::parse(trimmed).is_some() {
        return Ok(SourceKind::VideoUrl);
    }
    if parse_web_url(trimmed).is_some() {
        return Ok(SourceKind::ArticleUrl);
    }
    Ok(SourceKind::RawText)
}

/// A raw input together with its derived kind. The kind cannot be set by
/// callers; it always comes from [`classify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceInput {
    raw_value: String,
    kind: SourceKind,
}

impl SourceInput {
    pub fn parse(raw: impl Into<String>) -> Result<Self, ExtractError> {
        let raw_value = raw.into();
        let kind = classify(&raw_value)?;
        Ok(Self { raw_value, kind })
    }

    pub fn raw_value(&self) -> &str {
        &self.raw_value
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    /// The parsed video reference, for video inputs.
    pub fn video(&self) -> Option<VideoRef> {
        match self.kind {
            SourceKind::VideoUrl => VideoRef::parse(&self.raw_value),
            SourceKind::RawText | SourceKind::ArticleUrl => None,
        }
    }
}
