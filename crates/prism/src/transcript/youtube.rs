// ABOUTME: YouTube caption-track resolver: watch page -> captionTracks -> timed-text XML.
// ABOUTME: Reports NoTranscript when a video exposes no usable caption track.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use serde::Deserialize;
use url::Url;

use super::timedtext::parse_timedtext;
use super::{Transcript, TranscriptSource};
use crate::error::ExtractError;
use crate::resource::{fetch, FetchOptions};
use crate::source::{VideoHost, VideoRef};

const DEFAULT_BASE_URL: &str = "https://www.youtube.com";
const CAPTION_TRACKS_KEY: &str = "\"captionTracks\":";

static LENGTH_SECONDS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""lengthSeconds"\s*:\s*"(\d+)""#).unwrap());

/// One entry of the player response's `captionTracks` array.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CaptionTrack {
    #[serde(rename = "baseUrl")]
    base_url: String,
    #[serde(rename = "languageCode", default)]
    language_code: String,
    #[serde(default)]
    kind: Option<String>,
}

impl CaptionTrack {
    fn is_auto_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }
}

/// Resolves YouTube transcripts from the caption tracks listed on the watch page.
#[derive(Debug, Clone)]
pub struct YouTubeCaptions {
    http: reqwest::Client,
    base_url: String,
    lang: String,
    fetch_opts: FetchOptions,
}

impl YouTubeCaptions {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            lang: "en".to_string(),
            fetch_opts: FetchOptions::default(),
        }
    }

    /// Override the site root (used to point at a mirror or a mock server).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Preferred caption language, e.g. `en` or `pt-BR`.
    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    pub fn fetch_options(mut self, opts: FetchOptions) -> Self {
        self.fetch_opts = opts;
        self
    }

    fn watch_url(&self, id: &str) -> String {
        format!("{}/watch?v={}", self.base_url, id)
    }

    fn resolve_track_url(&self, track: &CaptionTrack, input: &str) -> Result<String, ExtractError> {
        Url::parse(&self.base_url)
            .and_then(|base| base.join(&track.base_url))
            .map(String::from)
            .map_err(|e| {
                ExtractError::no_transcript(
                    input,
                    "Transcript",
                    Some(anyhow::anyhow!("unusable caption track URL: {}", e)),
                )
            })
    }
}

/// Locate and decode the `captionTracks` array embedded in a watch page.
pub(crate) fn find_caption_tracks(page: &str) -> Vec<CaptionTrack> {
    let Some(idx) = page.find(CAPTION_TRACKS_KEY) else {
        return Vec::new();
    };
    let rest = &page[idx + CAPTION_TRACKS_KEY.len()..];
    serde_json::Deserializer::from_str(rest)
        .into_iter::<Vec<CaptionTrack>>()
        .next()
        .and_then(Result::ok)
        .unwrap_or_default()
}

/// Prefer a manual track in the requested language, then an auto-generated
/// one, then any track sharing the base language, then whatever comes first.
fn pick_track<'a>(tracks: &'a [CaptionTrack], lang: &str) -> Option<&'a CaptionTrack> {
    let base_lang = |code: &str| code.split('-').next().unwrap_or(code).to_ascii_lowercase();
    let wanted = base_lang(lang);

    tracks
        .iter()
        .find(|t| t.language_code.eq_ignore_ascii_case(lang) && !t.is_auto_generated())
        .or_else(|| {
            tracks
                .iter()
                .find(|t| t.language_code.eq_ignore_ascii_case(lang))
        })
        .or_else(|| tracks.iter().find(|t| base_lang(&t.language_code) == wanted))
        .or_else(|| tracks.first())
}

fn first_attr(doc: &Html, selector: &str, attr: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    doc.select(&sel)
        .filter_map(|el| el.value().attr(attr))
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map(str::to_string)
}

/// Title, channel name, and length from the watch page, when present.
fn page_metadata(page: &str) -> (Option<String>, Option<String>, Option<u64>) {
    let doc = Html::parse_document(page);
    let title = first_attr(&doc, "meta[name='title']", "content")
        .or_else(|| first_attr(&doc, "meta[property='og:title']", "content"));
    let author = first_attr(&doc, "link[itemprop='name']", "content");
    let duration = LENGTH_SECONDS_RE
        .captures(page)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok());
    (title, author, duration)
}

#[async_trait]
impl TranscriptSource for YouTubeCaptions {
    async fn transcript(&self, video: &VideoRef) -> Result<Transcript, ExtractError> {
        let input = video.canonical_url();
        if video.host != VideoHost::YouTube {
            return Err(ExtractError::no_transcript(
                input,
                "Transcript",
                Some(anyhow::anyhow!(
                    "transcripts are only retrieved for YouTube videos"
                )),
            ));
        }

        let page = fetch(&self.http, &self.watch_url(&video.id), &self.fetch_opts)
            .await?
            .text();
        let tracks = find_caption_tracks(&page);
        tracing::debug!(video_id = %video.id, tracks = tracks.len(), "found caption tracks");

        let Some(track) = pick_track(&tracks, &self.lang) else {
            return Err(ExtractError::no_transcript(
                input,
                "Transcript",
                Some(anyhow::anyhow!("video has no caption tracks")),
            ));
        };

        let track_url = self.resolve_track_url(track, &input)?;
        let xml = fetch(&self.http, &track_url, &self.fetch_opts).await?.text();
        let captions = parse_timedtext(&xml)
            .map_err(|e| ExtractError::no_transcript(input.as_str(), "Transcript", Some(e)))?;
        if captions.is_empty() {
            return Err(ExtractError::no_transcript(
                input,
                "Transcript",
                Some(anyhow::anyhow!("caption track is empty")),
            ));
        }

        let (title, author, duration_secs) = page_metadata(&page);
        Ok(Transcript {
            captions,
            language: Some(track.language_code.clone()).filter(|l| !l.is_empty()),
            title,
            author,
            duration_secs,
        })
    }
}
