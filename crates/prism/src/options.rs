// ABOUTME: Configuration for the extraction pipeline: the Options struct and the fluent ExtractorBuilder.
// ABOUTME: Defaults mirror a desktop browser fetching a page with a 10s timeout and 5 redirects.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::error::ExtractError;
use crate::extractor::Extractor;
use crate::normalize::NormalizeOptions;
use crate::transcript::TranscriptSource;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

fn default_headers() -> HashMap<String, String> {
    HashMap::from([
        (
            "Accept".to_string(),
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".to_string(),
        ),
        ("Accept-Language".to_string(), "en-US,en;q=0.9".to_string()),
    ])
}

/// Configuration options for an [`Extractor`].
#[derive(Debug, Clone)]
pub struct Options {
    pub timeout: Duration,
    pub max_redirects: usize,
    pub user_agent: String,
    pub headers: HashMap<String, String>,
    pub allow_private_networks: bool,
    pub min_paragraph_chars: usize,
    pub sentences_per_paragraph: usize,
    /// Preferred caption language for video transcripts.
    pub transcript_lang: String,
    /// When false, inputs that classify as raw text are rejected as unsupported.
    pub accept_raw_text: bool,
    pub http_client: Option<reqwest::Client>,
    pub transcript_source: Option<Arc<dyn TranscriptSource>>,
}

impl Default for Options {
    fn default() -> Self {
        let normalize = NormalizeOptions::default();
        Self {
            timeout: Duration::from_secs(10),
            max_redirects: 5,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            headers: default_headers(),
            allow_private_networks: false,
            min_paragraph_chars: normalize.min_paragraph_chars,
            sentences_per_paragraph: normalize.sentences_per_paragraph,
            transcript_lang: "en".to_string(),
            accept_raw_text: true,
            http_client: None,
            transcript_source: None,
        }
    }
}

impl Options {
    pub(crate) fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            min_paragraph_chars: self.min_paragraph_chars,
            sentences_per_paragraph: self.sentences_per_paragraph,
        }
    }
}

/// Builder for constructing Extractor instances with custom configuration.
#[derive(Debug, Clone, Default)]
pub struct ExtractorBuilder {
    opts: Options,
}

impl ExtractorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.opts.timeout = timeout;
        self
    }

    /// Set how many redirect hops a fetch may follow.
    pub fn max_redirects(mut self, max: usize) -> Self {
        self.opts.max_redirects = max;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.opts.user_agent = user_agent.into();
        self
    }

    /// Add or replace a header sent with every request.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.opts.headers.insert(key.into(), value.into());
        self
    }

    /// Allow or disallow requests to private networks.
    pub fn allow_private_networks(mut self, allow: bool) -> Self {
        self.opts.allow_private_networks = allow;
        self
    }

    pub fn min_paragraph_chars(mut self, min: usize) -> Self {
        self.opts.min_paragraph_chars = min;
        self
    }

    pub fn sentences_per_paragraph(mut self, n: usize) -> Self {
        self.opts.sentences_per_paragraph = n;
        self
    }

    pub fn transcript_lang(mut self, lang: impl Into<String>) -> Self {
        self.opts.transcript_lang = lang.into();
        self
    }

    pub fn accept_raw_text(mut self, accept: bool) -> Self {
        self.opts.accept_raw_text = accept;
        self
    }

    /// Use a custom HTTP client. Timeout, redirect, and user agent settings
    /// are then the client's own.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.opts.http_client = Some(client);
        self
    }

    /// Use a custom transcript source instead of YouTube caption tracks.
    pub fn transcript_source(mut self, source: Arc<dyn TranscriptSource>) -> Self {
        self.opts.transcript_source = Some(source);
        self
    }

    pub fn options(&self) -> &Options {
        &self.opts
    }

    /// Build the Extractor with the configured options.
    pub fn build(self) -> Result<Extractor, ExtractError> {
        Extractor::new(self.opts)
    }
}
