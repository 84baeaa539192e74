// ABOUTME: The Extractor facade: classify -> fetch -> normalize for one input, all or nothing.
// ABOUTME: Owns the shared HTTP client and transcript source; each call is otherwise independent.

use std::net::ToSocketAddrs;
use std::sync::Arc;

use futures::future::join_all;

use crate::document::CanonicalDocument;
use crate::error::ExtractError;
use crate::fetch::Fetcher;
use crate::normalize::{normalize, normalize_html, NormalizeOptions};
use crate::options::{ExtractorBuilder, Options};
use crate::resource::{is_private_ip, FetchOptions};
use crate::source::{SourceInput, SourceKind};
use crate::transcript::{TranscriptSource, YouTubeCaptions};

/// Extracts canonical documents from URLs, video links, and raw text.
#[derive(Debug, Clone)]
pub struct Extractor {
    opts: Options,
    normalize_opts: NormalizeOptions,
    fetcher: Fetcher,
}

fn build_http_client(opts: &Options) -> Result<reqwest::Client, ExtractError> {
    let allow_private = opts.allow_private_networks;
    let max_redirects = opts.max_redirects;
    let redirect_policy = reqwest::redirect::Policy::custom(move |attempt| {
        if attempt.previous().len() > max_redirects {
            return attempt.error(format!("too many redirects (limit {})", max_redirects));
        }
        if !allow_private {
            let next = attempt.url().clone();
            if let Some(host) = next.host_str() {
                let host = host.trim_start_matches('[').trim_end_matches(']');
                if let Ok(ip) = host.parse::<std::net::IpAddr>() {
                    if is_private_ip(&ip) {
                        return attempt.error("redirect to private IP blocked");
                    }
                } else {
                    // the policy callback is synchronous, so resolve with std
                    let port = next.port_or_known_default().unwrap_or(80);
                    match (host, port).to_socket_addrs() {
                        Ok(mut addrs) => {
                            if addrs.any(|sa| is_private_ip(&sa.ip())) {
                                return attempt.error("redirect to private IP blocked");
                            }
                        }
                        Err(_) => return attempt.error("DNS lookup failed during redirect"),
                    }
                }
            }
        }
        attempt.follow()
    });

    reqwest::Client::builder()
        .redirect(redirect_policy)
        .user_agent(&opts.user_agent)
        .timeout(opts.timeout)
        .cookie_store(true)
        .gzip(true)
        .brotli(true)
        .deflate(true)
        .build()
        .map_err(|e| {
            ExtractError::invalid_input(
                "",
                "Build",
                Some(anyhow::anyhow!("failed to build HTTP client: {}", e)),
            )
        })
}

impl Extractor {
    /// Create a new ExtractorBuilder for configuring the extractor.
    pub fn builder() -> ExtractorBuilder {
        ExtractorBuilder::new()
    }

    /// Create a new Extractor with the given options.
    pub fn new(opts: Options) -> Result<Self, ExtractError> {
        let http = match &opts.http_client {
            Some(client) => client.clone(),
            None => build_http_client(&opts)?,
        };
        let fetch_opts = FetchOptions {
            headers: opts.headers.clone(),
            allow_private_networks: opts.allow_private_networks,
            timeout: Some(opts.timeout),
        };
        let transcripts: Arc<dyn TranscriptSource> = match &opts.transcript_source {
            Some(source) => Arc::clone(source),
            None => Arc::new(
                YouTubeCaptions::new(http.clone())
                    .lang(opts.transcript_lang.clone())
                    .fetch_options(fetch_opts.clone()),
            ),
        };

        Ok(Self {
            normalize_opts: opts.normalize_options(),
            fetcher: Fetcher::new(http, fetch_opts, transcripts),
            opts,
        })
    }

    pub fn options(&self) -> &Options {
        &self.opts
    }

    /// Extract one input into a canonical document.
    ///
    /// The input is classified from its shape: video URLs go through the
    /// transcript source, other http(s) URLs are fetched as articles, and
    /// anything else is treated as raw text. The first failing step's error
    /// is returned unchanged.
    #[tracing::instrument(level = "debug", skip(self, raw), fields(input_len = raw.len()))]
    pub async fn extract(&self, raw: &str) -> Result<CanonicalDocument, ExtractError> {
        let result = self.run(raw).await;
        match &result {
            Ok(doc) => tracing::info!(
                kind = %doc.source_kind(),
                paragraphs = doc.paragraphs().len(),
                chars = doc.char_count(),
                "extracted document"
            ),
            Err(err) => tracing::warn!(error = %err, "extraction failed"),
        }
        result
    }

    async fn run(&self, raw: &str) -> Result<CanonicalDocument, ExtractError> {
        let input = SourceInput::parse(raw)?;
        tracing::debug!(kind = %input.kind(), "classified input");

        if input.kind() == SourceKind::RawText && !self.opts.accept_raw_text {
            return Err(ExtractError::unsupported_source(
                input.raw_value(),
                "Classify",
                Some(anyhow::anyhow!("expected an article or video URL")),
            ));
        }

        let fetched = self.fetcher.fetch(input.kind(), input.raw_value()).await?;
        normalize(fetched, &self.normalize_opts)
    }

    /// Normalize already-fetched HTML without touching the network.
    pub fn extract_html(&self, html: &str, url: &str) -> Result<CanonicalDocument, ExtractError> {
        normalize_html(html, url, &self.normalize_opts)
    }

    /// Extract several inputs concurrently. Outcomes are returned in input order.
    pub async fn extract_many<S: AsRef<str>>(
        &self,
        inputs: &[S],
    ) -> Vec<Result<CanonicalDocument, ExtractError>> {
        join_all(inputs.iter().map(|input| self.extract(input.as_ref()))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::NoTranscripts;
    use httpmock::prelude::*;

    fn local_extractor() -> Extractor {
        Extractor::builder()
            .allow_private_networks(true)
            .transcript_source(Arc::new(NoTranscripts))
            .build()
            .unwrap()
    }

    fn article_html() -> String {
        format!(
            "<html><body><article><p>{}</p></article></body></html>",
            "A sentence that belongs to the article body. ".repeat(3).trim_end()
        )
    }

    #[tokio::test]
    async fn follows_redirects_within_limit() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/old");
            then.status(301).header("location", server.url("/new"));
        });
        server.mock(|when, then| {
            when.method(GET).path("/new");
            then.status(200)
                .header("content-type", "text/html")
                .body(article_html());
        });

        let doc = local_extractor().extract(&server.url("/old")).await.unwrap();
        assert_eq!(doc.paragraphs().len(), 1);
        assert_eq!(
            doc.metadata().final_url.as_deref(),
            Some(server.url("/new").as_str())
        );
    }

    #[tokio::test]
    async fn redirect_chain_over_limit_is_network_error() {
        let server = MockServer::start();
        for hop in 0..4 {
            let next = server.url(format!("/hop{}", hop + 1));
            server.mock(move |when, then| {
                when.method(GET).path(format!("/hop{}", hop));
                then.status(302).header("location", next);
            });
        }

        let extractor = Extractor::builder()
            .allow_private_networks(true)
            .max_redirects(2)
            .build()
            .unwrap();
        let err = extractor.extract(&server.url("/hop0")).await.unwrap_err();
        assert!(err.is_network(), "got {:?}", err);
        assert!(err.detail().unwrap_or_default().contains("redirect"));
    }

    #[tokio::test]
    async fn strict_mode_rejects_raw_text() {
        let extractor = Extractor::builder()
            .accept_raw_text(false)
            .build()
            .unwrap();
        let err = extractor.extract("just some words").await.unwrap_err();
        assert!(err.is_unsupported_source());
    }

    #[tokio::test]
    async fn empty_input_is_invalid() {
        let err = local_extractor().extract("   ").await.unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn extract_html_needs_no_network() {
        let doc = local_extractor()
            .extract_html(&article_html(), "https://example.com/post")
            .unwrap();
        assert_eq!(doc.source_kind(), SourceKind::ArticleUrl);
        assert_eq!(
            doc.metadata().url.as_deref(),
            Some("https://example.com/post")
        );
    }
}
