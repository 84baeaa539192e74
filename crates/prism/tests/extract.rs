// ABOUTME: Integration tests for the Extractor facade against mocked HTTP servers.
// ABOUTME: Covers article, raw text, video, strict mode, and batch extraction paths end to end.

use std::sync::Arc;

use httpmock::prelude::*;
use pretty_assertions::assert_eq;
use prism_extract::resource::FetchOptions;
use prism_extract::{
    Extractor, NoTranscripts, SourceKind, TranscriptSource, YouTubeCaptions,
};

const VIDEO_ID: &str = "dQw4w9WgXcQ";

fn extractor() -> Extractor {
    Extractor::builder()
        .allow_private_networks(true)
        .transcript_source(Arc::new(NoTranscripts))
        .build()
        .unwrap()
}

fn paragraph(topic: &str) -> String {
    format!(
        "{} is discussed here at some length so that the paragraph clears every filter.",
        topic
    )
}

#[tokio::test]
async fn article_404_is_network_error() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/article");
        then.status(404).body("gone");
    });

    let err = extractor()
        .extract(&server.url("/article"))
        .await
        .unwrap_err();
    mock.assert();
    assert!(err.is_network(), "got {:?}", err);
    assert_eq!(err.detail().as_deref(), Some("HTTP status 404"));
}

#[tokio::test]
async fn short_raw_note_is_one_paragraph() {
    let doc = extractor().extract("Just a short raw note.").await.unwrap();
    assert_eq!(doc.paragraphs(), &["Just a short raw note.".to_string()]);
    assert_eq!(doc.source_kind(), SourceKind::RawText);
}

#[tokio::test]
async fn raw_text_with_blank_line_is_two_paragraphs() {
    let doc = extractor()
        .extract("  First paragraph here.\n\n  Second paragraph here.  ")
        .await
        .unwrap();
    assert_eq!(
        doc.paragraphs(),
        &[
            "First paragraph here.".to_string(),
            "Second paragraph here.".to_string()
        ]
    );
}

#[tokio::test]
async fn nav_only_article_is_empty_after_cleaning() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/nav");
        then.status(200)
            .header("content-type", "text/html; charset=utf-8")
            .body("<html><body><nav><a href='/'>Home</a><a href='/archive'>Browse the full archive</a></nav></body></html>");
    });

    let err = extractor().extract(&server.url("/nav")).await.unwrap_err();
    assert!(err.is_empty_after_cleaning(), "got {:?}", err);
}

#[tokio::test]
async fn article_is_cleaned_into_paragraphs_with_metadata() {
    let server = MockServer::start();
    let html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><title>Release Notes</title><meta name="author" content="Jane Roe"></head>
<body>
  <header><p>Site header with a long enough line of text</p></header>
  <div class="cookie-consent"><p>We use cookies to improve your experience here.</p></div>
  <main>
    <p>{}</p>
    <p>{}</p>
    <p>Subscribe to our newsletter</p>
  </main>
  <footer><p>Copyright line that is long enough to survive</p></footer>
</body>
</html>"#,
        paragraph("Performance"),
        paragraph("Compatibility")
    );
    server.mock(|when, then| {
        when.method(GET).path("/notes");
        then.status(200)
            .header("content-type", "text/html; charset=utf-8")
            .body(html.clone());
    });

    let doc = extractor().extract(&server.url("/notes")).await.unwrap();
    assert_eq!(
        doc.paragraphs(),
        &[paragraph("Performance"), paragraph("Compatibility")]
    );
    assert_eq!(doc.source_kind(), SourceKind::ArticleUrl);
    assert_eq!(doc.metadata().title.as_deref(), Some("Release Notes"));
    assert_eq!(doc.metadata().author.as_deref(), Some("Jane Roe"));
    assert!(!doc.text().contains('<'));
}

#[tokio::test]
async fn video_without_transcript_is_no_transcript() {
    let err = extractor()
        .extract(&format!("https://www.youtube.com/watch?v={}", VIDEO_ID))
        .await
        .unwrap_err();
    assert!(err.is_no_transcript(), "got {:?}", err);
}

#[tokio::test]
async fn video_transcript_is_segmented_by_pauses() {
    let server = MockServer::start();
    let page = format!(
        r#"<html><head><meta name="title" content="Launch Talk"></head><body><script>var r = {{"captions":{{"captionTracks":[{{"baseUrl":"/api/timedtext?v={}&lang=en","languageCode":"en"}}]}},"lengthSeconds":"95"}};</script></body></html>"#,
        VIDEO_ID
    );
    server.mock(|when, then| {
        when.method(GET).path("/watch").query_param("v", VIDEO_ID);
        then.status(200).body(page.clone());
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/timedtext");
        then.status(200).body(
            r#"<transcript><text start="0" dur="2">Hello and</text><text start="2" dur="2">welcome back.</text><text start="9" dur="2">[Music]</text><text start="12" dur="3">Today we ship.</text></transcript>"#,
        );
    });

    let source: Arc<dyn TranscriptSource> = Arc::new(
        YouTubeCaptions::new(reqwest::Client::new())
            .base_url(server.base_url())
            .fetch_options(FetchOptions {
                allow_private_networks: true,
                ..Default::default()
            }),
    );
    let extractor = Extractor::builder()
        .allow_private_networks(true)
        .transcript_source(source)
        .build()
        .unwrap();

    let doc = extractor
        .extract(&format!("https://youtu.be/{}", VIDEO_ID))
        .await
        .unwrap();
    assert_eq!(
        doc.paragraphs(),
        &[
            "Hello and welcome back.".to_string(),
            "Today we ship.".to_string()
        ]
    );
    assert_eq!(doc.source_kind(), SourceKind::VideoUrl);
    assert_eq!(doc.metadata().title.as_deref(), Some("Launch Talk"));
    assert_eq!(doc.metadata().duration_secs, Some(95));
    assert_eq!(doc.metadata().video_id.as_deref(), Some(VIDEO_ID));
}

#[tokio::test]
async fn strict_mode_rejects_raw_text_but_not_urls() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/ok");
        then.status(200).body(format!("<p>{}</p>", paragraph("Strictness")));
    });

    let strict = Extractor::builder()
        .allow_private_networks(true)
        .accept_raw_text(false)
        .build()
        .unwrap();
    assert!(strict
        .extract("a plain note")
        .await
        .unwrap_err()
        .is_unsupported_source());
    assert!(strict.extract(&server.url("/ok")).await.is_ok());
}

#[tokio::test]
async fn extract_many_preserves_input_order() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/a");
        then.status(200).body(format!("<p>{}</p>", paragraph("Alpha")));
    });
    server.mock(|when, then| {
        when.method(GET).path("/missing");
        then.status(500);
    });

    let inputs = vec![
        server.url("/a"),
        "raw note in the middle".to_string(),
        server.url("/missing"),
        String::new(),
    ];
    let outcomes = extractor().extract_many(&inputs).await;
    assert_eq!(outcomes.len(), 4);
    assert_eq!(
        outcomes[0].as_ref().unwrap().paragraphs(),
        &[paragraph("Alpha")]
    );
    assert_eq!(
        outcomes[1].as_ref().unwrap().paragraphs(),
        &["raw note in the middle".to_string()]
    );
    assert!(outcomes[2].as_ref().unwrap_err().is_network());
    assert!(outcomes[3].as_ref().unwrap_err().is_invalid_input());
}

#[tokio::test]
async fn private_addresses_are_refused_by_default() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/internal");
        then.status(200).body("<p>secret</p>");
    });

    let extractor = Extractor::builder().build().unwrap();
    let err = extractor
        .extract(&server.url("/internal"))
        .await
        .unwrap_err();
    assert!(err.is_network());
    mock.assert_hits(0);
}

#[test]
fn truncated_document_marks_the_gap() {
    let text = (0..10)
        .map(|i| paragraph(&format!("Topic {}", i)))
        .collect::<Vec<_>>()
        .join("\n\n");
    let doc = extractor()
        .extract_html(
            &format!(
                "<body>{}</body>",
                text.split("\n\n")
                    .map(|p| format!("<p>{}</p>", p))
                    .collect::<String>()
            ),
            "https://example.com/long",
        )
        .unwrap();
    let short = doc.truncate(300);
    assert!(short.char_count() < doc.char_count());
    assert!(short.paragraphs().iter().any(|p| p.ends_with("characters truncated ...]")));
    assert_eq!(short.paragraphs()[0], doc.paragraphs()[0]);
    assert_eq!(short.paragraphs().last(), doc.paragraphs().last());
}
