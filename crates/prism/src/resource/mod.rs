// ABOUTME: HTTP resource fetching for article pages, watch pages, and caption tracks.
// ABOUTME: Single-attempt GET with private-network blocking, body size limits, and charset decoding.

use std::collections::HashMap;
use std::net::IpAddr;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use ipnet::{Ipv4Net, Ipv6Net};
use once_cell::sync::Lazy;
use url::Url;

use crate::error::ExtractError;

/// Maximum allowed response body (10 MB).
pub const MAX_CONTENT_LENGTH: usize = 10 * 1024 * 1024;

static PRIVATE_V4: Lazy<Vec<Ipv4Net>> = Lazy::new(|| {
    [
        "0.0.0.0/8",
        "10.0.0.0/8",
        "100.64.0.0/10",
        "127.0.0.0/8",
        "169.254.0.0/16",
        "172.16.0.0/12",
        "192.168.0.0/16",
    ]
    .iter()
    .filter_map(|n| n.parse().ok())
    .collect()
});

static PRIVATE_V6: Lazy<Vec<Ipv6Net>> = Lazy::new(|| {
    ["fc00::/7", "fe80::/10"]
        .iter()
        .filter_map(|n| n.parse().ok())
        .collect()
});

/// Per-request fetch settings.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub headers: HashMap<String, String>,
    pub allow_private_networks: bool,
    /// Applied per request, on top of whatever the client itself enforces.
    pub timeout: Option<Duration>,
}

/// A successful (2xx) HTTP response with its body fully read.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub url: String,
    pub final_url: String,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl HttpResponse {
    /// Decode the body to text using the Content-Type charset, else detection.
    pub fn text(&self) -> String {
        decode_body(&self.body, self.content_type.as_deref())
    }
}

/// Check if an IP address is in a private, loopback, or link-local range.
pub fn is_private_ip(addr: &IpAddr) -> bool {
    match addr {
        IpAddr::V4(ip) => PRIVATE_V4.iter().any(|net| net.contains(ip)),
        IpAddr::V6(ip) => {
            if ip.is_loopback() || ip.is_unspecified() {
                return true;
            }
            if let Some(v4) = ip.to_ipv4_mapped() {
                return is_private_ip(&IpAddr::V4(v4));
            }
            PRIVATE_V6.iter().any(|net| net.contains(ip))
        }
    }
}

/// Decode body bytes to a String using the charset hint or chardetng detection.
fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    let declared = content_type
        .and_then(extract_charset)
        .and_then(|charset| encoding_rs::Encoding::for_label(charset.as_bytes()));

    let encoding = declared.unwrap_or_else(|| {
        let mut detector = chardetng::EncodingDetector::new();
        detector.feed(body, true);
        detector.guess(None, true)
    });
    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}

/// Extract the charset parameter from a Content-Type header value.
fn extract_charset(content_type: &str) -> Option<String> {
    content_type
        .to_lowercase()
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("charset="))
        .map(|charset| charset.trim_matches('"').trim_matches('\'').to_string())
}

/// Refuse hosts that are, or resolve to, private addresses.
async fn ensure_public_host(url: &Url, input: &str) -> Result<(), ExtractError> {
    let Some(host) = url.host_str() else {
        return Ok(());
    };
    let host = host.trim_start_matches('[').trim_end_matches(']');
    if let Ok(ip) = host.parse::<IpAddr>() {
        if is_private_ip(&ip) {
            return Err(ExtractError::network(
                input,
                "Fetch",
                Some(anyhow::anyhow!("private network address {} is blocked", ip)),
            ));
        }
        return Ok(());
    }

    let port = url.port_or_known_default().unwrap_or(80);
    let addrs = tokio::net::lookup_host((host, port)).await.map_err(|e| {
        ExtractError::network(input, "Fetch", Some(anyhow::anyhow!("DNS lookup failed: {}", e)))
    })?;
    for addr in addrs {
        if is_private_ip(&addr.ip()) {
            return Err(ExtractError::network(
                input,
                "Fetch",
                Some(anyhow::anyhow!(
                    "{} resolves to private network address {}",
                    host,
                    addr.ip()
                )),
            ));
        }
    }
    Ok(())
}

/// Describe a transport failure in the words a caller can act on.
fn describe_request_error(err: &reqwest::Error) -> anyhow::Error {
    if err.is_timeout() {
        anyhow::anyhow!("request timed out")
    } else if err.is_redirect() {
        anyhow::anyhow!("redirect refused: {}", err)
    } else if err.is_connect() {
        anyhow::anyhow!("connection failed: {}", err)
    } else {
        anyhow::anyhow!("request failed: {}", err)
    }
}

/// Fetch a resource with a single GET.
///
/// Any failure (bad URL, blocked address, transport error, oversized body,
/// non-2xx status) is reported as a Network error except an unparseable URL,
/// which is InvalidInput.
pub async fn fetch(
    client: &reqwest::Client,
    url: &str,
    opts: &FetchOptions,
) -> Result<HttpResponse, ExtractError> {
    let parsed = Url::parse(url).map_err(|e| {
        ExtractError::invalid_input(url, "Fetch", Some(anyhow::anyhow!("invalid URL: {}", e)))
    })?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ExtractError::invalid_input(
            url,
            "Fetch",
            Some(anyhow::anyhow!("scheme must be http or https")),
        ));
    }

    if !opts.allow_private_networks {
        ensure_public_host(&parsed, url).await?;
    }

    let mut request = client.get(parsed);
    for (key, value) in &opts.headers {
        request = request.header(key, value);
    }
    if let Some(timeout) = opts.timeout {
        request = request.timeout(timeout);
    }

    let mut response = request
        .send()
        .await
        .map_err(|e| ExtractError::network(url, "Fetch", Some(describe_request_error(&e))))?;

    let status = response.status().as_u16();
    if !response.status().is_success() {
        return Err(ExtractError::network(
            url,
            "Fetch",
            Some(anyhow::anyhow!("HTTP status {}", status)),
        ));
    }

    if let Some(len) = response.content_length() {
        if len as usize > MAX_CONTENT_LENGTH {
            return Err(ExtractError::network(
                url,
                "Fetch",
                Some(anyhow::anyhow!("content too large ({} bytes)", len)),
            ));
        }
    }

    let final_url = response.url().to_string();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_lowercase());

    let mut body = BytesMut::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| ExtractError::network(url, "Fetch", Some(describe_request_error(&e))))?
    {
        if body.len() + chunk.len() > MAX_CONTENT_LENGTH {
            return Err(ExtractError::network(
                url,
                "Fetch",
                Some(anyhow::anyhow!("content too large")),
            ));
        }
        body.extend_from_slice(&chunk);
    }

    tracing::debug!(url = %url, final_url = %final_url, status, bytes = body.len(), "fetched resource");

    Ok(HttpResponse {
        status,
        url: url.to_string(),
        final_url,
        content_type,
        body: body.freeze(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn test_client() -> reqwest::Client {
        reqwest::Client::builder()
            .user_agent("prism-test")
            .build()
            .unwrap()
    }

    fn open_opts() -> FetchOptions {
        FetchOptions {
            allow_private_networks: true,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn fetch_ok_decodes_utf8() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/article");
            then.status(200)
                .header("content-type", "text/html; charset=utf-8")
                .body("<p>hello</p>");
        });

        let result = fetch(&test_client(), &server.url("/article"), &open_opts()).await;
        mock.assert();

        let result = result.expect("fetch should succeed");
        assert_eq!(result.status, 200);
        assert_eq!(result.text(), "<p>hello</p>");
        assert_eq!(
            result.content_type.as_deref(),
            Some("text/html; charset=utf-8")
        );
    }

    #[tokio::test]
    async fn fetch_sends_configured_headers() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/h")
                .header("accept-language", "en-US,en;q=0.9");
            then.status(200).body("ok");
        });

        let mut opts = open_opts();
        opts.headers
            .insert("Accept-Language".to_string(), "en-US,en;q=0.9".to_string());
        let result = fetch(&test_client(), &server.url("/h"), &opts).await;
        mock.assert();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn fetch_non_2xx_is_network_error() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/missing");
            then.status(404).body("not found");
        });

        let err = fetch(&test_client(), &server.url("/missing"), &open_opts())
            .await
            .expect_err("404 must fail");
        mock.assert();
        assert!(err.is_network());
        assert_eq!(err.detail().as_deref(), Some("HTTP status 404"));
    }

    #[tokio::test]
    async fn fetch_times_out() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/slow");
            then.status(200)
                .delay(Duration::from_millis(800))
                .body("late");
        });

        let opts = FetchOptions {
            timeout: Some(Duration::from_millis(100)),
            ..open_opts()
        };
        let err = fetch(&test_client(), &server.url("/slow"), &opts)
            .await
            .expect_err("should time out");
        assert!(err.is_network());
        assert_eq!(err.detail().as_deref(), Some("request timed out"));
    }

    #[tokio::test]
    async fn fetch_blocks_private_ip_before_request() {
        let server = MockServer::start();
        let url = format!("http://127.0.0.1:{}/x", server.port());

        let err = fetch(&test_client(), &url, &FetchOptions::default())
            .await
            .expect_err("loopback must be blocked");
        assert!(err.is_network());
        assert!(err.detail().unwrap_or_default().contains("private network"));
    }

    #[tokio::test]
    async fn fetch_rejects_non_http_scheme() {
        let err = fetch(&test_client(), "file:///etc/passwd", &open_opts())
            .await
            .expect_err("file scheme must fail");
        assert!(err.is_invalid_input());
    }

    #[test]
    fn private_ranges() {
        for ip in [
            "10.1.2.3",
            "172.16.0.1",
            "192.168.1.1",
            "127.0.0.1",
            "169.254.1.1",
            "100.64.0.1",
            "::1",
            "fd00::1",
            "fe80::1",
            "::ffff:127.0.0.1",
        ] {
            assert!(is_private_ip(&ip.parse().unwrap()), "{ip}");
        }
        for ip in ["8.8.8.8", "172.32.0.1", "2001:4860:4860::8888"] {
            assert!(!is_private_ip(&ip.parse().unwrap()), "{ip}");
        }
    }

    #[test]
    fn charset_parameter_parsing() {
        assert_eq!(
            extract_charset("text/html; charset=ISO-8859-1"),
            Some("iso-8859-1".to_string())
        );
        assert_eq!(
            extract_charset("text/html; charset=\"utf-8\""),
            Some("utf-8".to_string())
        );
        assert_eq!(extract_charset("text/html"), None);
    }

    #[test]
    fn declared_latin1_is_decoded() {
        let body: &[u8] = &[0x63, 0x61, 0x66, 0xe9];
        assert_eq!(decode_body(body, Some("text/html; charset=iso-8859-1")), "café");
    }
}
