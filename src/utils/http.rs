use anyhow::{bail, Result};
use reqwest::{Client, Response};
use std::time::Duration;

/// Default maximum body size for streaming downloads (10 MB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Build a `reqwest::Client` with standard timeouts (10s connect, 30s overall)
/// and redirects disabled — callers that need redirect handling install
/// their own policy (see `fetch::client`).
pub fn default_http_client() -> Client {
    Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(30))
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Download a response body as bytes with a size limit.
///
/// Checks `Content-Length` first and rejects immediately if over the limit;
/// otherwise streams via `chunk()` with a running counter, truncating at the
/// limit. Returns `(bytes, was_truncated)`.
pub async fn limited_body(resp: Response, max_bytes: usize) -> Result<(Vec<u8>, bool)> {
    if let Some(cl) = resp.content_length() {
        if cl as usize > max_bytes {
            bail!(
                "response body too large: Content-Length {} exceeds limit {}",
                cl,
                max_bytes
            );
        }
    }

    let mut buf = Vec::new();
    let mut stream = resp;
    while let Some(chunk) = stream.chunk().await? {
        if buf.len() + chunk.len() > max_bytes {
            let remaining = max_bytes.saturating_sub(buf.len());
            buf.extend_from_slice(&chunk[..remaining]);
            return Ok((buf, true));
        }
        buf.extend_from_slice(&chunk);
    }
    Ok((buf, false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn default_http_client_builds() {
        let _client = default_http_client();
    }

    async fn get_response(server: &MockServer) -> Response {
        Client::new().get(server.uri()).send().await.unwrap()
    }

    #[tokio::test]
    async fn limited_body_under_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"hello world".to_vec()))
            .mount(&server)
            .await;
        let resp = get_response(&server).await;
        let (bytes, truncated) = limited_body(resp, 1024).await.unwrap();
        assert_eq!(bytes, b"hello world");
        assert!(!truncated);
    }

    #[tokio::test]
    async fn limited_body_truncates_over_limit() {
        let body = vec![b'x'; 100];
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
            .mount(&server)
            .await;
        let resp = get_response(&server).await;
        let (bytes, truncated) = limited_body(resp, 10).await.unwrap();
        assert_eq!(bytes.len(), 10);
        assert!(truncated);
    }

    #[tokio::test]
    async fn limited_body_rejects_large_content_length() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Length", "1000000")
                    .set_body_bytes(vec![b'x'; 10]),
            )
            .mount(&server)
            .await;
        let resp = get_response(&server).await;
        assert!(limited_body(resp, 10).await.is_err());
    }
}
