//! Random-media backends: one GET, one URL back.

use std::time::Duration;

use {botchoice_routing::MediaBackend, tracing::debug};

use crate::{Error, Result};

/// Build `{url}?{query}`, joining with `&` when the URL already has a query.
pub fn request_url(base: &str, query: &str) -> String {
    if query.is_empty() {
        base.to_string()
    } else if base.contains('?') {
        format!("{base}&{query}")
    } else {
        format!("{base}?{query}")
    }
}

/// Fetch a random media URL from `base_url`.
///
/// Fails on non-2xx status, timeout, a body that is not JSON, or a missing
/// or empty `result_field`.
pub async fn fetch_media_url(
    client: &reqwest::Client,
    base_url: &str,
    backend: &MediaBackend,
    timeout: Duration,
) -> Result<String> {
    let url = request_url(base_url, &backend.query);
    debug!(url = %url, field = %backend.result_field, "fetching random media");

    let resp = client
        .get(&url)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| Error::network(&url, e))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(Error::Status { url, status });
    }

    let body: serde_json::Value = resp.json().await.map_err(|e| Error::network(&url, e))?;
    body.get(&backend.result_field)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| Error::malformed(url, format!("missing '{}' field", backend.result_field)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {super::*, botchoice_config::MediaKind};

    fn video_backend() -> MediaBackend {
        MediaBackend {
            query: "type=json".into(),
            result_field: "video".into(),
            media: MediaKind::Video,
            failure_text: "获取视频失败，请稍后再试".into(),
        }
    }

    #[test]
    fn request_url_appends_query() {
        assert_eq!(request_url("https://x/api/", "type=json"), "https://x/api/?type=json");
        assert_eq!(request_url("https://x/api?a=1", "r18=1"), "https://x/api?a=1&r18=1");
        assert_eq!(request_url("https://x/api", ""), "https://x/api");
    }

    #[tokio::test]
    async fn extracts_result_field() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/xjj/")
            .match_query(mockito::Matcher::UrlEncoded("type".into(), "json".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"code":200,"video":"http://x/v.mp4"}"#)
            .create_async()
            .await;

        let url = fetch_media_url(
            &reqwest::Client::new(),
            &format!("{}/xjj/", server.url()),
            &video_backend(),
            Duration::from_secs(5),
        )
        .await
        .unwrap();

        assert_eq!(url, "http://x/v.mp4");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn missing_field_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"code":500,"msg":"busy"}"#)
            .create_async()
            .await;

        let err = fetch_media_url(
            &reqwest::Client::new(),
            &server.url(),
            &video_backend(),
            Duration::from_secs(5),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::MalformedResponse { .. }), "{err}");
    }

    #[tokio::test]
    async fn server_error_is_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", mockito::Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let err = fetch_media_url(
            &reqwest::Client::new(),
            &server.url(),
            &video_backend(),
            Duration::from_secs(5),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Status { status, .. } if status.as_u16() == 503));
    }

    #[tokio::test]
    async fn non_json_body_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", mockito::Matcher::Any)
            .with_status(200)
            .with_body("<html>oops</html>")
            .create_async()
            .await;

        let result = fetch_media_url(
            &reqwest::Client::new(),
            &server.url(),
            &video_backend(),
            Duration::from_secs(5),
        )
        .await;

        assert!(result.is_err());
    }
}
