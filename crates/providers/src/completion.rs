//! OpenAI-compatible chat completion backends.
//!
//! A single user message goes out; the assistant content comes back either as
//! prose or as a JSON array of items (links, snippets), and both are accepted.

use std::time::Duration;

use {
    botchoice_routing::CompletionBackend,
    secrecy::ExposeSecret,
    serde::{Deserialize, Serialize},
    tracing::debug,
};

use crate::{Error, Result};

/// Fixed browser user agent; some gateways reject non-browser clients.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Prefix of `text` holding at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Build the single-message payload with the input truncated to `max_chars`.
pub fn build_request<'a>(model: &'a str, text: &'a str, max_chars: usize) -> ChatRequest<'a> {
    ChatRequest {
        model,
        messages: vec![ChatMessage {
            role: "user",
            content: truncate_chars(text, max_chars),
        }],
    }
}

/// `{base}/chat/completions`, tolerating a trailing slash on `base`.
pub fn completions_url(base: &str) -> String {
    format!("{}/chat/completions", base.trim_end_matches('/'))
}

/// Split assistant content into reply items.
///
/// A JSON array yields one item per element (strings verbatim, anything else
/// re-serialized). Every other input, JSON or not, is a single item.
pub fn parse_items(content: &str) -> Vec<String> {
    match serde_json::from_str::<serde_json::Value>(content) {
        Ok(serde_json::Value::Array(values)) => values
            .into_iter()
            .map(|v| match v {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            })
            .collect(),
        Ok(serde_json::Value::String(s)) => vec![s],
        _ => vec![content.to_string()],
    }
}

/// Run one chat completion and return the reply items.
pub async fn complete(
    client: &reqwest::Client,
    base_url: &str,
    backend: &CompletionBackend,
    text: &str,
    max_chars: usize,
    timeout: Duration,
) -> Result<Vec<String>> {
    let url = completions_url(base_url);
    let body = build_request(&backend.model, text, max_chars);
    debug!(url = %url, model = %backend.model, chars = body.messages[0].content.chars().count(), "chat completion request");

    let resp = client
        .post(&url)
        .bearer_auth(backend.credential.expose_secret())
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .header(reqwest::header::USER_AGENT, BROWSER_USER_AGENT)
        .timeout(timeout)
        .json(&body)
        .send()
        .await
        .map_err(|e| Error::network(&url, e))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(Error::Status { url, status });
    }

    let parsed: ChatResponse = resp.json().await.map_err(|e| Error::network(&url, e))?;
    let content = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .ok_or_else(|| Error::malformed(&url, "missing choices[0].message.content"))?;

    let items = parse_items(&content);
    debug!(url = %url, items = items.len(), "chat completion parsed");
    Ok(items)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {super::*, mockito::Matcher, secrecy::Secret};

    fn backend() -> CompletionBackend {
        CompletionBackend {
            model: "gpt-4o-mini".into(),
            credential: Secret::new("sk-test".into()),
        }
    }

    fn completion_body(content: &str) -> String {
        serde_json::json!({
            "id": "chatcmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
        })
        .to_string()
    }

    #[test]
    fn truncation_is_a_char_prefix() {
        assert_eq!(truncate_chars("hello", 3), "hel");
        assert_eq!(truncate_chars("hello", 5), "hello");
        assert_eq!(truncate_chars("hello", 50), "hello");
        assert_eq!(truncate_chars("你好世界", 2), "你好");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn request_payload_shape() {
        let req = build_request("m", " hello", 8000);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"model": "m", "messages": [{"role": "user", "content": " hello"}]})
        );
    }

    #[test]
    fn completions_url_joins_path() {
        assert_eq!(completions_url("https://a/v1"), "https://a/v1/chat/completions");
        assert_eq!(completions_url("https://a/v1/"), "https://a/v1/chat/completions");
    }

    #[test]
    fn parse_items_handles_both_modes() {
        assert_eq!(
            parse_items(r#"["http://x/a.png","plain text"]"#),
            ["http://x/a.png", "plain text"]
        );
        assert_eq!(parse_items("just prose"), ["just prose"]);
        assert_eq!(parse_items(r#""quoted""#), ["quoted"]);
        assert_eq!(parse_items(r#"[1, {"a":2}]"#), ["1", r#"{"a":2}"#]);
        assert_eq!(parse_items(r#"{"a":1}"#), [r#"{"a":1}"#]);
        assert!(parse_items("[]").is_empty());
    }

    #[tokio::test]
    async fn sends_auth_user_agent_and_truncated_content() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_header("user-agent", BROWSER_USER_AGENT)
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(serde_json::json!({
                "model": "gpt-4o-mini",
                "messages": [{"role": "user", "content": "abcd"}]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion_body("ok"))
            .create_async()
            .await;

        let items = complete(
            &reqwest::Client::new(),
            &format!("{}/v1", server.url()),
            &backend(),
            "abcdefgh",
            4,
            Duration::from_secs(5),
        )
        .await
        .unwrap();

        assert_eq!(items, ["ok"]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn json_array_content_becomes_items() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(completion_body(r#"["http://x/a.png","plain text"]"#))
            .create_async()
            .await;

        let items = complete(
            &reqwest::Client::new(),
            &server.url(),
            &backend(),
            "hi",
            8000,
            Duration::from_secs(5),
        )
        .await
        .unwrap();

        assert_eq!(items, ["http://x/a.png", "plain text"]);
    }

    #[tokio::test]
    async fn missing_content_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let err = complete(
            &reqwest::Client::new(),
            &server.url(),
            &backend(),
            "hi",
            8000,
            Duration::from_secs(5),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn unauthorized_is_status_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body(r#"{"error":{"message":"bad key"}}"#)
            .create_async()
            .await;

        let err = complete(
            &reqwest::Client::new(),
            &server.url(),
            &backend(),
            "hi",
            8000,
            Duration::from_secs(5),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Status { status, .. } if status.as_u16() == 401));
    }
}
