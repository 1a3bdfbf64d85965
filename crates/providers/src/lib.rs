//! Backend invocation: random-media GETs and OpenAI-compatible completions.

pub mod completion;
pub mod error;
pub mod media_fetch;

use std::time::Duration;

use {
    async_trait::async_trait,
    botchoice_config::{BotChoiceConfig, MediaKind},
    botchoice_routing::{BackendDescriptor, BackendKind},
    tracing::{debug, warn},
};

pub use error::{Error, Result};

/// Shared HTTP client for all backends.
///
/// Reusing one client shares connection pools, DNS cache, and TLS sessions.
pub fn shared_http_client() -> &'static reqwest::Client {
    static CLIENT: std::sync::LazyLock<reqwest::Client> =
        std::sync::LazyLock::new(reqwest::Client::new);
    &CLIENT
}

/// Raw outcome of invoking one backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendResult {
    /// A random-media backend returned a URL.
    MediaUrl { media: MediaKind, url: String },
    /// A random-media backend failed; `message` goes to the user as text.
    MediaUnavailable { message: String },
    /// Completion reply items, in order.
    Completion(Vec<String>),
    /// The descriptor has no invocable shape.
    Skipped,
}

/// Calls the backend behind a descriptor.
#[async_trait]
pub trait BackendInvoker: Send + Sync {
    /// Invoke `backend` with the keyword-stripped message text.
    ///
    /// Random-media failures are reported as
    /// [`BackendResult::MediaUnavailable`], never as `Err`. Completion
    /// failures are returned as `Err` so the dispatcher can retry.
    async fn invoke(&self, backend: &BackendDescriptor, stripped_text: &str) -> Result<BackendResult>;
}

/// Limits applied by [`HttpInvoker`].
#[derive(Debug, Clone, Copy)]
pub struct InvokerSettings {
    pub max_words: usize,
    pub completion_timeout: Duration,
    pub media_timeout: Duration,
}

impl From<&BotChoiceConfig> for InvokerSettings {
    fn from(cfg: &BotChoiceConfig) -> Self {
        Self {
            max_words: cfg.max_words,
            completion_timeout: Duration::from_secs(cfg.completion_timeout_secs),
            media_timeout: Duration::from_secs(cfg.media_timeout_secs),
        }
    }
}

impl Default for InvokerSettings {
    fn default() -> Self {
        Self::from(&BotChoiceConfig::default())
    }
}

/// [`BackendInvoker`] over HTTP.
pub struct HttpInvoker {
    client: reqwest::Client,
    settings: InvokerSettings,
}

impl HttpInvoker {
    pub fn new(settings: InvokerSettings) -> Self {
        Self::with_client(shared_http_client().clone(), settings)
    }

    pub fn with_client(client: reqwest::Client, settings: InvokerSettings) -> Self {
        Self { client, settings }
    }

    pub fn settings(&self) -> &InvokerSettings {
        &self.settings
    }
}

#[async_trait]
impl BackendInvoker for HttpInvoker {
    async fn invoke(&self, backend: &BackendDescriptor, stripped_text: &str) -> Result<BackendResult> {
        match &backend.kind {
            BackendKind::MediaFetch(media) => {
                match media_fetch::fetch_media_url(
                    &self.client,
                    &backend.url,
                    media,
                    self.settings.media_timeout,
                )
                .await
                {
                    Ok(url) => Ok(BackendResult::MediaUrl {
                        media: media.media,
                        url,
                    }),
                    Err(e) => {
                        warn!(
                            keyword = %backend.keyword,
                            timeout = e.is_timeout(),
                            error = %e,
                            "media fetch failed"
                        );
                        Ok(BackendResult::MediaUnavailable {
                            message: media.failure_text.clone(),
                        })
                    },
                }
            },
            BackendKind::Completion(completion) => {
                let items = completion::complete(
                    &self.client,
                    &backend.url,
                    completion,
                    stripped_text,
                    self.settings.max_words,
                    self.settings.completion_timeout,
                )
                .await?;
                Ok(BackendResult::Completion(items))
            },
            BackendKind::Unsupported => {
                debug!(keyword = %backend.keyword, "skipping unsupported backend");
                Ok(BackendResult::Skipped)
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {super::*, botchoice_config::BotEntry};

    fn settings() -> InvokerSettings {
        InvokerSettings {
            max_words: 8000,
            completion_timeout: Duration::from_secs(5),
            media_timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn media_failure_becomes_user_text() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"msg":"no data"}"#)
            .create_async()
            .await;

        let descriptor = BackendDescriptor::from_entry(&BotEntry::new("/sjtp", server.url()));
        let result = HttpInvoker::new(settings())
            .invoke(&descriptor, " hello")
            .await
            .unwrap();

        assert_eq!(
            result,
            BackendResult::MediaUnavailable {
                message: "获取图片失败，请稍后再试".into()
            }
        );
    }

    #[tokio::test]
    async fn media_success_carries_kind() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/")
            .match_query(mockito::Matcher::UrlEncoded("r18".into(), "1".into()))
            .with_status(200)
            .with_body(r#"{"data":"https://i.example.com/p.jpg"}"#)
            .create_async()
            .await;

        let descriptor =
            BackendDescriptor::from_entry(&BotEntry::new("/sjtp", format!("{}/", server.url())));
        let result = HttpInvoker::new(settings())
            .invoke(&descriptor, "")
            .await
            .unwrap();

        assert_eq!(
            result,
            BackendResult::MediaUrl {
                media: MediaKind::Image,
                url: "https://i.example.com/p.jpg".into()
            }
        );
    }

    #[tokio::test]
    async fn completion_failure_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(500)
            .create_async()
            .await;

        let descriptor = BackendDescriptor::from_entry(
            &BotEntry::new("/gpt", server.url()).with_completion("m", "k"),
        );
        let err = HttpInvoker::new(settings())
            .invoke(&descriptor, "hi")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Status { .. }));
    }

    #[tokio::test]
    async fn unsupported_backend_is_skipped() {
        let descriptor = BackendDescriptor::from_entry(&BotEntry::new("/x", "http://127.0.0.1:9"));
        let result = HttpInvoker::new(settings())
            .invoke(&descriptor, "")
            .await
            .unwrap();
        assert_eq!(result, BackendResult::Skipped);
    }
}
