/// Config schema types (backend list, help text, dispatch tuning).
use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// Default maximum number of characters forwarded to a completion backend.
pub const DEFAULT_MAX_WORDS: usize = 8000;

/// Default number of retries after the first failed dispatch attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

pub const DEFAULT_SHORT_HELP_TEXT: &str = "发送特定指令以调度不同任务的bot！";

pub const DEFAULT_LONG_HELP_TEXT: &str = "📚 发送关键词执行任务bot！/GPT/星火/随机模型等🔥 /sjxjj: 获取随机搞笑视频。\n🖼️ /sjtp: 获取随机图片。\n";

/// Keyword of the built-in random video backend.
pub const VIDEO_KEYWORD: &str = "/sjxjj";

/// Keyword of the built-in random image backend.
pub const IMAGE_KEYWORD: &str = "/sjtp";

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotChoiceConfig {
    /// Ordered list of keyword-triggered backends.
    pub bot_list: Vec<BotEntry>,
    /// Maximum characters of stripped input sent to completion backends.
    pub max_words: usize,
    pub short_help_text: String,
    pub long_help_text: String,
    /// Retries after the first failed attempt of a dispatch cycle.
    pub max_retries: u32,
    /// Pause between dispatch attempts. Zero retries immediately.
    pub retry_delay_ms: u64,
    /// HTTP timeout for chat completion calls.
    pub completion_timeout_secs: u64,
    /// HTTP timeout for random-media calls and image downloads.
    pub media_timeout_secs: u64,
    /// Scan completion output for embedded media URLs and download images.
    pub media_extraction: bool,
    /// How to send URLs whose extension matches no known media category.
    pub unclassified_as: UnclassifiedAs,
    /// Upper bound for eagerly downloaded images.
    pub max_image_bytes: usize,
}

impl Default for BotChoiceConfig {
    fn default() -> Self {
        Self {
            bot_list: default_bot_list(),
            max_words: DEFAULT_MAX_WORDS,
            short_help_text: DEFAULT_SHORT_HELP_TEXT.into(),
            long_help_text: DEFAULT_LONG_HELP_TEXT.into(),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay_ms: 0,
            completion_timeout_secs: 80,
            media_timeout_secs: 30,
            media_extraction: false,
            unclassified_as: UnclassifiedAs::default(),
            max_image_bytes: 10 * 1024 * 1024,
        }
    }
}

/// The built-in backends used when no configuration provides `bot_list`.
pub fn default_bot_list() -> Vec<BotEntry> {
    vec![
        BotEntry::new(VIDEO_KEYWORD, "https://api.pearktrue.cn/api/random/xjj/"),
        BotEntry::new(IMAGE_KEYWORD, "https://api.mossia.top/randPic/pixiv"),
    ]
}

/// One configured backend.
///
/// A completion backend sets both `model` and `key`. A random-media backend
/// sets neither and is either one of the built-in keywords or carries an
/// explicit `media` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotEntry {
    pub keyword: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(
        default,
        serialize_with = "serialize_option_secret",
        skip_serializing_if = "Option::is_none"
    )]
    pub key: Option<Secret<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaEndpointConfig>,
}

impl BotEntry {
    pub fn new(keyword: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            url: url.into(),
            model: None,
            key: None,
            media: None,
        }
    }

    /// Turn this entry into an OpenAI-compatible completion backend.
    #[must_use]
    pub fn with_completion(mut self, model: impl Into<String>, key: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self.key = Some(Secret::new(key.into()));
        self
    }

    #[must_use]
    pub fn with_media(mut self, media: MediaEndpointConfig) -> Self {
        self.media = Some(media);
        self
    }
}

/// Explicit description of a random-media endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaEndpointConfig {
    /// Query string appended after `?`, e.g. `type=json`.
    #[serde(default)]
    pub query: String,
    /// JSON field holding the media URL in the response body.
    pub result_field: String,
    pub kind: MediaKind,
    /// Text sent to the user when the fetch fails.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_text: Option<String>,
}

/// Media category served by a random-media endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    File,
}

impl MediaKind {
    /// User-facing text sent when a fetch of this kind fails.
    pub fn default_failure_text(self) -> &'static str {
        match self {
            Self::Image => "获取图片失败，请稍后再试",
            Self::Video => "获取视频失败，请稍后再试",
            Self::File => "获取文件失败，请稍后再试",
        }
    }
}

/// Policy for URLs that match no known media category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnclassifiedAs {
    #[default]
    Text,
    File,
}

// ── Serde helpers for Secret<String> ────────────────────────────────────────

fn serialize_option_secret<S: serde::Serializer>(
    secret: &Option<Secret<String>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match secret {
        Some(s) => serializer.serialize_some(s.expose_secret()),
        None => serializer.serialize_none(),
    }
}
