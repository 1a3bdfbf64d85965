//! Message and reply types exchanged between the host, the dispatcher and the
//! reply sink.

use std::fmt;

use {
    bytes::Bytes,
    serde::{Deserialize, Serialize},
};

/// Kind of content carried by an inbound message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    #[default]
    Text,
    Image,
    Voice,
    File,
    Other,
}

/// A message delivered by the host framework.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InboundMessage {
    pub kind: MessageKind,
    /// Raw message body. Only meaningful for [`MessageKind::Text`].
    pub content: String,
    /// Sender display name, when the host provides one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    /// Chat/peer ID the reply goes back to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,
}

impl InboundMessage {
    /// Build a plain text message with no routing metadata.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Text,
            content: content.into(),
            sender: None,
            chat_id: None,
        }
    }

    #[must_use]
    pub fn with_chat_id(mut self, chat_id: impl Into<String>) -> Self {
        self.chat_id = Some(chat_id.into());
        self
    }

    pub fn is_text(&self) -> bool {
        self.kind == MessageKind::Text
    }
}

/// A typed reply handed to the host's reply channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    /// Inline image data (downloaded eagerly).
    Image(Bytes),
    ImageUrl(String),
    VideoUrl(String),
    FileUrl(String),
    /// Terminal error shown to the user.
    Error(String),
}

impl Reply {
    pub fn kind(&self) -> ReplyKind {
        match self {
            Self::Text(_) => ReplyKind::Text,
            Self::Image(_) => ReplyKind::Image,
            Self::ImageUrl(_) => ReplyKind::ImageUrl,
            Self::VideoUrl(_) => ReplyKind::VideoUrl,
            Self::FileUrl(_) => ReplyKind::FileUrl,
            Self::Error(_) => ReplyKind::Error,
        }
    }

    /// Textual payload (text body or URL). `None` for inline images.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s)
            | Self::ImageUrl(s)
            | Self::VideoUrl(s)
            | Self::FileUrl(s)
            | Self::Error(s) => Some(s),
            Self::Image(_) => None,
        }
    }
}

/// Discriminant of [`Reply`], used in logs and CLI output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyKind {
    Text,
    Image,
    ImageUrl,
    VideoUrl,
    FileUrl,
    Error,
}

impl fmt::Display for ReplyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::ImageUrl => "image_url",
            Self::VideoUrl => "video_url",
            Self::FileUrl => "file_url",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}
