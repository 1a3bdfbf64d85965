use std::error::Error as StdError;

use botchoice_common::ReplyKind;

/// Crate-wide result type for reply delivery.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed reply delivery errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The channel cannot carry this kind of reply.
    #[error("channel cannot deliver {kind} replies")]
    Unsupported { kind: ReplyKind },

    /// The channel is not connected or not ready.
    #[error("channel unavailable: {message}")]
    Unavailable { message: String },

    /// Wrapped source error from the transport.
    #[error("reply delivery failed: {context}: {source}")]
    External {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl Error {
    #[must_use]
    pub fn unsupported(kind: ReplyKind) -> Self {
        Self::Unsupported { kind }
    }

    #[must_use]
    pub fn unavailable(message: impl std::fmt::Display) -> Self {
        Self::Unavailable {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn external(
        context: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::External {
            context: context.into(),
            source: Box::new(source),
        }
    }
}
