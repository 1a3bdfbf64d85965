use botchoice_common::ReplyKind;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A backend call failed in a way that warrants retrying the cycle.
    #[error("backend {keyword} failed: {source}")]
    Backend {
        keyword: String,
        #[source]
        source: botchoice_providers::Error,
    },

    #[error("delivering {kind} reply failed: {source}")]
    Delivery {
        /// Backend whose result was being delivered; `None` for the
        /// acknowledgment and the terminal error reply.
        keyword: Option<String>,
        kind: ReplyKind,
        #[source]
        source: botchoice_channels::Error,
    },

    #[error(transparent)]
    Registry(#[from] botchoice_routing::Error),
}

impl Error {
    #[must_use]
    pub fn backend(keyword: impl Into<String>, source: botchoice_providers::Error) -> Self {
        Self::Backend {
            keyword: keyword.into(),
            source,
        }
    }

    /// Attribute a delivery failure to the backend whose result was sent.
    #[must_use]
    pub fn for_backend(self, backend: &str) -> Self {
        match self {
            Self::Delivery {
                keyword: None,
                kind,
                source,
            } => Self::Delivery {
                keyword: Some(backend.to_string()),
                kind,
                source,
            },
            other => other,
        }
    }

    /// Keyword of the backend involved, when the failure came from one.
    pub fn keyword(&self) -> Option<&str> {
        match self {
            Self::Backend { keyword, .. } => Some(keyword),
            Self::Delivery { keyword, .. } => keyword.as_deref(),
            Self::Registry(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
