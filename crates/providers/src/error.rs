use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Connection failure, timeout, or an unreadable body.
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },

    /// The body parsed but did not contain the expected field.
    #[error("malformed response from {url}: {message}")]
    MalformedResponse { url: String, message: String },
}

impl Error {
    #[must_use]
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    #[must_use]
    pub fn malformed(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            url: url.into(),
            message: message.into(),
        }
    }

    /// `true` for timeouts, which callers may want to log differently.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Network { source, .. } if source.is_timeout())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
