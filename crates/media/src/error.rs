/// Image download failures. Callers fall back to sending the link as text.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("{url} is not an image ({content_type})")]
    NotAnImage { url: String, content_type: String },
    #[error("{url} is {size} bytes, limit is {limit}")]
    TooLarge { url: String, size: u64, limit: u64 },
}

impl Error {
    #[must_use]
    pub fn request(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Request {
            url: url.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
