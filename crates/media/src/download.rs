use std::time::Duration;

use {bytes::Bytes, tracing::debug};

use crate::{Error, Result};

/// Download an image for inline delivery.
///
/// Rejects non-2xx responses, non-image content types (a missing
/// `Content-Type` is accepted), and bodies larger than `max_bytes`.
pub async fn download_image(
    client: &reqwest::Client,
    url: &str,
    max_bytes: usize,
    timeout: Duration,
) -> Result<Bytes> {
    let resp = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| Error::request(url, e))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(Error::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    if let Some(content_type) = resp
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        && !content_type.to_ascii_lowercase().starts_with("image/")
    {
        return Err(Error::NotAnImage {
            url: url.to_string(),
            content_type: content_type.to_string(),
        });
    }

    let limit = max_bytes as u64;
    if let Some(len) = resp.content_length()
        && len > limit
    {
        return Err(Error::TooLarge {
            url: url.to_string(),
            size: len,
            limit,
        });
    }

    let body = resp
        .bytes()
        .await
        .map_err(|e| Error::request(url, e))?;
    if body.len() > max_bytes {
        return Err(Error::TooLarge {
            url: url.to_string(),
            size: body.len() as u64,
            limit,
        });
    }

    debug!(url, bytes = body.len(), "downloaded image");
    Ok(body)
}
