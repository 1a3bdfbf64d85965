//! Turning backend results into replies and handing them to the sink.

use std::time::Duration;

use {
    botchoice_channels::ReplySink,
    botchoice_common::Reply,
    botchoice_config::{MediaKind, UnclassifiedAs},
    botchoice_media::{ContentKind, download::download_image, extract_media_links, to_reply},
    botchoice_providers::BackendResult,
    tracing::{debug, warn},
};

use crate::{Error, Result};

/// Options for delivering completion items.
#[derive(Debug, Clone, Copy)]
pub struct DeliveryOptions {
    /// Scan completion items for embedded media links.
    pub media_extraction: bool,
    pub unclassified_as: UnclassifiedAs,
    pub max_image_bytes: usize,
    pub download_timeout: Duration,
}

/// Typed reply for a random-media URL.
pub fn media_reply(media: MediaKind, url: String) -> Reply {
    match media {
        MediaKind::Image => Reply::ImageUrl(url),
        MediaKind::Video => Reply::VideoUrl(url),
        MediaKind::File => Reply::FileUrl(url),
    }
}

/// Send one reply, mapping sink failures into [`Error::Delivery`].
pub async fn send(sink: &dyn ReplySink, reply: Reply) -> Result<()> {
    let kind = reply.kind();
    sink.send(&reply).await.map_err(|source| Error::Delivery {
        keyword: None,
        kind,
        source,
    })
}

/// Delivers backend results through a sink.
pub struct Deliverer {
    client: reqwest::Client,
    options: DeliveryOptions,
}

impl Deliverer {
    pub fn new(client: reqwest::Client, options: DeliveryOptions) -> Self {
        Self { client, options }
    }

    pub fn options(&self) -> &DeliveryOptions {
        &self.options
    }

    /// Deliver everything `result` carries, in order.
    ///
    /// A sink failure aborts delivery and is returned, except for links found
    /// by media extraction: those fail one at a time.
    pub async fn deliver(&self, result: BackendResult, sink: &dyn ReplySink) -> Result<()> {
        match result {
            BackendResult::MediaUrl { media, url } => send(sink, media_reply(media, url)).await,
            BackendResult::MediaUnavailable { message } => send(sink, Reply::Text(message)).await,
            BackendResult::Completion(items) => {
                debug!(items = items.len(), "delivering completion items");
                for item in items {
                    if self.options.media_extraction {
                        self.deliver_extracted(item, sink).await?;
                    } else {
                        send(sink, to_reply(item, self.options.unclassified_as)).await?;
                    }
                }
                Ok(())
            },
            BackendResult::Skipped => Ok(()),
        }
    }

    /// Deliver an item whose embedded media links are sent individually.
    ///
    /// Images are downloaded and sent inline. A failed download falls back to
    /// the item text, sent at most once per item. Items without media links
    /// are classified as usual.
    async fn deliver_extracted(&self, item: String, sink: &dyn ReplySink) -> Result<()> {
        let links = extract_media_links(&item);
        if links.is_empty() {
            return send(sink, to_reply(item, self.options.unclassified_as)).await;
        }

        let mut text_fallback_used = false;
        for link in links {
            let reply = match link.kind {
                ContentKind::Image => match download_image(
                    &self.client,
                    &link.url,
                    self.options.max_image_bytes,
                    self.options.download_timeout,
                )
                .await
                {
                    Ok(bytes) => Reply::Image(bytes),
                    Err(e) if text_fallback_used => {
                        warn!(url = %link.url, error = %e, "image download failed");
                        continue;
                    },
                    Err(e) => {
                        warn!(url = %link.url, error = %e, "image download failed, sending text");
                        text_fallback_used = true;
                        Reply::Text(item.clone())
                    },
                },
                ContentKind::Video => Reply::VideoUrl(link.url.clone()),
                ContentKind::File => Reply::FileUrl(link.url.clone()),
                ContentKind::Text | ContentKind::Unclassified => continue,
            };
            if let Err(e) = send(sink, reply).await {
                warn!(url = %link.url, error = %e, "media reply failed");
            }
        }
        Ok(())
    }
}
