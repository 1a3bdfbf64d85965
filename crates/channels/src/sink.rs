use std::sync::Arc;

use {async_trait::async_trait, botchoice_common::Reply};

use crate::Result;

/// Sends typed replies back to the conversation an inbound message came from.
///
/// Implemented by the host's channel adapter. One sink instance is bound to a
/// single conversation for the duration of a dispatch.
#[async_trait]
pub trait ReplySink: Send + Sync {
    async fn send(&self, reply: &Reply) -> Result<()>;

    /// Convenience wrapper for [`Reply::Text`].
    async fn send_text(&self, text: &str) -> Result<()> {
        self.send(&Reply::Text(text.to_string())).await
    }
}

#[async_trait]
impl<T: ReplySink + ?Sized> ReplySink for Arc<T> {
    async fn send(&self, reply: &Reply) -> Result<()> {
        (**self).send(reply).await
    }
}
