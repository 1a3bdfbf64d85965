use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
};

use {
    async_trait::async_trait,
    botchoice_common::{Reply, ReplyKind},
    tracing::debug,
};

use crate::{Error, Result, sink::ReplySink};

/// In-memory [`ReplySink`] that records every delivered reply.
///
/// Used by hosts that collect replies before forwarding them, and by tests.
/// Can be told to reject certain reply kinds or the first N sends.
#[derive(Debug, Default)]
pub struct RecordingSink {
    replies: Mutex<Vec<Reply>>,
    rejected_kinds: Vec<ReplyKind>,
    fail_first: AtomicUsize,
    attempts: AtomicUsize,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every reply of `kind` with [`Error::Unsupported`].
    #[must_use]
    pub fn rejecting(mut self, kind: ReplyKind) -> Self {
        self.rejected_kinds.push(kind);
        self
    }

    /// Fail the first `n` sends with [`Error::Unavailable`].
    #[must_use]
    pub fn failing_first(self, n: usize) -> Self {
        self.fail_first.store(n, Ordering::SeqCst);
        self
    }

    /// Replies delivered so far, in order.
    pub fn replies(&self) -> Vec<Reply> {
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Drain the recorded replies.
    pub fn take(&self) -> Vec<Reply> {
        std::mem::take(&mut *self.replies.lock().unwrap_or_else(|e| e.into_inner()))
    }

    /// Number of `send` calls, including rejected ones.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReplySink for RecordingSink {
    async fn send(&self, reply: &Reply) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        let failing = self
            .fail_first
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(Error::unavailable("recording sink told to fail"));
        }
        if self.rejected_kinds.contains(&reply.kind()) {
            return Err(Error::unsupported(reply.kind()));
        }

        debug!(kind = %reply.kind(), "recorded reply");
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(reply.clone());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {super::*, std::sync::Arc};

    #[tokio::test]
    async fn records_in_order() {
        let sink = RecordingSink::new();
        sink.send_text("one").await.unwrap();
        sink.send(&Reply::VideoUrl("http://x/v.mp4".into()))
            .await
            .unwrap();

        assert_eq!(
            sink.replies(),
            vec![
                Reply::Text("one".into()),
                Reply::VideoUrl("http://x/v.mp4".into())
            ]
        );
        assert_eq!(sink.take().len(), 2);
        assert!(sink.replies().is_empty());
    }

    #[tokio::test]
    async fn rejects_configured_kind() {
        let sink = RecordingSink::new().rejecting(ReplyKind::ImageUrl);
        let err = sink
            .send(&Reply::ImageUrl("http://x/a.png".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Unsupported { .. }));
        sink.send_text("ok").await.unwrap();
        assert_eq!(sink.replies().len(), 1);
        assert_eq!(sink.attempts(), 2);
    }

    #[tokio::test]
    async fn fails_first_n_sends() {
        let sink = RecordingSink::new().failing_first(2);
        assert!(sink.send_text("a").await.is_err());
        assert!(sink.send_text("b").await.is_err());
        sink.send_text("c").await.unwrap();
        assert_eq!(sink.replies(), vec![Reply::Text("c".into())]);
    }

    #[tokio::test]
    async fn arc_sink_forwards() {
        let sink = Arc::new(RecordingSink::new());
        let shared: Arc<dyn ReplySink> = sink.clone();
        shared.send_text("hi").await.unwrap();
        assert_eq!(sink.replies().len(), 1);
    }
}
