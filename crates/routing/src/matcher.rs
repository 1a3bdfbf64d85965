//! Keyword gate and keyword stripping.

use botchoice_common::InboundMessage;

use crate::registry::{BackendDescriptor, BackendRegistry};

impl BackendRegistry {
    /// `true` iff at least one registered keyword occurs in `text`.
    ///
    /// This is the "not for me" gate and must run before any network call.
    pub fn should_handle(&self, text: &str) -> bool {
        self.keywords().any(|k| text.contains(k))
    }

    /// Every descriptor whose keyword occurs in `text`, in registry order.
    pub fn find_matching(&self, text: &str) -> Vec<&BackendDescriptor> {
        self.iter().filter(|d| text.contains(&d.keyword)).collect()
    }

    /// Remove every registered keyword from `text`, matched or not.
    pub fn strip_keywords(&self, text: &str) -> String {
        self.keywords()
            .fold(text.to_string(), |acc, keyword| acc.replace(keyword, ""))
    }
}

/// Return the message text when the message is for this router.
///
/// Non-text messages and text without any keyword yield `None`.
pub fn gate<'a>(registry: &BackendRegistry, msg: &'a InboundMessage) -> Option<&'a str> {
    (msg.is_text() && registry.should_handle(&msg.content)).then_some(msg.content.as_str())
}
