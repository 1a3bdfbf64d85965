//! Shared types and error helpers used across all botchoice crates.

pub mod error;
pub mod types;

pub use {
    error::FromMessage,
    types::{InboundMessage, MessageKind, Reply, ReplyKind},
};
