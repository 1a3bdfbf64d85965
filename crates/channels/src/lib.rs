//! Reply channel abstraction.
//!
//! The host framework owns the chat transport; the dispatcher only sees a
//! [`ReplySink`] that accepts typed replies for the conversation a message
//! came from.

pub mod error;
pub mod memory;
pub mod sink;

pub use {
    error::{Error, Result},
    memory::RecordingSink,
    sink::ReplySink,
};
