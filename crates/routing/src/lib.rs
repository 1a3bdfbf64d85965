//! Keyword routing: which configured backends an inbound message triggers.
//!
//! The registry is resolved once from config into tagged descriptors and is
//! read-only afterwards, so it can be shared across concurrent dispatches.

pub mod error;
pub mod matcher;
pub mod registry;

pub use {
    error::{Error, Result},
    registry::{BackendDescriptor, BackendKind, BackendRegistry, CompletionBackend, MediaBackend},
};
