//! Inbound message processing: the glue between the host's message events and
//! the configured backends.
//!
//! Flow: inbound text → keyword gate → acknowledgment → invoke each matching
//! backend → classify result items → deliver via the reply sink. A failed
//! cycle is retried a bounded number of times before a terminal error reply.

pub mod deliver;
pub mod dispatch;
pub mod error;
pub mod plugin;

pub use {
    dispatch::{DispatchOutcome, DispatchSettings, DispatchState, Dispatcher, EventAction},
    error::{Error, Result},
    plugin::BotChoicePlugin,
};
