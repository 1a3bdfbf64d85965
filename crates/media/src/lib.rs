//! Media pipeline: classify reply content, extract media links from prose,
//! download images for inline delivery.

pub mod classify;
pub mod download;
pub mod error;
pub mod extract;

pub use {
    classify::{ContentKind, classify, to_reply},
    error::{Error, Result},
    extract::{MediaLink, extract_media_links},
};
