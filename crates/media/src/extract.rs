//! Find media links embedded in free-form completion text.

use std::sync::LazyLock;

use regex::Regex;

use crate::classify::{ContentKind, classify};

/// http(s) URL up to whitespace, quotes, brackets or CJK punctuation.
#[allow(clippy::unwrap_used)]
static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)https?://[^\s"'<>()\[\]{}，。！？；：、（）【】「」]+"#).unwrap()
});

/// Trailing characters that end a sentence rather than a URL.
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?'];

/// A media link found in text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaLink {
    pub url: String,
    /// Always `Image`, `Video` or `File`.
    pub kind: ContentKind,
}

/// All links in `text` whose extension is a known media kind, in order of
/// appearance, without duplicates.
pub fn extract_media_links(text: &str) -> Vec<MediaLink> {
    let mut links: Vec<MediaLink> = Vec::new();
    for m in URL_RE.find_iter(text) {
        let url = m.as_str().trim_end_matches(TRAILING_PUNCTUATION);
        let kind = classify(url);
        if !matches!(kind, ContentKind::Image | ContentKind::Video | ContentKind::File) {
            continue;
        }
        if links.iter().any(|l| l.url == url) {
            continue;
        }
        links.push(MediaLink {
            url: url.to_string(),
            kind,
        });
    }
    links
}
