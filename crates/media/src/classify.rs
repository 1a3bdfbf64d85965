//! Infer the media kind of a reply item from its URL extension.

use {
    botchoice_common::Reply,
    botchoice_config::{MediaKind, UnclassifiedAs},
    tracing::error,
};

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "img"];
// pdf has always been delivered as a video reply; kept for compatibility.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "pdf"];
pub const FILE_EXTENSIONS: &[&str] = &["doc", "docx", "xls", "xlsx", "zip", "rar", "txt"];

/// Kind of a reply item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Text,
    Image,
    Video,
    File,
    /// An http(s) URL whose extension is in no known category.
    Unclassified,
}

impl From<MediaKind> for ContentKind {
    fn from(kind: MediaKind) -> Self {
        match kind {
            MediaKind::Image => Self::Image,
            MediaKind::Video => Self::Video,
            MediaKind::File => Self::File,
        }
    }
}

/// `true` if `s` starts with `http://` or `https://` (case-insensitive).
pub fn is_http_url(s: &str) -> bool {
    let head: String = s.chars().take(8).collect::<String>().to_ascii_lowercase();
    head.starts_with("http://") || head.starts_with("https://")
}

/// Classify a reply item.
///
/// Anything that is not an http(s) URL is text. For URLs the extension of the
/// last path segment is checked first, then the whole URL's suffix; the
/// categories are tried in the order images, videos, files.
pub fn classify(item: &str) -> ContentKind {
    let item = item.trim();
    if !is_http_url(item) {
        return ContentKind::Text;
    }

    let lower = item.to_lowercase();
    path_extension(&lower)
        .and_then(category_of_extension)
        .or_else(|| category_of_suffix(&lower))
        .unwrap_or(ContentKind::Unclassified)
}

/// Extension of the last path segment, query and fragment excluded.
fn path_extension(lowered: &str) -> Option<String> {
    let path = match url::Url::parse(lowered) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => lowered
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    };
    let segment = path.rsplit('/').next().unwrap_or_default();
    segment
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_string())
        .filter(|ext| !ext.is_empty())
}

fn category_of_extension(ext: String) -> Option<ContentKind> {
    let ext = ext.as_str();
    if IMAGE_EXTENSIONS.contains(&ext) {
        Some(ContentKind::Image)
    } else if VIDEO_EXTENSIONS.contains(&ext) {
        Some(ContentKind::Video)
    } else if FILE_EXTENSIONS.contains(&ext) {
        Some(ContentKind::File)
    } else {
        None
    }
}

fn category_of_suffix(lowered: &str) -> Option<ContentKind> {
    let ends_with_any = |exts: &[&str]| exts.iter().any(|ext| lowered.ends_with(ext));
    if ends_with_any(IMAGE_EXTENSIONS) {
        Some(ContentKind::Image)
    } else if ends_with_any(VIDEO_EXTENSIONS) {
        Some(ContentKind::Video)
    } else if ends_with_any(FILE_EXTENSIONS) {
        Some(ContentKind::File)
    } else {
        None
    }
}

/// Turn a reply item into a typed [`Reply`] by URL reference.
///
/// `Unclassified` URLs follow `policy`.
pub fn to_reply(item: String, policy: UnclassifiedAs) -> Reply {
    match classify(&item) {
        ContentKind::Text => Reply::Text(item),
        ContentKind::Image => Reply::ImageUrl(item),
        ContentKind::Video => Reply::VideoUrl(item),
        ContentKind::File => Reply::FileUrl(item),
        ContentKind::Unclassified => {
            error!(url = %item, ?policy, "unsupported media extension");
            match policy {
                UnclassifiedAs::Text => Reply::Text(item),
                UnclassifiedAs::File => Reply::FileUrl(item),
            }
        },
    }
}
