use {
    botchoice_config::{
        BotEntry, MediaKind,
        schema::{IMAGE_KEYWORD, VIDEO_KEYWORD, default_bot_list},
    },
    secrecy::Secret,
    tracing::{debug, warn},
};

use crate::{Error, Result};

/// A keyword bound to a resolved backend.
#[derive(Debug, Clone)]
pub struct BackendDescriptor {
    pub keyword: String,
    pub url: String,
    pub kind: BackendKind,
}

/// What a descriptor does when its keyword matches. Resolved at load time.
#[derive(Debug, Clone)]
pub enum BackendKind {
    /// `GET {url}?{query}` returning a JSON body with a single media URL.
    MediaFetch(MediaBackend),
    /// OpenAI-compatible `POST {url}/chat/completions`.
    Completion(CompletionBackend),
    /// Neither shape; matched but never invoked.
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaBackend {
    pub query: String,
    pub result_field: String,
    pub media: MediaKind,
    pub failure_text: String,
}

impl MediaBackend {
    fn new(query: &str, result_field: &str, media: MediaKind) -> Self {
        Self {
            query: query.into(),
            result_field: result_field.into(),
            media,
            failure_text: media.default_failure_text().into(),
        }
    }

    /// Built-in endpoint parameters for the well-known keywords.
    fn builtin(keyword: &str) -> Option<Self> {
        match keyword {
            VIDEO_KEYWORD => Some(Self::new("type=json", "video", MediaKind::Video)),
            IMAGE_KEYWORD => Some(Self::new("r18=1", "data", MediaKind::Image)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompletionBackend {
    pub model: String,
    pub credential: Secret<String>,
}

impl BackendDescriptor {
    /// Resolve a config entry.
    ///
    /// Precedence: explicit `media` section, built-in media keyword, then
    /// `model` + `key` for a completion backend.
    pub fn from_entry(entry: &BotEntry) -> Self {
        let kind = if let Some(media) = &entry.media {
            BackendKind::MediaFetch(MediaBackend {
                query: media.query.clone(),
                result_field: media.result_field.clone(),
                media: media.kind,
                failure_text: media
                    .failure_text
                    .clone()
                    .unwrap_or_else(|| media.kind.default_failure_text().into()),
            })
        } else if let Some(builtin) = MediaBackend::builtin(&entry.keyword) {
            BackendKind::MediaFetch(builtin)
        } else if let (Some(model), Some(key)) = (&entry.model, &entry.key) {
            BackendKind::Completion(CompletionBackend {
                model: model.clone(),
                credential: key.clone(),
            })
        } else {
            BackendKind::Unsupported
        };

        Self {
            keyword: entry.keyword.clone(),
            url: entry.url.clone(),
            kind,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self.kind, BackendKind::Unsupported)
    }
}

/// Ordered, immutable list of backend descriptors.
#[derive(Debug, Clone, Default)]
pub struct BackendRegistry {
    descriptors: Vec<BackendDescriptor>,
}

impl BackendRegistry {
    /// Build the registry from config entries.
    ///
    /// A keyword that appears more than once keeps the position of its first
    /// occurrence and the contents of its last.
    pub fn from_entries(entries: &[BotEntry]) -> Result<Self> {
        let mut descriptors: Vec<BackendDescriptor> = Vec::with_capacity(entries.len());

        for (index, entry) in entries.iter().enumerate() {
            // A blank keyword would match nearly every message.
            if entry.keyword.trim().is_empty() {
                return Err(Error::EmptyKeyword { index });
            }
            let descriptor = BackendDescriptor::from_entry(entry);
            if !descriptor.is_supported() {
                warn!(
                    keyword = %descriptor.keyword,
                    "backend has neither media nor completion settings, it will be skipped"
                );
            }

            match descriptors
                .iter_mut()
                .find(|d| d.keyword == descriptor.keyword)
            {
                Some(existing) => {
                    warn!(keyword = %descriptor.keyword, "duplicate keyword, later entry wins");
                    *existing = descriptor;
                },
                None => descriptors.push(descriptor),
            }
        }

        debug!(backends = descriptors.len(), "backend registry loaded");
        Ok(Self { descriptors })
    }

    /// The compiled-in default registry (random video + random image).
    pub fn builtin() -> Self {
        let descriptors = default_bot_list()
            .iter()
            .map(BackendDescriptor::from_entry)
            .collect();
        Self { descriptors }
    }

    pub fn iter(&self) -> impl Iterator<Item = &BackendDescriptor> {
        self.descriptors.iter()
    }

    pub fn get(&self, keyword: &str) -> Option<&BackendDescriptor> {
        self.descriptors.iter().find(|d| d.keyword == keyword)
    }

    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.descriptors.iter().map(|d| d.keyword.as_str())
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {
        super::*,
        botchoice_config::MediaEndpointConfig,
        secrecy::ExposeSecret,
    };

    #[test]
    fn builtin_registry_resolves_media_backends() {
        let registry = BackendRegistry::builtin();
        assert_eq!(registry.len(), 2);

        let BackendKind::MediaFetch(video) = &registry.get("/sjxjj").unwrap().kind else {
            panic!("expected media backend");
        };
        assert_eq!(video.query, "type=json");
        assert_eq!(video.result_field, "video");
        assert_eq!(video.media, MediaKind::Video);

        let BackendKind::MediaFetch(image) = &registry.get("/sjtp").unwrap().kind else {
            panic!("expected media backend");
        };
        assert_eq!(image.query, "r18=1");
        assert_eq!(image.result_field, "data");
        assert_eq!(image.failure_text, "获取图片失败，请稍后再试");
    }

    #[test]
    fn completion_entry_needs_model_and_key() {
        let full = BotEntry::new("/gpt", "https://api.example.com/v1").with_completion("gpt-4o", "sk");
        let BackendKind::Completion(c) = BackendDescriptor::from_entry(&full).kind else {
            panic!("expected completion backend");
        };
        assert_eq!(c.model, "gpt-4o");
        assert_eq!(c.credential.expose_secret(), "sk");

        let mut half = BotEntry::new("/gpt", "https://api.example.com/v1");
        half.model = Some("gpt-4o".into());
        assert!(!BackendDescriptor::from_entry(&half).is_supported());
    }

    #[test]
    fn builtin_keyword_wins_over_completion_settings() {
        let entry = BotEntry::new("/sjtp", "https://img").with_completion("m", "k");
        assert!(matches!(
            BackendDescriptor::from_entry(&entry).kind,
            BackendKind::MediaFetch(_)
        ));
    }

    #[test]
    fn explicit_media_section_is_used() {
        let entry = BotEntry::new("/cat", "https://cats").with_media(MediaEndpointConfig {
            query: String::new(),
            result_field: "url".into(),
            kind: MediaKind::File,
            failure_text: Some("no cat".into()),
        });
        let BackendKind::MediaFetch(media) = BackendDescriptor::from_entry(&entry).kind else {
            panic!("expected media backend");
        };
        assert_eq!(media.failure_text, "no cat");
        assert_eq!(media.media, MediaKind::File);
    }

    #[test]
    fn duplicate_keyword_last_wins_in_first_position() {
        let entries = vec![
            BotEntry::new("/a", "https://first").with_completion("m1", "k"),
            BotEntry::new("/b", "https://b").with_completion("m", "k"),
            BotEntry::new("/a", "https://second").with_completion("m2", "k"),
        ];
        let registry = BackendRegistry::from_entries(&entries).unwrap();
        let keywords: Vec<_> = registry.keywords().collect();
        assert_eq!(keywords, ["/a", "/b"]);
        assert_eq!(registry.get("/a").unwrap().url, "https://second");
    }

    #[test]
    fn empty_keyword_is_rejected() {
        let entries = vec![BotEntry::new("/ok", "https://x"), BotEntry::new("", "https://y")];
        let err = BackendRegistry::from_entries(&entries).unwrap_err();
        assert!(matches!(err, Error::EmptyKeyword { index: 1 }));
    }

    #[test]
    fn whitespace_keyword_is_rejected() {
        for keyword in [" ", "\t", "  \n"] {
            let entries = vec![BotEntry::new(keyword, "https://x").with_completion("m", "k")];
            let err = BackendRegistry::from_entries(&entries).unwrap_err();
            assert!(matches!(err, Error::EmptyKeyword { index: 0 }));
        }
    }
}
