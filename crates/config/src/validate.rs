//! Configuration validation.
//!
//! Detects unknown/misspelled fields and backend entries that would be
//! silently skipped or shadowed at dispatch time.

use std::{collections::HashSet, path::Path};

use crate::{
    loader,
    schema::{BotChoiceConfig, BotEntry, IMAGE_KEYWORD, VIDEO_KEYWORD},
};

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Dotted path, e.g. "bot_list[1].keyword"
    pub path: String,
    pub message: String,
}

impl Diagnostic {
    fn new(severity: Severity, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result of validating a configuration.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
    pub config_path: Option<std::path::PathBuf>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Count diagnostics by severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

const TOP_LEVEL_KEYS: &[&str] = &[
    "bot_list",
    "max_words",
    "short_help_text",
    "long_help_text",
    "max_retries",
    "retry_delay_ms",
    "completion_timeout_secs",
    "media_timeout_secs",
    "media_extraction",
    "unclassified_as",
    "max_image_bytes",
];

const BOT_ENTRY_KEYS: &[&str] = &["keyword", "url", "model", "key", "media"];

/// Validate the config that would be loaded for `explicit`, or the defaults
/// when no file is found.
#[must_use]
pub fn validate(explicit: Option<&Path>) -> ValidationResult {
    match loader::locate_config(explicit) {
        Some(path) => validate_file(&path),
        None => validate_config(&BotChoiceConfig::default()),
    }
}

/// Validate the config file at `path`: syntax, unknown fields, then the
/// semantic checks of [`validate_config`].
#[must_use]
pub fn validate_file(path: &Path) -> ValidationResult {
    let mut result = ValidationResult {
        diagnostics: Vec::new(),
        config_path: Some(path.to_path_buf()),
    };

    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => crate::env_subst::substitute_env(&raw),
        Err(e) => {
            result.diagnostics.push(Diagnostic::new(
                Severity::Error,
                "",
                format!("failed to read config file: {e}"),
            ));
            return result;
        },
    };

    match loader::parse_config_value(&raw, path) {
        Ok(value) => check_unknown_fields(&value, &mut result.diagnostics),
        Err(e) => {
            result
                .diagnostics
                .push(Diagnostic::new(Severity::Error, "", format!("syntax error: {e}")));
            return result;
        },
    }

    match loader::load_config(path) {
        Ok(config) => result.diagnostics.extend(validate_config(&config).diagnostics),
        Err(e) => result
            .diagnostics
            .push(Diagnostic::new(Severity::Error, "", format!("type error: {e}"))),
    }

    result
}

/// Semantic checks on an already parsed config.
#[must_use]
pub fn validate_config(config: &BotChoiceConfig) -> ValidationResult {
    let mut diagnostics = Vec::new();

    if config.max_words == 0 {
        diagnostics.push(Diagnostic::new(
            Severity::Error,
            "max_words",
            "max_words must be greater than zero",
        ));
    }
    if config.bot_list.is_empty() {
        diagnostics.push(Diagnostic::new(
            Severity::Warning,
            "bot_list",
            "no backends configured; every message will be ignored",
        ));
    }

    let mut seen = HashSet::new();
    for (i, entry) in config.bot_list.iter().enumerate() {
        let path = format!("bot_list[{i}]");
        check_entry(entry, &path, &mut diagnostics);
        if !entry.keyword.is_empty() && !seen.insert(entry.keyword.as_str()) {
            diagnostics.push(Diagnostic::new(
                Severity::Warning,
                format!("{path}.keyword"),
                format!(
                    "duplicate keyword '{}'; the last entry replaces earlier ones",
                    entry.keyword
                ),
            ));
        }
    }

    ValidationResult {
        diagnostics,
        config_path: None,
    }
}

fn check_entry(entry: &BotEntry, path: &str, diagnostics: &mut Vec<Diagnostic>) {
    if entry.keyword.trim().is_empty() {
        diagnostics.push(Diagnostic::new(
            Severity::Error,
            format!("{path}.keyword"),
            "keyword must not be empty",
        ));
    }
    if !entry.url.starts_with("http://") && !entry.url.starts_with("https://") {
        diagnostics.push(Diagnostic::new(
            Severity::Warning,
            format!("{path}.url"),
            format!("'{}' is not an http(s) URL", entry.url),
        ));
    }

    match (entry.model.is_some(), entry.key.is_some()) {
        (true, false) => diagnostics.push(Diagnostic::new(
            Severity::Warning,
            format!("{path}.key"),
            "model is set without key; entry is not a completion backend",
        )),
        (false, true) => diagnostics.push(Diagnostic::new(
            Severity::Warning,
            format!("{path}.model"),
            "key is set without model; entry is not a completion backend",
        )),
        _ => {},
    }

    let is_completion = entry.model.is_some() && entry.key.is_some();
    let is_builtin = entry.keyword == VIDEO_KEYWORD || entry.keyword == IMAGE_KEYWORD;
    if !is_completion && !is_builtin && entry.media.is_none() {
        diagnostics.push(Diagnostic::new(
            Severity::Warning,
            path.to_string(),
            format!(
                "'{}' is neither a completion backend nor a media backend and will be skipped",
                entry.keyword
            ),
        ));
    }
}

fn check_unknown_fields(value: &serde_json::Value, diagnostics: &mut Vec<Diagnostic>) {
    let Some(root) = value.as_object() else {
        diagnostics.push(Diagnostic::new(
            Severity::Error,
            "",
            "config root must be a table/object",
        ));
        return;
    };

    for key in root.keys() {
        if !TOP_LEVEL_KEYS.contains(&key.as_str()) {
            diagnostics.push(unknown_field(key, key, TOP_LEVEL_KEYS));
        }
    }

    let entries = root
        .get("bot_list")
        .and_then(|v| v.as_array())
        .map(Vec::as_slice)
        .unwrap_or_default();
    for (i, entry) in entries.iter().enumerate() {
        let Some(obj) = entry.as_object() else {
            continue;
        };
        for key in obj.keys() {
            if !BOT_ENTRY_KEYS.contains(&key.as_str()) {
                diagnostics.push(unknown_field(
                    key,
                    &format!("bot_list[{i}].{key}"),
                    BOT_ENTRY_KEYS,
                ));
            }
        }
    }
}

fn unknown_field(key: &str, path: &str, known: &[&str]) -> Diagnostic {
    let message = match suggest(key, known, 2) {
        Some(s) => format!("unknown field '{key}' (did you mean '{s}'?)"),
        None => format!("unknown field '{key}'"),
    };
    Diagnostic::new(Severity::Error, path, message)
}

/// Levenshtein edit distance between two strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();

    for (i, ca) in a.chars().enumerate() {
        let mut curr = vec![i + 1; b_chars.len() + 1];
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        prev = curr;
    }

    prev[b_chars.len()]
}

fn suggest<'a>(needle: &str, candidates: &[&'a str], max_distance: usize) -> Option<&'a str> {
    candidates
        .iter()
        .map(|c| (*c, levenshtein(needle, c)))
        .filter(|(_, d)| *d <= max_distance)
        .min_by_key(|(_, d)| *d)
        .map(|(c, _)| c)
}
