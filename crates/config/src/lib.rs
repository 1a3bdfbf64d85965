//! Configuration loading, validation and env substitution.
//!
//! Config files: `botchoice.toml`, `botchoice.yaml`, or `botchoice.json`
//! Searched in `./` then `~/.config/botchoice/`. When none exists the bundled
//! `config.json.template` is used, and failing that the compiled-in defaults.
//!
//! Supports `${ENV_VAR}` substitution in all string values.

pub mod env_subst;
pub mod error;
pub mod loader;
pub mod schema;
pub mod template;
pub mod validate;

pub use {
    error::{Error, Result},
    loader::{config_dir, discover_and_load, load_config, locate_config},
    schema::{BotChoiceConfig, BotEntry, MediaEndpointConfig, MediaKind, UnclassifiedAs},
    validate::{Diagnostic, Severity, ValidationResult},
};
