use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{
    Error, Result,
    env_subst::substitute_env,
    error::Context,
    schema::BotChoiceConfig,
};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "botchoice.toml",
    "botchoice.yaml",
    "botchoice.yml",
    "botchoice.json",
];

/// Bundled template shipped next to the plugin, used when no config exists.
pub const TEMPLATE_FILENAME: &str = "config.json.template";

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> Result<BotChoiceConfig> {
    let raw = std::fs::read_to_string(path).map_err(|e| Error::read(path, e))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Resolve the effective configuration.
///
/// Search order:
/// 1. `explicit` path, when given
/// 2. `./botchoice.{toml,yaml,yml,json}` (project-local)
/// 3. `~/.config/botchoice/botchoice.{toml,yaml,yml,json}` (user-global)
/// 4. the bundled `config.json.template`
///
/// Returns `BotChoiceConfig::default()` when nothing loads.
pub fn discover_and_load(explicit: Option<&Path>) -> BotChoiceConfig {
    let candidates = explicit
        .map(Path::to_path_buf)
        .into_iter()
        .chain(find_config_file())
        .chain(find_template_file());

    for path in candidates {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, trying next source");
            },
        }
    }

    debug!("no usable config found, using defaults");
    BotChoiceConfig::default()
}

/// Path `discover_and_load` would try first: `explicit`, then a standard
/// config file, then the bundled template.
pub fn locate_config(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(find_config_file)
        .or_else(find_template_file)
}

/// Find the first config file in standard locations.
fn find_config_file() -> Option<PathBuf> {
    search_dirs()
        .into_iter()
        .flat_map(|dir| CONFIG_FILENAMES.iter().map(move |name| dir.join(name)))
        .find(|p| p.exists())
}

/// Find the bundled template in the working dir, the config dir, or beside
/// the executable.
fn find_template_file() -> Option<PathBuf> {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));

    search_dirs()
        .into_iter()
        .chain(exe_dir)
        .map(|dir| dir.join(TEMPLATE_FILENAME))
        .find(|p| p.exists())
}

fn search_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![PathBuf::from(".")];
    dirs.extend(config_dir());
    dirs
}

/// Returns the user-global config directory (`~/.config/botchoice/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "botchoice").map(|d| d.config_dir().to_path_buf())
}

fn parse_config(raw: &str, path: &Path) -> Result<BotChoiceConfig> {
    match config_format(path) {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        ext => Err(Error::UnsupportedFormat { ext: ext.into() }),
    }
}

/// Parse the raw file into a generic JSON value (used by validation).
pub(crate) fn parse_config_value(raw: &str, path: &Path) -> Result<serde_json::Value> {
    match config_format(path) {
        "toml" => {
            let v: toml::Value = toml::from_str(raw)?;
            serde_json::to_value(v).context("convert toml")
        },
        "yaml" | "yml" => {
            let v: serde_yaml::Value = serde_yaml::from_str(raw)?;
            serde_json::to_value(v).context("convert yaml")
        },
        "json" => Ok(serde_json::from_str(raw)?),
        ext => Err(Error::UnsupportedFormat { ext: ext.into() }),
    }
}

/// Format key derived from the extension. `config.json.template` is JSON.
fn config_format(path: &Path) -> &str {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    if name == TEMPLATE_FILENAME {
        return "json";
    }
    path.extension().and_then(|e| e.to_str()).unwrap_or("toml")
}
