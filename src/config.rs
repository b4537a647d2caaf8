//! Build configuration.
//!
//! Settings live in `prep.toml` in the working directory (or wherever
//! `--config` points). The file is optional and sparse: stock defaults are
//! serialized to a TOML table, the user's file is merged on top of it, and
//! the result is deserialized and validated.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [content]
//! extensions = ["md"]       # Markdown file extensions, no leading dot
//!
//! [annotate]
//! root = "projects"         # Tree whose Markdown gets image dimensions
//! image_base = "."          # Image sources resolve against this directory
//!
//! [bundle]
//! source = "projects"
//! output = "projects/projects-cache-static-export.js"
//! global_name = "projectsContent"   # window.<global_name> = { ... }
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILENAME: &str = "prep.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrepConfig {
    /// Which files count as Markdown documents.
    pub content: ContentConfig,
    /// Image dimension annotation settings.
    pub annotate: AnnotateConfig,
    /// Offline content bundle settings.
    pub bundle: BundleConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContentConfig {
    /// File extensions (without the dot), matched case-insensitively.
    pub extensions: Vec<String>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["md".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnnotateConfig {
    /// Content root to rewrite in place.
    pub root: PathBuf,
    /// Directory that image sources are resolved against. A source of
    /// `/pics/a.png` becomes `<image_base>/pics/a.png` regardless of where
    /// the referencing document lives.
    pub image_base: PathBuf,
}

impl Default for AnnotateConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("projects"),
            image_base: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BundleConfig {
    /// Tree whose Markdown is embedded.
    pub source: PathBuf,
    /// Generated script path.
    pub output: PathBuf,
    /// Name assigned on `window` when the page is opened from disk.
    pub global_name: String,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("projects"),
            output: PathBuf::from("projects/projects-cache-static-export.js"),
            global_name: "projectsContent".to_string(),
        }
    }
}

/// Whether `name` can be used as `window.<name>` without quoting.
pub fn is_js_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    let start_ok = first.is_ascii_alphabetic() || first == '_' || first == '$';
    start_ok && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

impl PrepConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.content.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "content.extensions must not be empty".into(),
            ));
        }
        for ext in &self.content.extensions {
            if ext.is_empty() || ext.starts_with('.') {
                return Err(ConfigError::Validation(format!(
                    "content.extensions entries must be non-empty and have no leading dot: {ext:?}"
                )));
            }
        }
        if !is_js_identifier(&self.bundle.global_name) {
            return Err(ConfigError::Validation(format!(
                "bundle.global_name must be a JavaScript identifier: {:?}",
                self.bundle.global_name
            )));
        }
        if self.bundle.output.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "bundle.output must not be empty".into(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Stock defaults as a `toml::Value::Table`, the base layer for merging.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(PrepConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value. `Ok(None)` if it doesn't exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<PrepConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: PrepConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, falling back to stock defaults if it is absent.
pub fn load_config(path: &Path) -> Result<PrepConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// A fully-commented stock `prep.toml`. Printed by `gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# folio-prep configuration
# =======================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Content
# ---------------------------------------------------------------------------
[content]
# Extensions (no leading dot) that mark a file as a Markdown document.
# Matching is case-insensitive; "mdx" files are not included by default.
extensions = ["md"]

# ---------------------------------------------------------------------------
# Image dimensions (`folio-prep dimensions`)
# ---------------------------------------------------------------------------
[annotate]
# Markdown under this directory is rewritten in place.
root = "projects"

# Image sources resolve against this directory, with leading "/" removed.
# "." is the directory folio-prep runs from.
image_base = "."

# ---------------------------------------------------------------------------
# Offline bundle (`folio-prep bundle`)
# ---------------------------------------------------------------------------
[bundle]
# Markdown under this directory is embedded verbatim.
source = "projects"

# Generated script. Parent directories are created as needed.
output = "projects/projects-cache-static-export.js"

# The table is installed as window.<global_name> when the page is opened
# from disk (any protocol other than http/https).
global_name = "projectsContent"
"##
}
