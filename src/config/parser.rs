//! Settings document parsing.
//!
//! The updater reads a small key-value settings document. JSON is the native
//! format (`config.json` shipped next to the application); a path ending in
//! `.toml` is parsed as TOML instead so the same keys can be written either way.
//!
//! Parsing is strict here: callers that need the fall-back-to-defaults
//! behaviour go through [`UpdateConfig::load_or_default`](super::UpdateConfig::load_or_default).

use anyhow::{Context, Result};
use std::path::Path;

/// Settings document formats understood by [`parse_config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON object (default)
    Json,
    /// TOML table
    Toml,
}

impl ConfigFormat {
    /// Picks the format from the file extension; anything but `.toml` is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::Toml,
            _ => Self::Json,
        }
    }
}

/// Parse a settings document into the specified type.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not deserialize into `T`.
/// The error chain carries the file path.
pub fn parse_config<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_config_str(&content, ConfigFormat::from_path(path))
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse settings from an in-memory document.
pub fn parse_config_str<T>(content: &str, format: ConfigFormat) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let config = match format {
        ConfigFormat::Json => serde_json::from_str(content)?,
        ConfigFormat::Toml => toml::from_str(content)?,
    };
    Ok(config)
}
