//! Format-aware configuration loading
//!
//! JSON-family files are read with a JSON5 parser so comments and trailing
//! commas are accepted.

use crate::{Error, NormalizedPath, Result, io};
use serde::de::DeserializeOwned;

/// Formats understood by [`ConfigStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.json`, `.json5`, `.jsonc` and extension-less dotfiles like `.babelrc`
    Json5,
    Toml,
    Yaml,
}

impl ConfigFormat {
    /// Detect the format from the file extension.
    pub fn detect(path: &NormalizedPath) -> Result<Self> {
        match path.extension().map(str::to_lowercase).as_deref() {
            None | Some("json") | Some("json5") | Some("jsonc") => Ok(Self::Json5),
            Some("toml") => Ok(Self::Toml),
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            Some(other) => Err(Error::UnsupportedFormat {
                extension: other.to_string(),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Json5 => "JSON5",
            Self::Toml => "TOML",
            Self::Yaml => "YAML",
        }
    }
}

/// Parse JSON with comments and trailing commas.
pub fn parse_jsonc<T: DeserializeOwned>(content: &str) -> std::result::Result<T, json5::Error> {
    json5::from_str(content)
}

/// Read-only configuration loader.
#[derive(Debug, Default)]
pub struct ConfigStore;

impl ConfigStore {
    pub fn new() -> Self {
        Self
    }

    /// Load configuration from a file, detecting the format from its
    /// extension.
    pub fn load<T: DeserializeOwned>(&self, path: &NormalizedPath) -> Result<T> {
        let format = ConfigFormat::detect(path)?;
        let content = io::read_text(path)?;
        tracing::debug!(path = %path, format = format.name(), "Loading config file");

        let parsed = match format {
            ConfigFormat::Json5 => parse_jsonc(&content).map_err(|e| e.to_string()),
            ConfigFormat::Toml => toml::from_str(&content).map_err(|e| e.to_string()),
            ConfigFormat::Yaml => serde_yaml::from_str(&content).map_err(|e| e.to_string()),
        };

        parsed.map_err(|message| Error::ConfigParse {
            path: path.to_native(),
            format: format.name().into(),
            message,
        })
    }

    /// Load a file as an untyped JSON value.
    pub fn load_value(&self, path: &NormalizedPath) -> Result<serde_json::Value> {
        self.load(path)
    }
}
