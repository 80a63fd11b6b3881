//! Secondary transform engine (babel) seam
//!
//! Engines expose one of two option-loading entry points. Which one is used
//! is decided once by [`EngineAdapter::detect`] from the engine's capability
//! flag, not from its version number.

use serde_json::{Map, Value};
use tsj_fs::{ConfigStore, NormalizedPath};

use crate::{Error, Result};

/// First engine major version that understands the `cwd` option
pub const CWD_SUPPORT_MAJOR: u64 = 7;

/// File layered beneath explicit options by [`StandardEngine`]
pub const PROJECT_CONFIG_FILE_NAME: &str = "babel.config.json";

/// Capabilities consumed from the secondary transform engine
pub trait TransformEngine: Send + Sync {
    fn version(&self) -> &str;

    /// Whether the current `load_options` entry point exists.
    fn supports_load_options(&self) -> bool;

    /// Current entry point.
    fn load_options(&self, base: Map<String, Value>) -> Result<Map<String, Value>>;

    /// Legacy entry point.
    fn init_options(&self, base: Map<String, Value>) -> Result<Map<String, Value>>;
}

/// Entry point selected for an engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineAdapter {
    Legacy,
    Current,
}

impl EngineAdapter {
    pub fn detect(engine: &dyn TransformEngine) -> Self {
        let adapter = if engine.supports_load_options() {
            Self::Current
        } else {
            Self::Legacy
        };
        tracing::debug!(version = engine.version(), ?adapter, "Selected secondary engine adapter");
        adapter
    }

    /// Hand `base` to the engine through this adapter's entry point.
    ///
    /// `cwd` is dropped for engines older than [`CWD_SUPPORT_MAJOR`].
    pub fn load(self, engine: &dyn TransformEngine, mut base: Map<String, Value>) -> Result<Map<String, Value>> {
        match engine_major(engine.version()) {
            Some(major) if major < CWD_SUPPORT_MAJOR => {
                base.remove("cwd");
            }
            Some(_) => {}
            None => tracing::warn!(version = engine.version(), "Unparseable secondary engine version"),
        }

        match self {
            Self::Current => engine.load_options(base),
            Self::Legacy => engine.init_options(base),
        }
    }
}

fn engine_major(version: &str) -> Option<u64> {
    let version = version.trim();
    semver::Version::parse(version)
        .or_else(|_| semver::Version::parse(&format!("{version}.0")))
        .or_else(|_| semver::Version::parse(&format!("{version}.0.0")))
        .map(|v| v.major)
        .ok()
}

/// Built-in engine
///
/// The current entry point merges explicit options over the project-wide
/// `babel.config.json` found in `cwd`. The legacy entry point returns its
/// input unchanged.
#[derive(Debug, Clone)]
pub struct StandardEngine {
    version: String,
    load_options: bool,
}

impl StandardEngine {
    pub fn new() -> Self {
        Self {
            version: "7.0.0".to_string(),
            load_options: true,
        }
    }

    /// An engine that only offers the legacy entry point.
    pub fn legacy(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            load_options: false,
        }
    }
}

impl Default for StandardEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformEngine for StandardEngine {
    fn version(&self) -> &str {
        &self.version
    }

    fn supports_load_options(&self) -> bool {
        self.load_options
    }

    fn load_options(&self, base: Map<String, Value>) -> Result<Map<String, Value>> {
        let Some(cwd) = base.get("cwd").and_then(Value::as_str) else {
            return Ok(base);
        };
        let project_file = NormalizedPath::new(cwd).join(PROJECT_CONFIG_FILE_NAME);
        if !project_file.is_file() {
            return Ok(base);
        }

        let mut options = match ConfigStore::new().load_value(&project_file)? {
            Value::Object(map) => map,
            other => {
                return Err(Error::Engine {
                    message: format!("{project_file} must contain an object, found {other}"),
                });
            }
        };
        options.extend(base);
        Ok(options)
    }

    fn init_options(&self, base: Map<String, Value>) -> Result<Map<String, Value>> {
        Ok(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;
    use std::fs;

    fn base(cwd: &str) -> Map<String, Value> {
        json!({ "cwd": cwd, "presets": ["env"] }).as_object().cloned().unwrap()
    }

    #[rstest]
    #[case("7.4.0", Some(7))]
    #[case("6", Some(6))]
    #[case("6.26", Some(6))]
    #[case("bogus", None)]
    fn major_version_parsing(#[case] version: &str, #[case] expected: Option<u64>) {
        assert_eq!(engine_major(version), expected);
    }

    #[test]
    fn adapter_follows_capability() {
        assert_eq!(EngineAdapter::detect(&StandardEngine::new()), EngineAdapter::Current);
        assert_eq!(EngineAdapter::detect(&StandardEngine::legacy("6.26.0")), EngineAdapter::Legacy);
    }

    #[test]
    fn legacy_engine_loses_cwd() {
        let engine = StandardEngine::legacy("6.26.0");
        let loaded = EngineAdapter::detect(&engine).load(&engine, base("/work")).unwrap();
        assert!(!loaded.contains_key("cwd"));
        assert_eq!(loaded["presets"], json!(["env"]));
    }

    #[test]
    fn current_engine_layers_project_file_beneath() {
        let dir = tempfile::TempDir::new().unwrap();
        fs::write(
            dir.path().join(PROJECT_CONFIG_FILE_NAME),
            r#"{ "presets": ["from-file"], "plugins": ["istanbul"] }"#,
        )
        .unwrap();
        let cwd = NormalizedPath::new(dir.path());
        let engine = StandardEngine::new();

        let loaded = EngineAdapter::Current.load(&engine, base(cwd.as_str())).unwrap();

        assert_eq!(loaded["presets"], json!(["env"]));
        assert_eq!(loaded["plugins"], json!(["istanbul"]));
        assert_eq!(loaded["cwd"], cwd.as_str());
    }

    #[test]
    fn non_object_project_file_is_an_engine_error() {
        let dir = tempfile::TempDir::new().unwrap();
        fs::write(dir.path().join(PROJECT_CONFIG_FILE_NAME), "[]").unwrap();
        let cwd = NormalizedPath::new(dir.path());

        let err = StandardEngine::new().load_options(base(cwd.as_str())).unwrap_err();
        assert!(matches!(err, Error::Engine { .. }));
    }
}
