//! Host runner settings
//!
//! The runner hands over its project settings either as a JSON string (when
//! asking for a cache key) or as an already decoded record. Only the fields
//! configuration resolution reads are typed; everything else is kept in
//! `extra` so it still contributes to the fingerprint.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::options::EMBEDDED_OPTIONS_KEY;
use crate::{Error, Result};

/// Project settings record provided by the host test runner
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunnerSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_dir: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_directory: Option<PathBuf>,

    #[serde(default)]
    pub cache: bool,

    /// Free-form bag; the embedded options live under `"ts-jest"`
    #[serde(default)]
    pub globals: Map<String, Value>,

    /// Every other runner key, carried opaquely
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RunnerSettings {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::InvalidSettings {
            message: e.to_string(),
        })
    }

    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| Error::InvalidSettings {
            message: e.to_string(),
        })
    }

    /// The embedded options block, or an empty map when not set.
    pub fn embedded_options(&self) -> Result<Map<String, Value>> {
        match self.globals.get(EMBEDDED_OPTIONS_KEY) {
            None | Some(Value::Null) => Ok(Map::new()),
            Some(Value::Object(map)) => Ok(map.clone()),
            Some(other) => Err(Error::InvalidOptions {
                key: format!("globals.{EMBEDDED_OPTIONS_KEY}"),
                message: format!("expected an object, got {other}"),
            }),
        }
    }

    /// Copy of these settings with the embedded block replaced.
    pub fn with_embedded_options(&self, options: Map<String, Value>) -> Self {
        let mut settings = self.clone();
        settings
            .globals
            .insert(EMBEDDED_OPTIONS_KEY.to_string(), Value::Object(options));
        settings
    }

    /// Settings as they enter the fingerprint.
    ///
    /// `cacheDirectory` is left out: it only decides where outputs are
    /// stored, never what they contain.
    pub fn fingerprint_view(&self) -> Result<Value> {
        let mut view = serde_json::to_value(self).map_err(|e| Error::Serialize {
            view: "runner settings".to_string(),
            message: e.to_string(),
        })?;
        if let Value::Object(map) = &mut view {
            map.remove("cacheDirectory");
        }
        Ok(view)
    }
}
