//! Canonical serialization and cache keys

use serde_json::{Map, Value, json};
use tsj_fs::digest;

use crate::options::ResolvedOptions;
use crate::project::ProjectDescription;
use crate::{Error, Result};

/// Prefix of every cache directory name
pub const CACHE_DIR_PREFIX: &str = "tsj-";

/// Serialize `value` with object keys in sorted order at every depth.
pub fn canonical_json(value: &Value) -> String {
    sort_value(value).to_string()
}

fn sort_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<_> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::new();
            for key in keys {
                if let Some(v) = map.get(key) {
                    sorted.insert(key.clone(), sort_value(v));
                }
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_value).collect()),
        other => other.clone(),
    }
}

/// Cache key over every behavior-affecting view.
///
/// The project part carries both the raw input and the resolved directives,
/// so edits to a file reached through `extends` change the key too.
pub fn fingerprint(
    runner_view: &Value,
    options: &ResolvedOptions,
    secondary: Option<&Value>,
    project: &ProjectDescription,
) -> Result<String> {
    let options = serde_json::to_value(options).map_err(|e| Error::Serialize {
        view: "resolved options".to_string(),
        message: e.to_string(),
    })?;
    let snapshot = json!({
        "jest": runner_view,
        "tsJest": options,
        "babel": secondary,
        "tsconfig": project.input,
        "compilerOptions": project.resolved.options,
    });
    Ok(digest(&canonical_json(&snapshot)))
}

/// Name of the output cache directory.
///
/// Only inputs that change emitted bytes take part, so unrelated option
/// edits keep the on-disk cache valid.
pub fn cache_directory_name(
    compiler_version: &str,
    compiler: &str,
    directives: &Map<String, Value>,
    type_check: bool,
    ignore_codes: &[u32],
) -> String {
    let subset = json!({
        "version": compiler_version,
        "compiler": compiler,
        "compilerOptions": directives,
        "typeCheck": type_check,
        "ignoreDiagnostics": ignore_codes,
    });
    format!("{CACHE_DIR_PREFIX}{}", digest(&canonical_json(&subset)))
}
