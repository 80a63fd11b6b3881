//! Embedded options decoding and merge
//!
//! The embedded block is decoded once, at this boundary, into closed sum
//! types. Nothing past [`ResolvedOptions`] sees the free-form bag.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tsj_fs::{NormalizedPath, PathResolver};

use crate::pattern::{PatternInput, normalize_regex};
use crate::{Error, Result};

/// Key of the embedded options block inside the runner's `globals`
pub const EMBEDDED_OPTIONS_KEY: &str = "ts-jest";

/// Compiler module used when the `compiler` option is absent
pub const DEFAULT_COMPILER: &str = "typescript";

/// A regex that matches no path at all
pub const MATCH_NOTHING: &str = "a^";

/// Diagnostic codes that are always ignored
pub const IGNORE_DIAGNOSTIC_CODES: [u32; 3] = [
    6059,  // 'rootDir' is expected to contain all source files.
    18002, // The 'files' list in config file is empty.
    18003, // No inputs were found in config file.
];

/// A reference-typed option (`tsConfig`, `babelConfig`) as written
#[derive(Debug, Clone, Default, PartialEq)]
pub enum OptionReference {
    /// Key missing or `null`
    #[default]
    Absent,
    /// `false`
    Disabled,
    /// `true`: let the consumer find the file itself
    AutoDetect,
    FilePath(String),
    Inline(Map<String, Value>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawReference {
    Flag(bool),
    Path(String),
    Inline(Map<String, Value>),
}

impl<'de> Deserialize<'de> for OptionReference {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = Option::<RawReference>::deserialize(deserializer).map_err(|_| {
            de::Error::custom("expected a boolean, a path string or an inline object")
        })?;
        Ok(match raw {
            None => Self::Absent,
            Some(RawReference::Flag(true)) => Self::AutoDetect,
            Some(RawReference::Flag(false)) => Self::Disabled,
            Some(RawReference::Path(path)) => Self::FilePath(path),
            Some(RawReference::Inline(map)) => Self::Inline(map),
        })
    }
}

/// `ignoreCodes` accepts a list, a comma-separated string or a single number
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum IgnoreCodesInput {
    List(Vec<Value>),
    Text(String),
    Single(serde_json::Number),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiagnosticsInput {
    pub pretty: Option<Value>,
    pub ignore_codes: Option<IgnoreCodesInput>,
    pub path_regex: Option<PatternInput>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DiagnosticsSetting {
    Flag(bool),
    Detailed(DiagnosticsInput),
}

/// Typed view of the embedded options block. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmbeddedOptions {
    pub ts_config: OptionReference,
    pub babel_config: OptionReference,
    pub diagnostics: Option<DiagnosticsSetting>,
    pub type_check: Option<Value>,
    pub compiler: Option<String>,
    pub stringify_content_path_regex: Option<PatternInput>,
}

impl EmbeddedOptions {
    /// Decode key by key so a failure names the offending option.
    pub fn from_map(map: &Map<String, Value>) -> Result<Self> {
        let mut options = Self::default();
        for (key, value) in map {
            let wrong_shape = |e: serde_json::Error| Error::InvalidOptions {
                key: key.clone(),
                message: e.to_string(),
            };
            match key.as_str() {
                "tsConfig" => options.ts_config = decode(value).map_err(wrong_shape)?,
                "babelConfig" => options.babel_config = decode(value).map_err(wrong_shape)?,
                "diagnostics" => options.diagnostics = decode(value).map_err(wrong_shape)?,
                "typeCheck" => options.type_check = Some(value.clone()),
                "compiler" => options.compiler = decode(value).map_err(wrong_shape)?,
                "stringifyContentPathRegex" => {
                    options.stringify_content_path_regex = decode(value).map_err(wrong_shape)?
                }
                other => tracing::trace!(key = other, "Ignoring unrecognized embedded option"),
            }
        }
        Ok(options)
    }
}

fn decode<T: for<'de> Deserialize<'de>>(value: &Value) -> serde_json::Result<T> {
    T::deserialize(value)
}

/// A resolved reference: where the configuration comes from
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ConfigReference {
    /// Read from a file; `None` means the file is located automatically
    File(Option<NormalizedPath>),
    Inline(Map<String, Value>),
}

/// Normalized diagnostics options
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticsOptions {
    pub pretty: bool,
    /// Sorted, deduplicated, always contains [`IGNORE_DIAGNOSTIC_CODES`]
    pub ignore_codes: Vec<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_regex: Option<String>,
}

impl Default for DiagnosticsOptions {
    fn default() -> Self {
        Self {
            pretty: true,
            ignore_codes: union_with_defaults(Vec::new()),
            path_regex: None,
        }
    }
}

/// Output of the options merger
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedOptions {
    /// Library version; part of the fingerprint
    pub version: String,
    pub ts_config: Option<ConfigReference>,
    pub babel_config: Option<ConfigReference>,
    pub diagnostics: DiagnosticsOptions,
    pub type_check: bool,
    pub compiler: String,
    pub stringify_content_path_regex: Option<String>,
}

/// Overlay `overrides` on the embedded block; override wins per top-level key.
pub fn merge_embedded(
    embedded: &Map<String, Value>,
    overrides: Option<&Map<String, Value>>,
) -> Map<String, Value> {
    let mut merged = embedded.clone();
    if let Some(overrides) = overrides {
        for (key, value) in overrides {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}

/// Normalize the merged embedded block.
///
/// Explicit file paths are resolved and must exist, so a missing file fails
/// here rather than during project-description resolution.
pub fn resolve_options(merged: &Map<String, Value>, paths: &PathResolver) -> Result<ResolvedOptions> {
    let options = EmbeddedOptions::from_map(merged)?;

    // tsConfig: absent falls back to locating the default file
    let ts_config = match options.ts_config {
        OptionReference::Absent | OptionReference::AutoDetect => Some(ConfigReference::File(None)),
        OptionReference::FilePath(path) => Some(ConfigReference::File(Some(paths.resolve(&path, false)?))),
        OptionReference::Inline(map) => Some(ConfigReference::Inline(map)),
        OptionReference::Disabled => None,
    };

    let babel_config = match options.babel_config {
        OptionReference::Absent | OptionReference::Disabled => None,
        OptionReference::AutoDetect => Some(ConfigReference::File(None)),
        OptionReference::FilePath(path) => Some(ConfigReference::File(Some(paths.resolve(&path, false)?))),
        OptionReference::Inline(map) => Some(ConfigReference::Inline(map)),
    };

    Ok(ResolvedOptions {
        version: env!("CARGO_PKG_VERSION").to_string(),
        ts_config,
        babel_config,
        diagnostics: resolve_diagnostics(options.diagnostics),
        type_check: options.type_check.as_ref().is_some_and(truthy),
        compiler: options
            .compiler
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_COMPILER.to_string()),
        stringify_content_path_regex: normalize_regex(options.stringify_content_path_regex.as_ref()),
    })
}

fn resolve_diagnostics(setting: Option<DiagnosticsSetting>) -> DiagnosticsOptions {
    match setting {
        None | Some(DiagnosticsSetting::Flag(true)) => DiagnosticsOptions::default(),
        // Still a live policy, it just never reports a file
        Some(DiagnosticsSetting::Flag(false)) => DiagnosticsOptions {
            path_regex: Some(MATCH_NOTHING.to_string()),
            ..DiagnosticsOptions::default()
        },
        Some(DiagnosticsSetting::Detailed(input)) => DiagnosticsOptions {
            pretty: input.pretty.as_ref().is_none_or(|v| v.is_null() || truthy(v)),
            ignore_codes: union_with_defaults(parse_ignore_codes(input.ignore_codes.as_ref())),
            path_regex: normalize_regex(input.path_regex.as_ref()),
        },
    }
}

fn parse_ignore_codes(input: Option<&IgnoreCodesInput>) -> Vec<u32> {
    match input {
        None => Vec::new(),
        Some(IgnoreCodesInput::List(values)) => values.iter().filter_map(parse_code).collect(),
        Some(IgnoreCodesInput::Text(text)) => text
            .split(',')
            .filter_map(|part| part.trim().parse::<u32>().ok())
            .collect(),
        Some(IgnoreCodesInput::Single(number)) => number
            .as_u64()
            .and_then(|code| u32::try_from(code).ok())
            .into_iter()
            .collect(),
    }
}

fn parse_code(value: &Value) -> Option<u32> {
    match value {
        Value::Number(number) => number.as_u64().and_then(|code| u32::try_from(code).ok()),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Add the built-in codes, drop zeros, sort and dedupe.
fn union_with_defaults(codes: Vec<u32>) -> Vec<u32> {
    let mut all: Vec<u32> = IGNORE_DIAGNOSTIC_CODES
        .into_iter()
        .chain(codes)
        .filter(|code| *code != 0)
        .collect();
    all.sort_unstable();
    all.dedup();
    all
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
