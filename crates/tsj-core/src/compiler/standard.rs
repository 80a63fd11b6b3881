//! Built-in compiler module

use colored::Colorize;
use serde_json::{Map, Value};
use tsj_fs::{NormalizedPath, io, parse_jsonc};

use super::directives::{DirectiveKind, directive_kind};
use super::files::{expand_file_names, relative_to};
use super::{Compiler, ParsedDescription, ReadConfigOutcome};
use crate::diagnostics::{Diagnostic, DiagnosticCategory};

const CANNOT_READ_FILE: u32 = 5083;
const PARSE_FAILURE: u32 = 1005;
const ROOT_NOT_OBJECT: u32 = 5092;
const UNKNOWN_OPTION: u32 = 5023;
const WRONG_TYPE: u32 = 5024;
const BAD_ENUM_VALUE: u32 = 6046;
const CIRCULAR_EXTENDS: u32 = 18000;

/// Directive parser and diagnostic formatter shipped with the crate
///
/// It understands `compilerOptions`, `files`, `include`, `exclude` and
/// `extends`. Directive names are checked against a fixed table.
#[derive(Debug, Clone)]
pub struct StandardCompiler {
    version: String,
}

impl StandardCompiler {
    pub fn new() -> Self {
        Self::with_version(env!("CARGO_PKG_VERSION"))
    }

    pub fn with_version(version: impl Into<String>) -> Self {
        Self { version: version.into() }
    }

    /// Fold the `extends` chain of `config` into one description object.
    fn flatten_extends(
        &self,
        config: &Map<String, Value>,
        base_path: &NormalizedPath,
        seen: &mut Vec<NormalizedPath>,
        errors: &mut Vec<Diagnostic>,
    ) -> Map<String, Value> {
        let Some(extends) = config.get("extends") else {
            return config.clone();
        };
        let Some(spec) = extends.as_str() else {
            errors.push(Diagnostic::error(
                WRONG_TYPE,
                "Compiler option 'extends' requires a value of type string.",
            ));
            return config.clone();
        };

        let mut parent_path = base_path.resolve(spec);
        if parent_path.extension().is_none() && !parent_path.is_file() {
            parent_path = NormalizedPath::new(format!("{parent_path}.json"));
        }
        if seen.contains(&parent_path) {
            errors.push(Diagnostic::error(
                CIRCULAR_EXTENDS,
                format!("Circularity detected while resolving configuration: {parent_path}"),
            ));
            return config.clone();
        }
        seen.push(parent_path.clone());

        let outcome = self.read_config_file(&parent_path);
        if let Some(error) = outcome.error {
            errors.push(error);
        }
        let Some(Value::Object(parent)) = outcome.config else {
            return config.clone();
        };

        let parent_base = parent_path.parent().unwrap_or_else(|| base_path.clone());
        let mut parent = self.flatten_extends(&parent, &parent_base, seen, errors);
        rebase_parent(&mut parent, &parent_base);

        let mut merged = config.clone();
        merged.remove("extends");
        let mut options = parent
            .get("compilerOptions")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        if let Some(own) = config.get("compilerOptions").and_then(Value::as_object) {
            options.extend(own.clone());
        }
        merged.insert("compilerOptions".to_string(), Value::Object(options));
        for key in ["files", "include", "exclude"] {
            if !merged.contains_key(key)
                && let Some(value) = parent.get(key)
            {
                merged.insert(key.to_string(), value.clone());
            }
        }
        merged
    }
}

impl Default for StandardCompiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler for StandardCompiler {
    fn version(&self) -> &str {
        &self.version
    }

    fn read_config_file(&self, path: &NormalizedPath) -> ReadConfigOutcome {
        let text = match io::read_text(path) {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!(path = %path, error = %e, "Unable to read description file");
                return ReadConfigOutcome {
                    config: None,
                    error: Some(Diagnostic::error(CANNOT_READ_FILE, format!("Cannot read file '{path}'."))),
                };
            }
        };

        match parse_jsonc::<Value>(&text) {
            Ok(config @ Value::Object(_)) => ReadConfigOutcome { config: Some(config), error: None },
            Ok(_) => ReadConfigOutcome {
                config: None,
                error: Some(
                    Diagnostic::error(
                        ROOT_NOT_OBJECT,
                        format!(
                            "The root value of a '{}' file must be an object.",
                            path.file_name().unwrap_or("tsconfig.json")
                        ),
                    )
                    .with_file(path.as_str()),
                ),
            },
            Err(e) => ReadConfigOutcome {
                config: None,
                error: Some(
                    Diagnostic::error(PARSE_FAILURE, format!("Failed to parse file '{path}': {e}."))
                        .with_file(path.as_str()),
                ),
            },
        }
    }

    fn parse_directives(
        &self,
        config: &Value,
        base_path: &NormalizedPath,
        config_file: Option<&NormalizedPath>,
    ) -> ParsedDescription {
        let mut errors = Vec::new();
        let empty = Map::new();
        let config = config.as_object().unwrap_or(&empty);

        let mut seen: Vec<NormalizedPath> = config_file.into_iter().cloned().collect();
        let config = self.flatten_extends(config, base_path, &mut seen, &mut errors);

        let mut options = Map::new();
        match config.get("compilerOptions") {
            None | Some(Value::Null) => {}
            Some(Value::Object(raw)) => {
                for (name, value) in raw {
                    if value.is_null() {
                        continue;
                    }
                    let checked = match directive_kind(name) {
                        None => Err(Diagnostic::error(
                            UNKNOWN_OPTION,
                            format!("Unknown compiler option '{name}'."),
                        )),
                        Some(kind) => check_directive(name, kind, value, base_path),
                    };
                    match checked {
                        Ok(value) => {
                            options.insert(name.clone(), value);
                        }
                        Err(diagnostic) => errors.push(match config_file {
                            Some(file) => diagnostic.with_file(file.as_str()),
                            None => diagnostic,
                        }),
                    }
                }
            }
            Some(_) => errors.push(Diagnostic::error(
                WRONG_TYPE,
                "Compiler option 'compilerOptions' requires a value of type object.",
            )),
        }

        let label = config_file
            .cloned()
            .unwrap_or_else(|| base_path.join(crate::project::DEFAULT_CONFIG_FILE_NAME));
        let file_names = expand_file_names(&config, &options, base_path, label.as_str(), &mut errors);

        ParsedDescription { options, file_names, errors }
    }

    fn format_diagnostics(&self, diagnostics: &[Diagnostic], pretty: bool, cwd: &NormalizedPath) -> String {
        let mut out = String::new();
        for diagnostic in diagnostics {
            let location = diagnostic.file.as_deref().map(|file| {
                relative_to(cwd, &NormalizedPath::new(file)).unwrap_or_else(|| file.to_string())
            });
            let code = format!("TS{}", diagnostic.code);

            if pretty {
                let category = match diagnostic.category {
                    DiagnosticCategory::Error => diagnostic.category.to_string().red(),
                    DiagnosticCategory::Warning => diagnostic.category.to_string().yellow(),
                    DiagnosticCategory::Message => diagnostic.category.to_string().blue(),
                };
                if let Some(location) = location {
                    out.push_str(&format!("{} - ", location.cyan()));
                }
                out.push_str(&format!("{category} {}: {}\n\n", code.bright_black(), diagnostic.message));
            } else {
                if let Some(location) = location {
                    out.push_str(&format!("{location}: "));
                }
                out.push_str(&format!("{} {code}: {}\n", diagnostic.category, diagnostic.message));
            }
        }
        out
    }
}

fn check_directive(
    name: &str,
    kind: DirectiveKind,
    value: &Value,
    base_path: &NormalizedPath,
) -> Result<Value, Diagnostic> {
    let wrong_type = || {
        Diagnostic::error(
            WRONG_TYPE,
            format!("Compiler option '{name}' requires a value of type {}.", kind.type_name()),
        )
    };

    match kind {
        DirectiveKind::Bool if value.is_boolean() => Ok(value.clone()),
        DirectiveKind::Number if value.is_number() => Ok(value.clone()),
        DirectiveKind::Str if value.is_string() => Ok(value.clone()),
        DirectiveKind::Object if value.is_object() => Ok(value.clone()),
        DirectiveKind::Path => value
            .as_str()
            .map(|path| Value::String(base_path.resolve(path).to_string()))
            .ok_or_else(wrong_type),
        DirectiveKind::Enum(allowed) => {
            let text = value.as_str().ok_or_else(wrong_type)?.to_lowercase();
            if allowed.contains(&text.as_str()) {
                Ok(Value::String(text))
            } else {
                let choices: Vec<String> = allowed.iter().map(|choice| format!("'{choice}'")).collect();
                Err(Diagnostic::error(
                    BAD_ENUM_VALUE,
                    format!("Argument for '--{name}' option must be: {}.", choices.join(", ")),
                ))
            }
        }
        DirectiveKind::List | DirectiveKind::PathList => {
            let items = value.as_array().ok_or_else(wrong_type)?;
            let mut checked = Vec::with_capacity(items.len());
            for item in items {
                let text = item.as_str().ok_or_else(wrong_type)?;
                checked.push(match kind {
                    DirectiveKind::PathList => Value::String(base_path.resolve(text).to_string()),
                    _ => Value::String(text.to_string()),
                });
            }
            Ok(Value::Array(checked))
        }
        _ => Err(wrong_type()),
    }
}

/// Anchor an inherited description's path values to its own directory.
fn rebase_parent(parent: &mut Map<String, Value>, parent_base: &NormalizedPath) {
    if let Some(Value::Object(options)) = parent.get_mut("compilerOptions") {
        for (name, value) in options.iter_mut() {
            match (directive_kind(name), &*value) {
                (Some(DirectiveKind::Path), Value::String(path)) => {
                    *value = Value::String(parent_base.resolve(path).to_string());
                }
                (Some(DirectiveKind::PathList), Value::Array(items)) => {
                    *value = Value::Array(
                        items
                            .iter()
                            .map(|item| match item {
                                Value::String(path) => Value::String(parent_base.resolve(path).to_string()),
                                other => other.clone(),
                            })
                            .collect(),
                    );
                }
                _ => {}
            }
        }
    }
    if let Some(Value::Array(files)) = parent.get_mut("files") {
        for file in files.iter_mut() {
            if let Value::String(path) = file {
                *file = Value::String(parent_base.resolve(path).to_string());
            }
        }
    }
}
