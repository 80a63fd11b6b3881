//! Project-description (tsconfig) resolution
//!
//! Three modes, picked from the resolved `tsConfig` reference:
//!
//! - **none**: only the caller's override directives are used.
//! - **file**: an explicit file, or the nearest `tsconfig.json` above `cwd`.
//! - **inline**: directives given directly in the options block, layered
//!   over the nearest `tsconfig.json` when there is one.
//!
//! The merged directives are layered as
//! `defaults < description < overrides < forced`, handed to the compiler's
//! directive parser, and post-processed (default target, cleared keys).
//! Problems are returned as data in [`ResolvedDescription::errors`].

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;
use tsj_fs::NormalizedPath;

use crate::compiler::{Compiler, DirectiveKind, directive_kind};
use crate::diagnostics::Diagnostic;

/// File name searched for when no explicit description file is given
pub const DEFAULT_CONFIG_FILE_NAME: &str = "tsconfig.json";

/// Injected when no `target` directive resolves
pub const DEFAULT_TARGET: &str = "es5";

/// Directives deleted from every resolved set
pub const CLEARED_DIRECTIVES: &[&str] = &[
    "out",
    "outFile",
    "composite",
    "declarationDir",
    "declarationMap",
    "emitDeclarationOnly",
    "sourceRoot",
];

fn default_directives() -> Map<String, Value> {
    [("inlineSourceMap", Value::Bool(true)), ("inlineSources", Value::Bool(true))]
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

/// Directives pinned regardless of user input (cleared ones excluded)
pub fn forced_directives() -> Map<String, Value> {
    [
        ("sourceMap", Value::Bool(true)),
        ("inlineSourceMap", Value::Bool(false)),
        ("inlineSources", Value::Bool(true)),
        ("declaration", Value::Bool(false)),
        ("noEmit", Value::Bool(false)),
        ("outDir", Value::from("$$ts-jest$$")),
        ("module", Value::from("commonjs")),
        ("esModuleInterop", Value::Bool(true)),
        ("removeComments", Value::Bool(false)),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_string(), value))
    .collect()
}

/// Where the description comes from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DescriptionSource<'a> {
    /// No description at all
    None,
    /// A file; `None` searches upward from `cwd`
    File(Option<&'a NormalizedPath>),
    /// Inline compiler directives
    Inline(&'a Map<String, Value>),
}

/// Output of the directive parser after post-processing
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedDescription {
    pub options: Map<String, Value>,
    pub file_names: Vec<NormalizedPath>,
    pub errors: Vec<Diagnostic>,
    /// User directives replaced or removed by the forced set (sorted)
    pub forced_overrides: Vec<String>,
}

/// Raw merged input plus its resolution
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectDescription {
    /// `None` when no description file was found or it could not be read
    pub input: Option<Value>,
    pub resolved: ResolvedDescription,
}

pub struct ProjectDescriptionResolver<'a> {
    compiler: &'a dyn Compiler,
    cwd: &'a NormalizedPath,
}

impl<'a> ProjectDescriptionResolver<'a> {
    pub fn new(compiler: &'a dyn Compiler, cwd: &'a NormalizedPath) -> Self {
        Self { compiler, cwd }
    }

    pub fn resolve(&self, source: DescriptionSource<'_>, overrides: Option<&Map<String, Value>>) -> ProjectDescription {
        let mut overrides = overrides.cloned().unwrap_or_default();
        let mut description = Map::new();
        let mut base_path = self.cwd.clone();
        let mut config_file = None;

        let lookup = match source {
            DescriptionSource::None => None,
            DescriptionSource::File(explicit) => Some(explicit.cloned()),
            DescriptionSource::Inline(inline) => {
                debug!(directives = inline.len(), "Layering inline directives over the project description");
                let mut directives = inline.clone();
                directives.extend(overrides);
                overrides = directives;
                Some(None)
            }
        };
        let inline = matches!(source, DescriptionSource::Inline(_));

        let (input, user_directives) = match lookup {
            None => {
                debug!("Resolving project description without a file");
                let input = wrap_directives(overrides.clone());
                (Some(input), overrides)
            }
            Some(explicit) => {
                let found = explicit.or_else(|| self.compiler.find_config_file(self.cwd, DEFAULT_CONFIG_FILE_NAME));
                match found {
                    None => {
                        debug!(cwd = %self.cwd, "No project description file found");
                        let input = inline.then(|| wrap_directives(overrides.clone()));
                        (input, overrides)
                    }
                    Some(path) => {
                        debug!(path = %path, "Reading project description file");
                        let outcome = self.compiler.read_config_file(&path);
                        if let Some(error) = outcome.error {
                            return ProjectDescription {
                                input: None,
                                resolved: ResolvedDescription {
                                    errors: vec![error],
                                    ..ResolvedDescription::default()
                                },
                            };
                        }
                        description = match outcome.config {
                            Some(Value::Object(map)) => map,
                            _ => Map::new(),
                        };

                        let mut directives = description
                            .get("compilerOptions")
                            .and_then(Value::as_object)
                            .cloned()
                            .unwrap_or_default();
                        directives.extend(overrides);
                        let mut input = description.clone();
                        input.insert("compilerOptions".to_string(), Value::Object(directives.clone()));

                        base_path = path.parent().unwrap_or_else(|| self.cwd.clone());
                        config_file = Some(path);
                        (Some(Value::Object(input)), directives)
                    }
                }
            }
        };

        let forced = forced_directives();
        let forced_overrides = forced_overrides(&user_directives, &forced);

        let mut directives = default_directives();
        directives.extend(user_directives);
        directives.extend(forced);
        for name in CLEARED_DIRECTIVES {
            directives.remove(*name);
        }
        description.insert("compilerOptions".to_string(), Value::Object(directives));

        let parsed = self
            .compiler
            .parse_directives(&Value::Object(description), &base_path, config_file.as_ref());

        let mut options = parsed.options;
        options
            .entry("target")
            .or_insert_with(|| Value::from(DEFAULT_TARGET));
        for name in CLEARED_DIRECTIVES {
            options.remove(*name);
        }
        debug!(
            files = parsed.file_names.len(),
            errors = parsed.errors.len(),
            "Resolved project description"
        );

        ProjectDescription {
            input,
            resolved: ResolvedDescription {
                options,
                file_names: parsed.file_names,
                errors: parsed.errors,
                forced_overrides,
            },
        }
    }
}

fn wrap_directives(directives: Map<String, Value>) -> Value {
    let mut input = Map::new();
    input.insert("compilerOptions".to_string(), Value::Object(directives));
    Value::Object(input)
}

fn forced_overrides(user: &Map<String, Value>, forced: &Map<String, Value>) -> Vec<String> {
    let mut names: Vec<String> = user
        .iter()
        .filter(|(name, value)| match forced.get(*name) {
            Some(pinned) => !same_directive_value(name, value, pinned),
            None => CLEARED_DIRECTIVES.contains(&name.as_str()) && !value.is_null(),
        })
        .map(|(name, _)| name.clone())
        .collect();
    names.sort();
    names
}

/// Enum directives compare case-insensitively, as the parser lower-cases them.
fn same_directive_value(name: &str, user: &Value, pinned: &Value) -> bool {
    match (directive_kind(name), user.as_str(), pinned.as_str()) {
        (Some(DirectiveKind::Enum(_)), Some(user), Some(pinned)) => user.eq_ignore_ascii_case(pinned),
        _ => user == pinned,
    }
}
