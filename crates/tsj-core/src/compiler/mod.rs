//! The embedded compiler module
//!
//! Configuration resolution needs four things from the compiler: a config
//! file finder, a config file reader, the directive-parsing routine and a
//! diagnostic formatter. They sit behind [`Compiler`] so hosts can plug in
//! their own module; [`StandardCompiler`] is the built-in one.

mod directives;
mod files;
mod standard;

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tsj_fs::NormalizedPath;

use crate::diagnostics::Diagnostic;

pub use directives::{DirectiveKind, directive_kind};
pub use standard::StandardCompiler;

/// Result of reading a project-description file
///
/// A structural problem with the file is reported as data in `error`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadConfigOutcome {
    pub config: Option<Value>,
    pub error: Option<Diagnostic>,
}

/// Output of the directive-parsing routine
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedDescription {
    pub options: Map<String, Value>,
    pub file_names: Vec<NormalizedPath>,
    pub errors: Vec<Diagnostic>,
}

/// Capabilities consumed from an embedded compiler module
pub trait Compiler: Send + Sync {
    /// Semantic version of the compiler; part of the cache directory name.
    fn version(&self) -> &str;

    /// Search `from` and its ancestors for `file_name`.
    fn find_config_file(&self, from: &NormalizedPath, file_name: &str) -> Option<NormalizedPath> {
        let mut dir = Some(from.clean());
        while let Some(current) = dir {
            let candidate = current.join(file_name);
            if candidate.is_file() {
                return Some(candidate);
            }
            dir = current.parent();
        }
        None
    }

    fn read_config_file(&self, path: &NormalizedPath) -> ReadConfigOutcome;

    /// Validate and expand a merged description object.
    ///
    /// `base_path` anchors relative paths; `config_file` is only used in
    /// messages.
    fn parse_directives(
        &self,
        config: &Value,
        base_path: &NormalizedPath,
        config_file: Option<&NormalizedPath>,
    ) -> ParsedDescription;

    /// Render diagnostics as human text, colorized when `pretty`.
    fn format_diagnostics(&self, diagnostics: &[Diagnostic], pretty: bool, cwd: &NormalizedPath) -> String;
}

/// Compiler modules addressable by the `compiler` option.
#[derive(Clone, Default)]
pub struct CompilerRegistry {
    modules: HashMap<String, Arc<dyn Compiler>>,
}

impl CompilerRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in `typescript` module.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(crate::options::DEFAULT_COMPILER, Arc::new(StandardCompiler::new()));
        registry
    }

    pub fn register(&mut self, name: impl Into<String>, module: Arc<dyn Compiler>) {
        self.modules.insert(name.into(), module);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Compiler>> {
        self.modules.get(name).cloned()
    }

    /// List all registered names (sorted).
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.modules.keys().map(String::as_str).collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for CompilerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompilerRegistry")
            .field("modules", &self.list())
            .finish()
    }
}
