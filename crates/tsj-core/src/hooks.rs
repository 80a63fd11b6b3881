//! Lifecycle hooks around file processing
//!
//! A hook file lists `[[hooks]]` entries, each a command bound to a point
//! before or after a file is processed. Where the file comes from is decided
//! by a [`HookProvider`] handed to the [`ConfigSet`](crate::ConfigSet); the
//! environment-variable lookup is just one provider.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tsj_fs::{ConfigStore, NormalizedPath};

use crate::Result;

/// Environment variable naming the hook file
pub const HOOKS_ENV_VAR: &str = "TSJ_HOOKS";

/// Events that can trigger hooks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HookEvent {
    /// Before a source file is transformed
    BeforeProcess,
    /// After a source file is transformed
    AfterProcess,
}

impl fmt::Display for HookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BeforeProcess => write!(f, "before-process"),
            Self::AfterProcess => write!(f, "after-process"),
        }
    }
}

impl HookEvent {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "before-process" => Some(Self::BeforeProcess),
            "after-process" => Some(Self::AfterProcess),
            _ => None,
        }
    }

    pub fn all_names() -> &'static [&'static str] {
        &["before-process", "after-process"]
    }
}

/// Configuration for a single hook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HookConfig {
    pub event: HookEvent,
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    /// Working directory override (defaults to the project cwd)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,
}

/// All hooks known for a project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HookMap {
    #[serde(default)]
    pub hooks: Vec<HookConfig>,
}

impl HookMap {
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    pub fn for_event(&self, event: HookEvent) -> impl Iterator<Item = &HookConfig> {
        self.hooks.iter().filter(move |hook| hook.event == event)
    }
}

/// Source of the hook map for a project
pub trait HookProvider: Send + Sync {
    fn load(&self, cwd: &NormalizedPath) -> Result<HookMap>;
}

/// Provider with no hooks at all
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl HookProvider for NoHooks {
    fn load(&self, _cwd: &NormalizedPath) -> Result<HookMap> {
        Ok(HookMap::default())
    }
}

/// Reads hooks from a TOML, JSON or YAML file
///
/// A relative path is resolved against the project cwd. A file that cannot
/// be loaded yields an empty map and a warning.
#[derive(Debug, Clone)]
pub struct HookFileProvider {
    path: String,
}

impl HookFileProvider {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl HookProvider for HookFileProvider {
    fn load(&self, cwd: &NormalizedPath) -> Result<HookMap> {
        let path = cwd.resolve(&self.path);
        match ConfigStore::new().load::<HookMap>(&path) {
            Ok(hooks) => {
                tracing::debug!(path = %path, count = hooks.hooks.len(), "Loaded hook file");
                Ok(hooks)
            }
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "Ignoring unusable hook file");
                Ok(HookMap::default())
            }
        }
    }
}

/// Looks up the hook file in an environment variable
#[derive(Debug, Clone)]
pub struct EnvHookProvider {
    var: String,
}

impl EnvHookProvider {
    pub fn new() -> Self {
        Self::from_var(HOOKS_ENV_VAR)
    }

    pub fn from_var(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvHookProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl HookProvider for EnvHookProvider {
    fn load(&self, cwd: &NormalizedPath) -> Result<HookMap> {
        match std::env::var(&self.var) {
            Ok(path) if !path.is_empty() => HookFileProvider::new(path).load(cwd),
            _ => Ok(HookMap::default()),
        }
    }
}
