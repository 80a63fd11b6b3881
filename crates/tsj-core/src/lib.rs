//! Configuration resolution for the tsj transformer
//!
//! Turns the host runner's settings, the embedded `ts-jest` options block, an
//! optional project-description file (`tsconfig.json`) and an optional
//! secondary-transform configuration into one immutable [`ConfigSet`], and
//! derives from it a fingerprint used as the transform cache key.
//!
//! # Architecture
//!
//! ```text
//!  RunnerSettings ──► options ──► project ──┐
//!                        │                   ├──► fingerprint ──► cache key
//!                        └──────► secondary ─┘
//!                        └──────► diagnostics (consumed by the transform step)
//! ```
//!
//! Every view is computed on first access and memoized for the lifetime of
//! the [`ConfigSet`]. Only [`ConfigSet::project_description`] (and the views
//! derived from it) can fail with [`Error::Diagnostics`].
//!
//! # Example
//!
//! ```ignore
//! use tsj_core::{ConfigSet, RunnerSettings};
//!
//! let settings = RunnerSettings::from_json_str(r#"{"rootDir": "/repo", "cache": true}"#)?;
//! let config = ConfigSet::new(settings);
//! let key = config.cache_key()?;
//! ```

pub mod compiler;
pub mod config_set;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod hooks;
pub mod logging;
pub mod options;
pub mod pattern;
pub mod project;
pub mod secondary;
pub mod settings;

pub use compiler::{Compiler, CompilerRegistry, ParsedDescription, ReadConfigOutcome, StandardCompiler};
pub use config_set::{ConfigSet, FileKeyOptions};
pub use diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticsError, DiagnosticsPolicy};
pub use engine::{EngineAdapter, StandardEngine, TransformEngine};
pub use error::{Error, Result};
pub use fingerprint::{cache_directory_name, canonical_json};
pub use hooks::{EnvHookProvider, HookConfig, HookEvent, HookFileProvider, HookMap, HookProvider, NoHooks};
pub use options::{ConfigReference, DiagnosticsOptions, EmbeddedOptions, OptionReference, ResolvedOptions};
pub use pattern::{PatternInput, normalize_regex};
pub use project::{DescriptionSource, ProjectDescription, ProjectDescriptionResolver, ResolvedDescription};
pub use settings::RunnerSettings;
