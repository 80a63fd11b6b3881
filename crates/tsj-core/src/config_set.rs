//! The configuration snapshot
//!
//! [`ConfigSet`] owns the runner settings and every collaborator, and exposes
//! each derived view through an accessor that computes it on first use.
//! Results (including failures) are memoized in `OnceLock`s, so the
//! evaluation order is fixed by data dependencies alone:
//!
//! ```text
//! runner ─► options ─┬─► compiler ─► project_description ─► directives ─┐
//!                    ├─► diagnostics_policy ─┘                          ├─► cache_directory_name
//!                    └─► secondary_config ──────────────────────────────┴─► cache_key
//! ```
//!
//! A snapshot is never updated. Builders reset every memoized view.

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;
use tsj_fs::{ConfigStore, NormalizedPath, PathResolver, digest_parts};

use crate::compiler::{Compiler, CompilerRegistry};
use crate::diagnostics::{Diagnostic, DiagnosticsError, DiagnosticsPolicy};
use crate::engine::{EngineAdapter, StandardEngine, TransformEngine};
use crate::fingerprint;
use crate::hooks::{EnvHookProvider, HookMap, HookProvider};
use crate::options::{self, ConfigReference, ResolvedOptions};
use crate::pattern;
use crate::project::{DescriptionSource, ProjectDescription, ProjectDescriptionResolver};
use crate::secondary::load_secondary_config;
use crate::settings::RunnerSettings;
use crate::{Error, Result};

/// Per-file inputs of [`ConfigSet::file_cache_key`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileKeyOptions {
    /// Whether coverage instrumentation is requested
    pub instrument: bool,
    /// Root directory reported by the runner; defaults to the snapshot's
    pub root_dir: Option<String>,
}

#[derive(Default)]
struct Views {
    runner: OnceLock<Result<RunnerSettings>>,
    options: OnceLock<Result<ResolvedOptions>>,
    compiler: OnceLock<Result<Arc<dyn Compiler>>>,
    project: OnceLock<Result<ProjectDescription>>,
    engine_adapter: OnceLock<EngineAdapter>,
    secondary: OnceLock<Result<Option<Value>>>,
    policy: OnceLock<Result<DiagnosticsPolicy>>,
    stringify: OnceLock<Result<Option<Regex>>>,
    hooks: OnceLock<Result<HookMap>>,
    cache_directory_name: OnceLock<Result<Option<String>>>,
    cache_key: OnceLock<Result<String>>,
}

/// Immutable, lazily evaluated configuration for one runner project
pub struct ConfigSet {
    settings: RunnerSettings,
    parent_options: Option<Map<String, Value>>,
    compilers: CompilerRegistry,
    engine: Arc<dyn TransformEngine>,
    hook_provider: Arc<dyn HookProvider>,
    store: ConfigStore,
    paths: PathResolver,
    views: Views,
}

impl ConfigSet {
    /// Snapshot with the built-in compiler and engine and hooks taken from
    /// the `TSJ_HOOKS` environment variable.
    pub fn new(settings: RunnerSettings) -> Self {
        let paths = resolver_for(&settings);
        Self {
            settings,
            parent_options: None,
            compilers: CompilerRegistry::with_builtins(),
            engine: Arc::new(StandardEngine::new()),
            hook_provider: Arc::new(EnvHookProvider::new()),
            store: ConfigStore::new(),
            paths,
            views: Views::default(),
        }
    }

    /// Snapshot from the stringified settings record hosts pass around.
    pub fn from_json_str(json: &str) -> Result<Self> {
        RunnerSettings::from_json_str(json).map(Self::new)
    }

    /// Caller-supplied options; they win over the embedded block per key.
    pub fn with_parent_options(mut self, options: Map<String, Value>) -> Self {
        self.parent_options = Some(options);
        self.views = Views::default();
        self
    }

    pub fn with_compilers(mut self, compilers: CompilerRegistry) -> Self {
        self.compilers = compilers;
        self.views = Views::default();
        self
    }

    pub fn with_engine(mut self, engine: Arc<dyn TransformEngine>) -> Self {
        self.engine = engine;
        self.views = Views::default();
        self
    }

    pub fn with_hook_provider(mut self, provider: Arc<dyn HookProvider>) -> Self {
        self.hook_provider = provider;
        self.views = Views::default();
        self
    }

    pub fn root_dir(&self) -> &NormalizedPath {
        self.paths.root_dir()
    }

    pub fn cwd(&self) -> &NormalizedPath {
        self.paths.cwd()
    }

    /// Resolve a user path (`<rootDir>/…`, absolute, or cwd-relative).
    pub fn resolve_path(&self, input: &str, allow_missing: bool) -> Result<NormalizedPath> {
        Ok(self.paths.resolve(input, allow_missing)?)
    }

    /// Runner settings with the caller's options merged into the embedded
    /// block.
    pub fn runner(&self) -> Result<&RunnerSettings> {
        self.views
            .runner
            .get_or_init(|| self.compute_runner())
            .as_ref()
            .map_err(Clone::clone)
    }

    fn compute_runner(&self) -> Result<RunnerSettings> {
        let Some(parent) = &self.parent_options else {
            return Ok(self.settings.clone());
        };
        let embedded = self.settings.embedded_options()?;
        let merged = options::merge_embedded(&embedded, Some(parent));
        debug!(keys = merged.len(), "Merged caller options into embedded block");
        Ok(self.settings.with_embedded_options(merged))
    }

    pub fn options(&self) -> Result<&ResolvedOptions> {
        self.views
            .options
            .get_or_init(|| {
                let embedded = self.runner()?.embedded_options()?;
                let resolved = options::resolve_options(&embedded, &self.paths)?;
                debug!(
                    ts_config = ?resolved.ts_config,
                    babel_config = resolved.babel_config.is_some(),
                    compiler = %resolved.compiler,
                    "Resolved options"
                );
                Ok(resolved)
            })
            .as_ref()
            .map_err(Clone::clone)
    }

    /// The compiler module named by the `compiler` option.
    pub fn compiler(&self) -> Result<&dyn Compiler> {
        self.views
            .compiler
            .get_or_init(|| {
                let name = &self.options()?.compiler;
                self.compilers.get(name).ok_or_else(|| Error::UnknownCompiler {
                    name: name.clone(),
                    registered: self.compilers.list().join(", "),
                })
            })
            .as_ref()
            .map(|compiler| &**compiler)
            .map_err(Clone::clone)
    }

    /// Resolved project description.
    ///
    /// Fails with [`Error::Diagnostics`] when any resolution error survives
    /// the diagnostics filter.
    pub fn project_description(&self) -> Result<&ProjectDescription> {
        self.views
            .project
            .get_or_init(|| self.compute_project_description())
            .as_ref()
            .map_err(Clone::clone)
    }

    fn compute_project_description(&self) -> Result<ProjectDescription> {
        let description = self.read_project_description(None)?;
        let policy = self.diagnostics_policy()?;
        let reported = policy.filter(&description.resolved.errors, None);
        if !reported.is_empty() {
            debug!(count = reported.len(), "Project description has reportable diagnostics");
            return Err(policy.create_error(&reported, self.compiler()?, self.cwd()).into());
        }
        Ok(description)
    }

    /// Resolve the project description with extra directive overrides.
    ///
    /// Not memoized and not filtered: errors are left in the result.
    pub fn read_project_description(&self, overrides: Option<&Map<String, Value>>) -> Result<ProjectDescription> {
        let options = self.options()?;
        let compiler = self.compiler()?;
        let source = match &options.ts_config {
            None => DescriptionSource::None,
            Some(ConfigReference::File(path)) => DescriptionSource::File(path.as_ref()),
            Some(ConfigReference::Inline(map)) => DescriptionSource::Inline(map),
        };
        Ok(ProjectDescriptionResolver::new(compiler, self.cwd()).resolve(source, overrides))
    }

    /// Final compiler directives.
    pub fn directives(&self) -> Result<&Map<String, Value>> {
        Ok(&self.project_description()?.resolved.options)
    }

    /// Raw merged description input, as it enters the cache key.
    pub fn tsconfig(&self) -> Result<Option<&Value>> {
        Ok(self.project_description()?.input.as_ref())
    }

    pub fn engine_adapter(&self) -> EngineAdapter {
        *self
            .views
            .engine_adapter
            .get_or_init(|| EngineAdapter::detect(self.engine.as_ref()))
    }

    /// Resolved secondary transform configuration, if one is configured.
    pub fn secondary_config(&self) -> Result<Option<&Value>> {
        self.views
            .secondary
            .get_or_init(|| {
                load_secondary_config(
                    self.options()?.babel_config.as_ref(),
                    self.cwd(),
                    &self.store,
                    self.engine_adapter(),
                    self.engine.as_ref(),
                )
            })
            .as_ref()
            .map(Option::as_ref)
            .map_err(Clone::clone)
    }

    pub fn diagnostics_policy(&self) -> Result<&DiagnosticsPolicy> {
        self.views
            .policy
            .get_or_init(|| DiagnosticsPolicy::new(&self.options()?.diagnostics))
            .as_ref()
            .map_err(Clone::clone)
    }

    pub fn should_report_diagnostic(&self, file_path: &str) -> Result<bool> {
        Ok(self.diagnostics_policy()?.should_report(file_path))
    }

    pub fn filter_diagnostics(&self, diagnostics: &[Diagnostic], file_path: Option<&str>) -> Result<Vec<Diagnostic>> {
        Ok(self.diagnostics_policy()?.filter(diagnostics, file_path))
    }

    pub fn create_diagnostics_error(&self, diagnostics: &[Diagnostic]) -> Result<DiagnosticsError> {
        Ok(self
            .diagnostics_policy()?
            .create_error(diagnostics, self.compiler()?, self.cwd()))
    }

    /// True when `stringifyContentPathRegex` is set and matches `file_path`.
    pub fn should_stringify_content(&self, file_path: &str) -> Result<bool> {
        let regex = self
            .views
            .stringify
            .get_or_init(|| {
                self.options()?
                    .stringify_content_path_regex
                    .as_deref()
                    .map(pattern::compile)
                    .transpose()
            })
            .as_ref()
            .map_err(Clone::clone)?;
        Ok(regex.as_ref().is_some_and(|regex| regex.is_match(file_path)))
    }

    pub fn hooks(&self) -> Result<&HookMap> {
        self.views
            .hooks
            .get_or_init(|| self.hook_provider.load(self.cwd()))
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Name of the output cache directory; `None` when caching is off.
    pub fn cache_directory_name(&self) -> Result<Option<&str>> {
        self.views
            .cache_directory_name
            .get_or_init(|| {
                if !self.runner()?.cache {
                    return Ok(None);
                }
                let options = self.options()?;
                Ok(Some(fingerprint::cache_directory_name(
                    self.compiler()?.version(),
                    &options.compiler,
                    self.directives()?,
                    options.type_check,
                    &options.diagnostics.ignore_codes,
                )))
            })
            .as_ref()
            .map(Option::as_deref)
            .map_err(Clone::clone)
    }

    /// `cacheDirectory` joined with [`Self::cache_directory_name`].
    pub fn cache_dir(&self) -> Result<Option<PathBuf>> {
        let Some(name) = self.cache_directory_name()? else {
            return Ok(None);
        };
        let Some(base) = &self.runner()?.cache_directory else {
            debug!("Caching enabled without a cacheDirectory");
            return Ok(None);
        };
        Ok(Some(base.join(name)))
    }

    /// Fingerprint of every behavior-affecting resolved view.
    pub fn cache_key(&self) -> Result<&str> {
        self.views
            .cache_key
            .get_or_init(|| {
                let key = fingerprint::fingerprint(
                    &self.runner()?.fingerprint_view()?,
                    self.options()?,
                    self.secondary_config()?,
                    self.project_description()?,
                )?;
                debug!(key = %key, "Computed cache key");
                Ok(key)
            })
            .as_ref()
            .map(String::as_str)
            .map_err(Clone::clone)
    }

    /// Cache key for one transformed file.
    pub fn file_cache_key(&self, source: &str, file_path: &str, options: &FileKeyOptions) -> Result<String> {
        let root_dir = options
            .root_dir
            .clone()
            .unwrap_or_else(|| self.root_dir().to_string());
        let instrument = options.instrument.to_string();
        Ok(digest_parts([self.cache_key()?, source, file_path, instrument.as_str(), root_dir.as_str()]))
    }
}

impl std::fmt::Debug for ConfigSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigSet")
            .field("root_dir", self.root_dir())
            .field("cwd", self.cwd())
            .field("parent_options", &self.parent_options)
            .field("compilers", &self.compilers)
            .finish_non_exhaustive()
    }
}

/// `cwd` defaults to the process directory, `rootDir` to `cwd`.
fn resolver_for(settings: &RunnerSettings) -> PathResolver {
    let process_dir = match std::env::current_dir() {
        Ok(dir) => NormalizedPath::new(dir),
        Err(e) => {
            tracing::warn!(error = %e, "Unable to read the process working directory");
            NormalizedPath::new(".")
        }
    };
    let cwd = settings
        .cwd
        .as_ref()
        .map(|cwd| process_dir.resolve(&NormalizedPath::new(cwd).to_string()))
        .unwrap_or(process_dir);
    let root_dir = settings
        .root_dir
        .as_ref()
        .map(|root| cwd.resolve(&NormalizedPath::new(root).to_string()))
        .unwrap_or_else(|| cwd.clone());
    PathResolver::new(root_dir, cwd)
}
