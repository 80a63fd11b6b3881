//! Source file list expansion (`files`, `include`, `exclude`)

use regex::Regex;
use serde_json::{Map, Value};
use tsj_fs::NormalizedPath;
use walkdir::WalkDir;

use crate::diagnostics::Diagnostic;

const DEFAULT_INCLUDE: &str = "**/*";
const DEFAULT_EXCLUDE: &[&str] = &["node_modules", "bower_components", "jspm_packages"];
const TS_EXTENSIONS: &[&str] = &[".ts", ".tsx", ".d.ts"];
const JS_EXTENSIONS: &[&str] = &[".js", ".jsx"];

/// Expand the description's file set.
///
/// `options` are the already validated directives, so path-typed values such
/// as `outDir` are absolute.
pub(super) fn expand_file_names(
    config: &Map<String, Value>,
    options: &Map<String, Value>,
    base_path: &NormalizedPath,
    config_label: &str,
    errors: &mut Vec<Diagnostic>,
) -> Vec<NormalizedPath> {
    let files = string_list(config, "files", errors);
    let include = string_list(config, "include", errors);
    let exclude = string_list(config, "exclude", errors);

    let mut file_names: Vec<NormalizedPath> = Vec::new();
    if let Some(files) = &files {
        if files.is_empty() && include.is_none() {
            errors.push(Diagnostic::error(
                18002,
                format!("The 'files' list in config file '{config_label}' is empty."),
            ));
            return file_names;
        }
        file_names.extend(files.iter().map(|file| base_path.resolve(file)));
    }

    let include_specs: Vec<String> = match (&include, &files) {
        (Some(include), _) => include.clone(),
        (None, Some(_)) => Vec::new(),
        (None, None) => vec![DEFAULT_INCLUDE.to_string()],
    };
    let mut exclude_specs: Vec<String> = exclude
        .clone()
        .unwrap_or_else(|| DEFAULT_EXCLUDE.iter().map(|s| s.to_string()).collect());
    if let Some(out_dir) = options.get("outDir").and_then(Value::as_str)
        && let Some(relative) = relative_to(base_path, &NormalizedPath::new(out_dir))
    {
        exclude_specs.push(relative);
    }

    if !include_specs.is_empty() {
        let allow_js = options.get("allowJs").and_then(Value::as_bool).unwrap_or(false);
        let includes = compile_globs(&include_specs);
        let excludes = compile_globs(&exclude_specs);

        let mut matched = walk_sources(base_path, &includes, &excludes, allow_js);
        matched.retain(|path| !file_names.contains(path));
        file_names.extend(matched);
    }

    if file_names.is_empty() {
        errors.push(Diagnostic::error(
            18003,
            format!(
                "No inputs were found in config file '{config_label}'. Specified 'include' paths were '{}' and 'exclude' paths were '{}'.",
                Value::from(include_specs),
                Value::from(exclude_specs),
            ),
        ));
    }

    file_names
}

/// Read `key` as a list of strings; a wrong shape is a diagnostic.
fn string_list(config: &Map<String, Value>, key: &str, errors: &mut Vec<Diagnostic>) -> Option<Vec<String>> {
    let value = config.get(key)?;
    match value.as_array() {
        Some(items) if items.iter().all(Value::is_string) => Some(
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
        ),
        _ => {
            errors.push(Diagnostic::error(
                5024,
                format!("Compiler option '{key}' requires a value of type Array."),
            ));
            None
        }
    }
}

fn walk_sources(base_path: &NormalizedPath, includes: &[Regex], excludes: &[Regex], allow_js: bool) -> Vec<NormalizedPath> {
    let root = base_path.to_native();
    let is_excluded = |relative: &str| excludes.iter().any(|regex| regex.is_match(relative));

    let mut found: Vec<NormalizedPath> = WalkDir::new(&root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                return true;
            }
            let relative = relative_str(&root, entry.path());
            entry.file_name() != "node_modules" && !is_excluded(&relative)
        })
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            let relative = relative_str(&root, entry.path());
            let wanted = has_source_extension(&relative, allow_js)
                && includes.iter().any(|regex| regex.is_match(&relative))
                && !is_excluded(&relative);
            wanted.then(|| base_path.join(&relative))
        })
        .collect();
    found.sort();
    found
}

fn relative_str(root: &std::path::Path, path: &std::path::Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    NormalizedPath::new(relative).as_str().to_string()
}

pub(super) fn relative_to(base: &NormalizedPath, path: &NormalizedPath) -> Option<String> {
    let base = base.clean();
    let path = path.clean();
    let prefix = format!("{}/", base.as_str().trim_end_matches('/'));
    path.as_str().strip_prefix(&prefix).map(str::to_string)
}

fn has_source_extension(path: &str, allow_js: bool) -> bool {
    TS_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
        || (allow_js && JS_EXTENSIONS.iter().any(|ext| path.ends_with(ext)))
}

fn compile_globs(specs: &[String]) -> Vec<Regex> {
    specs
        .iter()
        .filter_map(|spec| match glob_to_regex(spec) {
            Ok(regex) => Some(regex),
            Err(e) => {
                tracing::warn!(spec, error = %e, "Skipping unusable file pattern");
                None
            }
        })
        .collect()
}

/// Translate a file spec into an anchored regex over base-relative paths.
///
/// `**/` spans any number of directories, `*` and `?` stay within one
/// segment. A spec naming a directory also matches everything below it.
pub(super) fn glob_to_regex(spec: &str) -> Result<Regex, regex::Error> {
    let spec = spec.trim_start_matches("./").trim_end_matches('/');
    let mut pattern = String::from("^");
    let mut chars = spec.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
                if chars.peek() == Some(&'/') {
                    chars.next();
                    pattern.push_str("(?:[^/]+/)*");
                } else {
                    pattern.push_str(".*");
                }
            }
            '*' => pattern.push_str("[^/]*"),
            '?' => pattern.push_str("[^/]"),
            other => pattern.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
    }
    pattern.push_str("(?:/.*)?$");
    Regex::new(&pattern)
}
