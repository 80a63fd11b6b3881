//! Diagnostics filtering and the compile error surfaced to users
//!
//! A [`DiagnosticsPolicy`] is built once from the resolved diagnostics
//! options. It decides which files are reported at all (the optional
//! inclusion regex) and which codes are always dropped.

use std::collections::BTreeSet;
use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tsj_fs::NormalizedPath;

use crate::compiler::Compiler;
use crate::options::DiagnosticsOptions;
use crate::pattern;
use crate::Result;

/// Severity of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticCategory {
    Error,
    Warning,
    Message,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Message => write!(f, "message"),
        }
    }
}

/// A structured problem report from directive resolution or compilation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: u32,
    pub category: DiagnosticCategory,
    pub message: String,
    /// Source file the diagnostic belongs to, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl Diagnostic {
    pub fn error(code: u32, message: impl Into<String>) -> Self {
        Self {
            code,
            category: DiagnosticCategory::Error,
            message: message.into(),
            file: None,
        }
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }
}

/// Compiler diagnostics that survived filtering.
///
/// `Debug` prints only the formatted text; the Rust-side structure carries no
/// information for the user.
#[derive(Clone, PartialEq, Eq, thiserror::Error)]
#[error("⨯ Unable to compile TypeScript:\n{}", .diagnostic_text.trim())]
pub struct DiagnosticsError {
    pub diagnostic_text: String,
    pub diagnostic_codes: Vec<u32>,
}

impl fmt::Debug for DiagnosticsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.diagnostic_text)
    }
}

/// Final diagnostics filter computed from [`DiagnosticsOptions`]
#[derive(Debug, Clone)]
pub struct DiagnosticsPolicy {
    pretty: bool,
    ignore_codes: BTreeSet<u32>,
    path_regex: Option<Regex>,
}

impl DiagnosticsPolicy {
    pub fn new(options: &DiagnosticsOptions) -> Result<Self> {
        let path_regex = options
            .path_regex
            .as_deref()
            .map(pattern::compile)
            .transpose()?;

        Ok(Self {
            pretty: options.pretty,
            ignore_codes: options.ignore_codes.iter().copied().collect(),
            path_regex,
        })
    }

    pub fn pretty(&self) -> bool {
        self.pretty
    }

    pub fn ignores(&self, code: u32) -> bool {
        self.ignore_codes.contains(&code)
    }

    /// True unless an inclusion regex is configured and `file_path` fails it.
    pub fn should_report(&self, file_path: &str) -> bool {
        self.path_regex
            .as_ref()
            .is_none_or(|regex| regex.is_match(file_path))
    }

    /// Drop diagnostics for unreported files and ignored codes.
    ///
    /// When `file_path` is given and not reported, the result is empty
    /// regardless of the diagnostics' own files.
    pub fn filter(&self, diagnostics: &[Diagnostic], file_path: Option<&str>) -> Vec<Diagnostic> {
        if file_path.is_some_and(|path| !self.should_report(path)) {
            return Vec::new();
        }

        diagnostics
            .iter()
            .filter(|diagnostic| match diagnostic.file.as_deref() {
                Some(file) if !file.is_empty() => self.should_report(file),
                _ => true,
            })
            .filter(|diagnostic| !self.ignores(diagnostic.code))
            .cloned()
            .collect()
    }

    /// Format `diagnostics` with the compiler's formatter into the single
    /// user-facing compile error.
    pub fn create_error(
        &self,
        diagnostics: &[Diagnostic],
        compiler: &dyn Compiler,
        cwd: &NormalizedPath,
    ) -> DiagnosticsError {
        DiagnosticsError {
            diagnostic_text: compiler.format_diagnostics(diagnostics, self.pretty, cwd),
            diagnostic_codes: diagnostics.iter().map(|d| d.code).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::StandardCompiler;
    use crate::options::MATCH_NOTHING;

    fn policy(ignore: &[u32], path_regex: Option<&str>) -> DiagnosticsPolicy {
        DiagnosticsPolicy::new(&DiagnosticsOptions {
            pretty: false,
            ignore_codes: ignore.to_vec(),
            path_regex: path_regex.map(str::to_string),
        })
        .unwrap()
    }

    #[test]
    fn ignored_codes_are_dropped() {
        let policy = policy(&[6059, 18002, 18003, 2307], None);
        let diagnostics = vec![
            Diagnostic::error(6059, "rootDir"),
            Diagnostic::error(2307, "cannot find module"),
            Diagnostic::error(1005, "';' expected"),
        ];

        let codes: Vec<u32> = policy.filter(&diagnostics, None).iter().map(|d| d.code).collect();
        assert_eq!(codes, vec![1005]);
    }

    #[test]
    fn path_regex_scopes_reporting() {
        let policy = policy(&[], Some(r"\.test\.ts$"));
        assert!(policy.should_report("a.test.ts"));
        assert!(!policy.should_report("a.ts"));
    }

    #[test]
    fn unreported_file_short_circuits() {
        let policy = policy(&[], Some(r"\.test\.ts$"));
        let diagnostics = vec![Diagnostic::error(1005, "x").with_file("a.test.ts")];
        assert!(policy.filter(&diagnostics, Some("a.ts")).is_empty());
        assert_eq!(policy.filter(&diagnostics, Some("a.test.ts")).len(), 1);
    }

    #[test]
    fn diagnostics_in_unreported_files_are_dropped() {
        let policy = policy(&[], Some("^src/"));
        let diagnostics = vec![
            Diagnostic::error(1005, "kept").with_file("src/a.ts"),
            Diagnostic::error(1005, "dropped").with_file("lib/b.ts"),
            Diagnostic::error(1005, "no file"),
        ];
        let kept: Vec<_> = policy.filter(&diagnostics, None).into_iter().map(|d| d.message).collect();
        assert_eq!(kept, vec!["kept", "no file"]);
    }

    #[test]
    fn match_nothing_reports_no_real_path() {
        let policy = policy(&[], Some(MATCH_NOTHING));
        for path in ["a.ts", "/abs/path/b.tsx", "", "a"] {
            assert!(!policy.should_report(path), "{path} should not be reported");
        }
    }

    #[test]
    fn create_error_collects_codes_and_hides_structure() {
        let policy = policy(&[], None);
        let diagnostics = vec![
            Diagnostic::error(1005, "';' expected.").with_file("/work/a.ts"),
            Diagnostic::error(2304, "Cannot find name 'x'."),
        ];
        let error = policy.create_error(&diagnostics, &StandardCompiler::new(), &NormalizedPath::new("/work"));

        assert_eq!(error.diagnostic_codes, vec![1005, 2304]);
        let display = error.to_string();
        assert!(display.starts_with("⨯ Unable to compile TypeScript:\n"));
        assert!(display.contains("a.ts: error TS1005: ';' expected."));
        assert_eq!(format!("{error:?}"), error.diagnostic_text);
    }
}
