//! [`TestProject`] builder for configuration-resolution scenarios.

use std::fs;
use std::path::Path;

use serde_json::{Value, json};
use tempfile::TempDir;

/// A temporary project directory with helpers for writing fixture files and
/// building runner settings that point at it.
///
/// # Example
///
/// ```rust,no_run
/// use serde_json::json;
/// use tsj_test_utils::TestProject;
///
/// let project = TestProject::new();
/// project
///     .write("tsconfig.json", r#"{ "compilerOptions": { "strict": true } }"#)
///     .write("src/index.ts", "export const answer = 42;");
/// let settings = project.settings(json!({ "typeCheck": true }));
/// ```
pub struct TestProject {
    temp_dir: TempDir,
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

impl TestProject {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// A project with one TypeScript source so file discovery finds input.
    pub fn with_source() -> Self {
        let project = Self::new();
        project.write("src/index.ts", "export const answer = 42;\n");
        project
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Root as a forward-slash string, the form resolved paths take.
    pub fn root_str(&self) -> String {
        self.root().to_string_lossy().replace('\\', "/")
    }

    /// Forward-slash path of `relative` inside the project.
    pub fn path(&self, relative: &str) -> String {
        format!("{}/{}", self.root_str().trim_end_matches('/'), relative)
    }

    /// Write `content` to `relative`, creating parent directories.
    pub fn write(&self, relative: &str, content: &str) -> &Self {
        let full_path = self.root().join(relative);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&full_path, content).unwrap();
        self
    }

    /// Runner settings rooted at this project with `embedded` as the
    /// `ts-jest` block.
    pub fn settings(&self, embedded: Value) -> Value {
        json!({
            "rootDir": self.root_str(),
            "cwd": self.root_str(),
            "cache": false,
            "globals": { "ts-jest": embedded },
        })
    }

    /// Like [`Self::settings`] with caching enabled under `.cache`.
    pub fn cached_settings(&self, embedded: Value) -> Value {
        let mut settings = self.settings(embedded);
        settings["cache"] = Value::Bool(true);
        settings["cacheDirectory"] = Value::String(self.path(".cache"));
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_creates_parents() {
        let project = TestProject::new();
        project.write("a/b/c.ts", "x");
        assert!(project.root().join("a/b/c.ts").is_file());
    }

    #[test]
    fn settings_point_at_root() {
        let project = TestProject::new();
        let settings = project.cached_settings(json!({ "tsConfig": false }));
        assert_eq!(settings["cwd"], project.root_str());
        assert_eq!(settings["cacheDirectory"], project.path(".cache"));
        assert_eq!(settings["globals"]["ts-jest"]["tsConfig"], false);
    }
}
