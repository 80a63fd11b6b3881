//! `<rootDir>`-aware path resolution

use crate::{Error, NormalizedPath, Result};

/// Marker that anchors a path at the runner's root directory.
pub const ROOT_DIR_MARKER: &str = "<rootDir>";

/// Resolves user-supplied paths against the runner's directories.
///
/// - `<rootDir>/x` resolves against the root directory
/// - absolute paths are returned unchanged
/// - anything else resolves against the working directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResolver {
    root_dir: NormalizedPath,
    cwd: NormalizedPath,
}

impl PathResolver {
    pub fn new(root_dir: impl Into<NormalizedPath>, cwd: impl Into<NormalizedPath>) -> Self {
        Self {
            root_dir: root_dir.into().clean(),
            cwd: cwd.into().clean(),
        }
    }

    pub fn root_dir(&self) -> &NormalizedPath {
        &self.root_dir
    }

    pub fn cwd(&self) -> &NormalizedPath {
        &self.cwd
    }

    /// Resolve `input` to an absolute path.
    ///
    /// Unless `allow_missing` is set, the resolved path must exist; otherwise
    /// [`Error::FileNotFound`] is returned with both spellings of the path.
    pub fn resolve(&self, input: &str, allow_missing: bool) -> Result<NormalizedPath> {
        let resolved = if let Some(rest) = input.strip_prefix(ROOT_DIR_MARKER) {
            self.root_dir.join(rest.trim_start_matches(['/', '\\']))
        } else if NormalizedPath::new(input).is_absolute() {
            NormalizedPath::new(input)
        } else {
            self.cwd.join(input)
        };

        if !allow_missing && !resolved.exists() {
            return Err(Error::FileNotFound {
                input: input.to_string(),
                resolved: resolved.to_native(),
            });
        }

        tracing::trace!(input, resolved = %resolved, "Resolved path");
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_dir_marker_resolves_against_root() {
        let resolver = PathResolver::new("/project/root", "/project/root/packages/a");
        let path = resolver.resolve("<rootDir>/tsconfig.json", true).unwrap();
        assert_eq!(path.as_str(), "/project/root/tsconfig.json");
    }

    #[test]
    fn bare_marker_is_the_root_itself() {
        let resolver = PathResolver::new("/project/root", "/elsewhere");
        let path = resolver.resolve("<rootDir>", true).unwrap();
        assert_eq!(path.as_str(), "/project/root");
    }

    #[test]
    fn relative_resolves_against_cwd() {
        let resolver = PathResolver::new("/root", "/work/dir");
        let path = resolver.resolve("../conf/tsconfig.json", true).unwrap();
        assert_eq!(path.as_str(), "/work/conf/tsconfig.json");
    }

    #[test]
    fn absolute_is_unchanged() {
        let resolver = PathResolver::new("/root", "/work");
        let path = resolver.resolve("/abs/file.json", true).unwrap();
        assert_eq!(path.as_str(), "/abs/file.json");
    }
}
