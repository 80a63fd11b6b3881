//! Error types for tsj-fs

use std::path::PathBuf;
use std::sync::Arc;

/// Result type for tsj-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tsj-fs operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: Arc<std::io::Error>,
    },

    #[error("Failed to parse {format} config at {path}: {message}")]
    ConfigParse {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Unsupported config format: {extension}")]
    UnsupportedFormat { extension: String },

    /// A referenced path does not exist. Carries the text the user wrote and
    /// the absolute path it resolved to.
    #[error("File not found: {input} (resolved as: {resolved})")]
    FileNotFound { input: String, resolved: PathBuf },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source: Arc::new(source),
        }
    }
}
