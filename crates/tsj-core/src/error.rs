//! Error types for tsj-core

use crate::diagnostics::DiagnosticsError;

/// Result type for tsj-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving configuration
///
/// `Clone` so a memoized failure can be handed to every later caller.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Filesystem error from tsj-fs, including missing referenced files
    #[error(transparent)]
    Fs(#[from] tsj_fs::Error),

    /// The runner settings record could not be decoded
    #[error("Invalid runner settings: {message}")]
    InvalidSettings { message: String },

    /// An option in the embedded options block has the wrong shape
    #[error("Invalid value for option '{key}': {message}")]
    InvalidOptions { key: String, message: String },

    /// A path regex does not compile
    #[error("Invalid regular expression '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// The `compiler` option names a module that is not registered
    #[error("Unknown compiler module '{name}' (registered: {registered})")]
    UnknownCompiler { name: String, registered: String },

    /// Diagnostics survived the ignore and path filters
    #[error(transparent)]
    Diagnostics(#[from] DiagnosticsError),

    /// The secondary transform engine rejected its configuration
    #[error("Secondary transform configuration error: {message}")]
    Engine { message: String },

    /// A resolved view could not be serialized for the cache key
    #[error("Unable to serialize {view}: {message}")]
    Serialize { view: String, message: String },
}
