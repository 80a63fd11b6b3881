//! Filesystem layer for tsj
//!
//! Provides normalized paths, `<rootDir>`-aware path resolution, lenient
//! config file loading and the digest used for cache keys.

pub mod checksum;
pub mod config;
pub mod error;
pub mod io;
pub mod path;
pub mod resolver;

pub use checksum::{DIGEST_LEN, digest, digest_parts};
pub use config::{ConfigFormat, ConfigStore, parse_jsonc};
pub use error::{Error, Result};
pub use path::NormalizedPath;
pub use resolver::{PathResolver, ROOT_DIR_MARKER};
