//! Text I/O helpers

use std::fs;

use crate::{Error, NormalizedPath, Result};

/// Read a UTF-8 text file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))
}
