//! Regex option normalization
//!
//! Path regexes arrive either as plain text or in structured form
//! (`{ "source": "...", "flags": "..." }`). Both collapse to the source text,
//! which is what gets compiled and what enters the fingerprint.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A regex option as written by the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PatternInput {
    Text(String),
    Structured {
        source: String,
        #[serde(default)]
        flags: Option<String>,
    },
}

impl From<&str> for PatternInput {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// Collapse a pattern to its canonical source text.
///
/// Flags are dropped. An empty pattern counts as absent.
pub fn normalize_regex(pattern: Option<&PatternInput>) -> Option<String> {
    let source = match pattern? {
        PatternInput::Text(text) => text,
        PatternInput::Structured { source, .. } => source,
    };
    (!source.is_empty()).then(|| source.clone())
}

/// Compile a normalized pattern.
pub fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}
