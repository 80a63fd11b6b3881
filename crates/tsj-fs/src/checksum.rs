//! SHA-256 digests for cache keys
//!
//! Every digest is rendered as lowercase hex, so the width is the same for
//! all inputs.

use sha2::{Digest, Sha256};

/// Width in characters of every value returned by [`digest`].
pub const DIGEST_LEN: usize = 64;

/// Hash string content to a fixed-width hex digest.
pub fn digest(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Hash several parts, separated by NUL so `["ab", "c"]` and `["a", "bc"]`
/// never collide.
pub fn digest_parts<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut hasher = Sha256::new();
    for (index, part) in parts.into_iter().enumerate() {
        if index > 0 {
            hasher.update([0u8]);
        }
        hasher.update(part.as_ref().as_bytes());
    }
    format!("{:x}", hasher.finalize())
}
