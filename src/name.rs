//! Resource name derivation.
//!
//! Every deployment is addressed by a name derived from the model hub, the
//! model identifier, and the model version. The derivation is deterministic
//! so that the cache written by one process remains valid for the next, and
//! the result is kept under the vendor name-length ceiling.

use std::fmt;

/// Vendor-imposed ceiling on resource name length, in bytes.
pub const MAX_NAME_LEN: usize = 64;

/// Length of the hash suffix used when a name must be shortened.
const HASH_SUFFIX_LEN: usize = 16;

/// Model hub the model is fetched from.
///
/// Hub metadata parsing lives outside this crate; the platform identifier
/// itself participates in resource naming and default-config lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// huggingface.co
    HuggingFace,
    /// modelscope.cn
    ModelScope,
}

impl Platform {
    /// Lowercase identifier used in resource names and config lookup.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HuggingFace => "huggingface",
            Self::ModelScope => "modelscope",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Derive the remote resource name for a model deployment.
///
/// The name is `modelport-{platform}-{model_id}-{model_version}` with path
/// separators replaced by `-`. Identical inputs always produce an identical
/// name, across process restarts, so cache entries stay addressable.
///
/// Names longer than [`MAX_NAME_LEN`] are shortened by replacing the tail
/// with a blake3 hash prefix of the full name. Shortening is deterministic
/// too: two distinct long names keep distinct hashes.
///
/// # Example
///
/// ```
/// use modelport::{resource_name, Platform};
///
/// let name = resource_name(Platform::ModelScope, "damo/nlp_structbert", "master");
/// assert_eq!(name, "modelport-modelscope-damo-nlp_structbert-master");
/// ```
#[must_use]
pub fn resource_name(platform: Platform, model_id: &str, model_version: &str) -> String {
    let raw = format!(
        "modelport-{}-{}-{}",
        platform.as_str(),
        model_id,
        model_version
    );
    let sanitized: String = raw
        .chars()
        .map(|c| if c == '/' || c == '\\' { '-' } else { c })
        .collect();

    if sanitized.len() <= MAX_NAME_LEN {
        return sanitized;
    }

    let hash = blake3::hash(sanitized.as_bytes()).to_hex();
    let budget = MAX_NAME_LEN - HASH_SUFFIX_LEN - 1;
    // Truncate by bytes, on a char boundary, so multibyte model ids still
    // land under the ceiling
    let keep = sanitized
        .char_indices()
        .map(|(idx, c)| idx + c.len_utf8())
        .take_while(|&end| end <= budget)
        .last()
        .unwrap_or(0);
    let mut prefix = sanitized[..keep].to_string();
    prefix.push('-');
    prefix.push_str(&hash.as_str()[..HASH_SUFFIX_LEN]);
    prefix
}
