use md5::{Digest, Md5};

/// Store-facing identifier derived from a logical object key.
///
/// The 128-bit MD5 digest of the key, rendered as 32 lowercase hex
/// characters: fixed length, no path separators or reserved characters, so it
/// can name a file directly. Identical keys always produce identical
/// identifiers; collisions are a theoretical risk accepted for a cache lookup
/// key, not engineered around.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct CacheId(String);

impl CacheId {
    pub fn from_logical_key(key: &str) -> Self {
        Self(hex::encode(Md5::digest(key.as_bytes())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
