use bytes::Bytes;

/// An object as returned by the remote store and held in the cache.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StoredObject {
    /// Content type reported by the remote store, if any.
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl StoredObject {
    pub fn new(content_type: Option<String>, body: Bytes) -> Self {
        Self { content_type, body }
    }

    pub fn content_length(&self) -> usize {
        self.body.len()
    }
}
