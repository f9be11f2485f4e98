/// Errors surfaced by the storage cache.
///
/// A missing remote object is an expected, recoverable condition and gets its
/// own variant so presentation layers can map it to a 404. A cache store I/O
/// failure is distinct from a cache miss and is never treated as one.
pub enum StorageError {
    /// The remote store has no object under the given key.
    ObjectNotFound(String),
    /// Local cache store I/O failure.
    CacheUnavailable(std::io::Error),
    /// Remote store failure other than not-found, propagated unchanged.
    Remote(Box<dyn std::error::Error + Send + Sync>),
    /// Missing or invalid configuration value, rejected before any client is
    /// built.
    Configuration(String),
    /// Local filesystem error while enumerating files for bulk upload.
    Io(std::io::Error),
}

impl StorageError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ObjectNotFound(_))
    }
}

impl std::error::Error for StorageError {}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            Self::ObjectNotFound(key) => write!(f, "Object not found: {key}"),
            Self::CacheUnavailable(io_error) => write!(f, "Cache store unavailable: {io_error}"),
            Self::Remote(remote_error) => write!(f, "Remote store error: {remote_error}"),
            Self::Configuration(message) => write!(f, "Configuration error: {message}"),
            Self::Io(io_error) => write!(f, "IO error: {io_error}"),
        }
    }
}

impl std::fmt::Debug for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self, f)
    }
}

impl From<walkdir::Error> for StorageError {
    fn from(value: walkdir::Error) -> Self {
        Self::Io(value.into())
    }
}
