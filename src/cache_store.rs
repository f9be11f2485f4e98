use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::debug;

use crate::cache_key::CacheId;
use crate::object::StoredObject;
use crate::{Result, StorageError};

/// Subdirectory all entries live under, so a `cache_directory` shared with
/// unrelated cache uses cannot collide with ours.
const NAMESPACE: &str = "s3storage";

const META_SUFFIX: &str = "meta";

#[derive(Serialize, Deserialize)]
struct EntryMetadata {
    content_type: Option<String>,
    /// Unix seconds after which the entry reads as absent.
    expires_at: u64,
}

/// Filesystem-backed cache store with per-entry TTL.
///
/// Each entry is a body file named after its [`CacheId`] plus a JSON metadata
/// sidecar `<id>.meta` carrying the content type and expiry. The sidecar is
/// written last, so a partially written entry reads as absent. Expired
/// entries are evicted when accessed.
///
/// All state lives on disk; concurrent writers of the same id are
/// last-write-wins.
pub struct FsCacheStore {
    root: PathBuf,
}

impl FsCacheStore {
    pub fn new(cache_directory: impl AsRef<Path>) -> Self {
        Self {
            root: cache_directory.as_ref().join(NAMESPACE),
        }
    }

    fn body_path(&self, id: &CacheId) -> PathBuf {
        self.root.join(id.as_str())
    }

    fn meta_path(&self, id: &CacheId) -> PathBuf {
        self.root.join(format!("{}.{META_SUFFIX}", id.as_str()))
    }

    /// Returns the stored object if present and not expired.
    ///
    /// An absent or expired entry is a miss (`None`); a store I/O failure is
    /// [`StorageError::CacheUnavailable`], never a miss.
    pub async fn get(&self, id: &CacheId) -> Result<Option<StoredObject>> {
        let meta_bytes = match fs::read(self.meta_path(id)).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(StorageError::CacheUnavailable(err)),
        };

        let Ok(meta) = serde_json::from_slice::<EntryMetadata>(&meta_bytes) else {
            debug!(id = %id, "dropping cache entry with unreadable metadata");
            self.delete(id).await?;
            return Ok(None);
        };

        if meta.expires_at <= unix_now() {
            self.delete(id).await?;
            return Ok(None);
        }

        match fs::read(self.body_path(id)).await {
            Ok(body) => Ok(Some(StoredObject::new(
                meta.content_type,
                Bytes::from(body),
            ))),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                // Sidecar without a body.
                self.delete(id).await?;
                Ok(None)
            }
            Err(err) => Err(StorageError::CacheUnavailable(err)),
        }
    }

    /// Stores or overwrites an entry with expiry `now + ttl`.
    pub async fn set(&self, id: &CacheId, object: &StoredObject, ttl: Duration) -> Result<()> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(StorageError::CacheUnavailable)?;
        fs::write(self.body_path(id), &object.body)
            .await
            .map_err(StorageError::CacheUnavailable)?;

        self.write_meta(
            id,
            &EntryMetadata {
                content_type: object.content_type.clone(),
                expires_at: expiry(ttl),
            },
        )
        .await
    }

    /// Extends the expiry of an existing entry without changing its value.
    /// A no-op when the entry is absent.
    pub async fn touch(&self, id: &CacheId, ttl: Duration) -> Result<()> {
        let meta_bytes = match fs::read(self.meta_path(id)).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(()),
            Err(err) => return Err(StorageError::CacheUnavailable(err)),
        };

        let Ok(mut meta) = serde_json::from_slice::<EntryMetadata>(&meta_bytes) else {
            return Ok(());
        };

        meta.expires_at = expiry(ttl);
        self.write_meta(id, &meta).await
    }

    /// Removes an entry if present. Returns whether a body was removed.
    pub async fn delete(&self, id: &CacheId) -> Result<bool> {
        let removed = match fs::remove_file(self.body_path(id)).await {
            Ok(()) => true,
            Err(err) if err.kind() == ErrorKind::NotFound => false,
            Err(err) => return Err(StorageError::CacheUnavailable(err)),
        };

        match fs::remove_file(self.meta_path(id)).await {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(StorageError::CacheUnavailable(err)),
        }

        Ok(removed)
    }

    async fn write_meta(&self, id: &CacheId, meta: &EntryMetadata) -> Result<()> {
        let encoded =
            serde_json::to_vec(meta).map_err(|err| StorageError::CacheUnavailable(err.into()))?;

        fs::write(self.meta_path(id), encoded)
            .await
            .map_err(StorageError::CacheUnavailable)
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_secs()
}

fn expiry(ttl: Duration) -> u64 {
    unix_now() + ttl.as_secs()
}
