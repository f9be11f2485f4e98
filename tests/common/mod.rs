use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use s3_storage::{ObjectAcl, PutSource, RemoteStore, Result, StorageConfig, StorageError, StoredObject};
use tokio::sync::Mutex;

/// In-memory remote object store for testing, with per-operation call
/// counters and injectable failures.
#[derive(Clone)]
pub struct MockRemoteStore {
    objects: Arc<Mutex<HashMap<(String, String), StoredObject>>>,
    fail_put_keys: Arc<Mutex<HashSet<String>>>,
    fail_deletes: Arc<Mutex<bool>>,
    fetch_count: Arc<Mutex<u64>>,
    put_count: Arc<Mutex<u64>>,
    delete_count: Arc<Mutex<u64>>,
}

impl MockRemoteStore {
    pub fn new() -> Self {
        Self {
            objects: Arc::new(Mutex::new(HashMap::new())),
            fail_put_keys: Arc::new(Mutex::new(HashSet::new())),
            fail_deletes: Arc::new(Mutex::new(false)),
            fetch_count: Arc::new(Mutex::new(0)),
            put_count: Arc::new(Mutex::new(0)),
            delete_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Pre-populate the store with test data.
    pub async fn insert(&self, bucket: &str, key: &str, content_type: Option<&str>, body: &[u8]) {
        let object = StoredObject::new(
            content_type.map(str::to_string),
            Bytes::copy_from_slice(body),
        );
        self.objects
            .lock()
            .await
            .insert((bucket.to_string(), key.to_string()), object);
    }

    /// Make every put of `key` fail with a remote error.
    pub async fn fail_puts_of(&self, key: &str) {
        self.fail_put_keys.lock().await.insert(key.to_string());
    }

    /// Toggle failure of every delete.
    pub async fn fail_deletes(&self, fail: bool) {
        *self.fail_deletes.lock().await = fail;
    }

    pub async fn contains(&self, bucket: &str, key: &str) -> bool {
        self.objects
            .lock()
            .await
            .contains_key(&(bucket.to_string(), key.to_string()))
    }

    pub async fn body_of(&self, bucket: &str, key: &str) -> Option<Bytes> {
        self.objects
            .lock()
            .await
            .get(&(bucket.to_string(), key.to_string()))
            .map(|object| object.body.clone())
    }

    pub async fn fetch_count(&self) -> u64 {
        *self.fetch_count.lock().await
    }

    pub async fn put_count(&self) -> u64 {
        *self.put_count.lock().await
    }

    pub async fn delete_count(&self) -> u64 {
        *self.delete_count.lock().await
    }
}

fn injected_error(what: &str) -> StorageError {
    StorageError::Remote(Box::new(std::io::Error::other(format!(
        "injected {what} failure"
    ))))
}

#[async_trait]
impl RemoteStore for MockRemoteStore {
    async fn fetch(&self, bucket: &str, key: &str) -> Result<StoredObject> {
        *self.fetch_count.lock().await += 1;

        self.objects
            .lock()
            .await
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| StorageError::ObjectNotFound(key.to_string()))
    }

    async fn put(&self, bucket: &str, key: &str, source: PutSource, _acl: ObjectAcl) -> Result<()> {
        *self.put_count.lock().await += 1;

        if self.fail_put_keys.lock().await.contains(key) {
            return Err(injected_error("put"));
        }

        let body = match source {
            PutSource::Bytes(bytes) => bytes,
            PutSource::File(path) => Bytes::from(
                tokio::fs::read(&path)
                    .await
                    .map_err(StorageError::Io)?,
            ),
        };

        self.objects.lock().await.insert(
            (bucket.to_string(), key.to_string()),
            StoredObject::new(None, body),
        );

        Ok(())
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<()> {
        *self.delete_count.lock().await += 1;

        if *self.fail_deletes.lock().await {
            return Err(injected_error("delete"));
        }

        // Removing an absent key still succeeds, matching S3 semantics.
        self.objects
            .lock()
            .await
            .remove(&(bucket.to_string(), key.to_string()));

        Ok(())
    }
}

/// Configuration pointing the cache at a test-owned directory.
pub fn test_config(cache_dir: &Path) -> StorageConfig {
    let mut config = StorageConfig::new(
        "us-east-1",
        "http://minio:9000",
        "minioadmin",
        "minioadmin",
        "test-bucket",
    );
    config.cache_directory = cache_dir.to_string_lossy().into_owned();
    config
}
