use std::path::Path;
use std::time::Duration;

use aws_credential_types::Credentials;
use bytes::Bytes;
use http::Response;
use tracing::{debug, error};
use walkdir::WalkDir;

use crate::cache_key::CacheId;
use crate::cache_store::FsCacheStore;
use crate::config::StorageConfig;
use crate::object::StoredObject;
use crate::remote::{ObjectAcl, PutSource, RemoteStore, S3RemoteStore};
use crate::response;
use crate::Result;

/// Read-through cache manager in front of a remote object store.
///
/// Reads check the local [`FsCacheStore`] first and fall through to the
/// remote store on a miss, writing the fetched object back before returning.
/// Writes and deletes go to the remote store and invalidate the cache: the
/// cache is an accelerator, never the source of truth.
///
/// Generic over the remote store so tests can substitute an in-memory
/// backend.
pub struct S3Storage<R = S3RemoteStore> {
    remote: R,
    cache: FsCacheStore,
    bucket: String,
    cache_lifetime: Duration,
}

impl S3Storage<S3RemoteStore> {
    /// Builds the AWS S3 client from the configuration and wraps it.
    pub async fn connect(config: StorageConfig) -> Result<Self> {
        config.validate()?;

        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "s3-storage-static",
        );

        let sdk_config = aws_config::from_env()
            .endpoint_url(&config.endpoint)
            .region(aws_sdk_s3::config::Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .load()
            .await;

        let client = aws_sdk_s3::Client::from_conf(
            aws_sdk_s3::config::Builder::from(&sdk_config)
                .force_path_style(true)
                .build(),
        );

        Ok(Self::with_remote(config, S3RemoteStore::new(client)))
    }
}

impl<R: RemoteStore> S3Storage<R> {
    /// Wraps an already-built remote store.
    pub fn with_remote(config: StorageConfig, remote: R) -> Self {
        let cache = FsCacheStore::new(&config.cache_directory);

        Self {
            remote,
            cache,
            bucket: config.bucket,
            cache_lifetime: config.cache_lifetime,
        }
    }

    /// Redirects subsequent operations to a different bucket.
    pub fn set_bucket(&mut self, bucket: impl Into<String>) -> &mut Self {
        self.bucket = bucket.into();
        self
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Fetches an object by key, serving it from the cache when fresh.
    ///
    /// On a hit the entry's expiry is extended by the configured lifetime
    /// (sliding expiration). On a miss the object is fetched from the remote
    /// store and written to the cache before it is returned, so an identical
    /// request immediately after sees a hit. Concurrent misses on the same
    /// key may each fetch; the last cache write wins and every caller still
    /// gets a correct result.
    pub async fn fetch_object(&self, key: &str) -> Result<StoredObject> {
        let id = CacheId::from_logical_key(key);

        if let Some(object) = self.cache.get(&id).await? {
            debug!(key, "cache hit");
            self.cache.touch(&id, self.cache_lifetime).await?;
            return Ok(object);
        }

        debug!(key, "cache miss");

        let object = match self.remote.fetch(&self.bucket, key).await {
            Ok(object) => object,
            Err(err) => {
                if !err.is_not_found() {
                    error!(key, error = %err, "remote store error on fetch");
                }
                return Err(err);
            }
        };

        self.cache.set(&id, &object, self.cache_lifetime).await?;

        Ok(object)
    }

    /// Delivers an object as an HTTP response.
    pub async fn get(&self, key: &str) -> Result<Response<Bytes>> {
        let object = self.fetch_object(key).await?;
        Ok(response::object_response(&object))
    }

    /// Delivers an object as a forced download. The filename defaults to the
    /// basename of the key.
    pub async fn get_download(
        &self,
        key: &str,
        file_name: Option<&str>,
    ) -> Result<Response<Bytes>> {
        let object = self.fetch_object(key).await?;
        let name = file_name.unwrap_or_else(|| basename(key));

        Ok(response::download_response(&object, name))
    }

    /// Uploads an object to the remote store.
    ///
    /// The cache is not updated here; the next read misses and repopulates.
    /// A previously cached copy may therefore be served until its TTL expires
    /// or it is explicitly invalidated.
    pub async fn put(&self, key: &str, source: PutSource, public: bool) -> Result<()> {
        debug!(key, public, "putting object");

        self.remote
            .put(&self.bucket, key, source, ObjectAcl::from_public(public))
            .await
            .map_err(|err| {
                error!(key, error = %err, "remote store error on put");
                err
            })
    }

    /// Uploads entries one by one in iteration order.
    ///
    /// Not transactional: the first failure is returned, earlier puts stay
    /// applied and the remainder is unattempted.
    pub async fn put_many<I>(&self, entries: I, public: bool) -> Result<()>
    where
        I: IntoIterator<Item = (String, PutSource)>,
    {
        for (key, source) in entries {
            self.put(&key, source, public).await?;
        }

        Ok(())
    }

    /// Uploads every file under `path`, recursively, as
    /// `"{destination}/{file_name}"`, streamed from disk with
    /// authenticated-read access.
    pub async fn put_from_folder(&self, path: impl AsRef<Path>, destination: &str) -> Result<()> {
        for entry in WalkDir::new(path) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy();
            let key = format!("{destination}/{file_name}");

            self.put(&key, PutSource::File(entry.path().to_path_buf()), false)
                .await?;
        }

        Ok(())
    }

    /// Invalidates the cache entry for a key, leaving the remote object
    /// untouched. Returns whether an entry was removed.
    pub async fn forget(&self, key: &str) -> Result<bool> {
        self.cache.delete(&CacheId::from_logical_key(key)).await
    }

    /// Deletes an object from the cache and the remote store.
    ///
    /// The cache entry goes first: if the remote delete then fails, a stale
    /// hit can no longer be served while the caller retries. Deleting an
    /// already-absent remote key succeeds, so a repeated delete is a no-op.
    pub async fn delete(&self, key: &str) -> Result<()> {
        self.forget(key).await?;

        self.remote.delete(&self.bucket, key).await.map_err(|err| {
            error!(key, error = %err, "remote store error on delete");
            err
        })
    }
}

fn basename(key: &str) -> &str {
    let key = key.trim_end_matches('/');
    key.rsplit('/').next().unwrap_or(key)
}
