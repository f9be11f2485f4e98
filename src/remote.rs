use std::path::PathBuf;

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use bytes::Bytes;

use crate::object::StoredObject;
use crate::{Result, StorageError};

/// Where the bytes of a put come from: literal content, or a local file
/// streamed from disk.
#[derive(Clone, Debug)]
pub enum PutSource {
    Bytes(Bytes),
    File(PathBuf),
}

impl From<Bytes> for PutSource {
    fn from(value: Bytes) -> Self {
        Self::Bytes(value)
    }
}

impl From<&'static str> for PutSource {
    fn from(value: &'static str) -> Self {
        Self::Bytes(Bytes::from_static(value.as_bytes()))
    }
}

/// Read access applied to an object on write.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ObjectAcl {
    PublicRead,
    AuthenticatedRead,
}

impl ObjectAcl {
    pub fn from_public(public: bool) -> Self {
        if public {
            Self::PublicRead
        } else {
            Self::AuthenticatedRead
        }
    }
}

/// Contract the cache manager consumes: put/get/delete of named objects in a
/// bucket.
///
/// `fetch` must signal a missing object as
/// [`StorageError::ObjectNotFound`]; any other failure is propagated
/// unchanged. Retry and timeouts, if any, belong to the implementation.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn fetch(&self, bucket: &str, key: &str) -> Result<StoredObject>;

    async fn put(&self, bucket: &str, key: &str, source: PutSource, acl: ObjectAcl) -> Result<()>;

    /// Deleting an absent key must not be a distinct fatal error.
    async fn delete(&self, bucket: &str, key: &str) -> Result<()>;
}

/// [`RemoteStore`] backed by the AWS SDK S3 client.
pub struct S3RemoteStore {
    client: aws_sdk_s3::Client,
}

impl S3RemoteStore {
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RemoteStore for S3RemoteStore {
    async fn fetch(&self, bucket: &str, key: &str) -> Result<StoredObject> {
        let output = match self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(err) => {
                let err = err.into_service_error();
                if err.is_no_such_key() {
                    return Err(StorageError::ObjectNotFound(key.to_string()));
                }
                return Err(StorageError::Remote(Box::new(err)));
            }
        };

        let content_type = output.content_type().map(str::to_string);
        let body = output
            .body
            .collect()
            .await
            .map_err(|err| StorageError::Remote(Box::new(err)))?
            .into_bytes();

        Ok(StoredObject::new(content_type, body))
    }

    async fn put(&self, bucket: &str, key: &str, source: PutSource, acl: ObjectAcl) -> Result<()> {
        let body = match source {
            PutSource::Bytes(bytes) => ByteStream::from(bytes),
            PutSource::File(path) => ByteStream::from_path(&path)
                .await
                .map_err(|err| StorageError::Remote(Box::new(err)))?,
        };

        let acl = match acl {
            ObjectAcl::PublicRead => ObjectCannedAcl::PublicRead,
            ObjectAcl::AuthenticatedRead => ObjectCannedAcl::AuthenticatedRead,
        };

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .acl(acl)
            .body(body)
            .send()
            .await
            .map_err(|err| StorageError::Remote(Box::new(err.into_service_error())))?;

        Ok(())
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<()> {
        // S3 DeleteObject succeeds on an absent key, which gives the manager
        // its delete idempotence.
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| StorageError::Remote(Box::new(err.into_service_error())))?;

        Ok(())
    }
}
