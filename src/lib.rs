pub use cache_key::CacheId;
pub use cache_store::FsCacheStore;
pub use config::StorageConfig;
pub use error::StorageError;
pub use object::StoredObject;
pub use remote::{ObjectAcl, PutSource, RemoteStore, S3RemoteStore};
pub use storage::S3Storage;

mod cache_key;
mod cache_store;
mod config;
mod error;
mod object;
mod remote;
pub mod response;
mod storage;

pub type Result<T> = std::result::Result<T, StorageError>;
