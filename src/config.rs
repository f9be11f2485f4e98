use std::{
    collections::HashMap,
    fmt::{Display, Formatter},
    time::Duration,
};

use crate::{Result, StorageError};

/// S3 API revision the original storage clients pin. The AWS SDK fixes the
/// API version itself, so this field is informational.
pub const DEFAULT_API_VERSION: &str = "2006-03-01";

const DEFAULT_CACHE_DIRECTORY: &str = "cache";
const DEFAULT_CACHE_LIFETIME_SECS: u64 = 3600;

/// Construction-time configuration for [`S3Storage`](crate::S3Storage).
///
/// Immutable once the manager is built, except for the bucket, which can be
/// redirected via [`S3Storage::set_bucket`](crate::S3Storage::set_bucket).
/// `Display` is the credential-free form for logging; `Debug` prints every
/// field.
#[derive(Debug)]
pub struct StorageConfig {
    pub region: String,
    pub endpoint: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket: String,
    pub api_version: String,
    pub cache_directory: String,
    pub cache_lifetime: Duration,
}

impl StorageConfig {
    pub fn new(
        region: impl Into<String>,
        endpoint: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            region: region.into(),
            endpoint: endpoint.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            bucket: bucket.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
            cache_directory: DEFAULT_CACHE_DIRECTORY.to_string(),
            cache_lifetime: Duration::from_secs(DEFAULT_CACHE_LIFETIME_SECS),
        }
    }

    pub fn from_env(vars: &HashMap<String, String>) -> Result<Self> {
        let config = Self {
            region: required(vars, "S3_REGION")?,
            endpoint: required(vars, "S3_ENDPOINT")?,
            access_key_id: required(vars, "S3_ACCESS_KEY_ID")?,
            secret_access_key: required(vars, "S3_SECRET_ACCESS_KEY")?,
            bucket: required(vars, "S3_BUCKET")?,
            api_version: vars
                .get("S3_API_VERSION")
                .cloned()
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            cache_directory: vars
                .get("CACHE_DIRECTORY")
                .cloned()
                .unwrap_or_else(|| DEFAULT_CACHE_DIRECTORY.to_string()),
            cache_lifetime: match vars.get("CACHE_LIFETIME_SECONDS") {
                None => Duration::from_secs(DEFAULT_CACHE_LIFETIME_SECS),
                Some(raw) => Duration::from_secs(raw.parse().map_err(|_| {
                    StorageError::Configuration(format!("invalid CACHE_LIFETIME_SECONDS: {raw}"))
                })?),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Rejects empty required values and a zero cache lifetime, before any
    /// store or client is created.
    pub fn validate(&self) -> Result<()> {
        let required_values = [
            ("region", &self.region),
            ("endpoint", &self.endpoint),
            ("access_key_id", &self.access_key_id),
            ("secret_access_key", &self.secret_access_key),
            ("bucket", &self.bucket),
        ];

        for (name, value) in required_values {
            if value.is_empty() {
                return Err(StorageError::Configuration(format!("{name} is required")));
            }
        }

        if self.cache_lifetime.is_zero() {
            return Err(StorageError::Configuration(
                "cache_lifetime must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

fn required(vars: &HashMap<String, String>, name: &str) -> Result<String> {
    vars.get(name)
        .filter(|value| !value.is_empty())
        .cloned()
        .ok_or_else(|| StorageError::Configuration(format!("{name} is required")))
}

impl Display for StorageConfig {
    // Credentials are deliberately left out.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "StorageConfig{{ region: {}, endpoint: {}, bucket: {}, api_version: {}, \
             cache_directory: {}, cache_lifetime: {:?} }}",
            self.region,
            self.endpoint,
            self.bucket,
            self.api_version,
            self.cache_directory,
            self.cache_lifetime,
        )
    }
}
