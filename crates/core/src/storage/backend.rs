//! The storage capability set and the configured backend.

use std::future::Future;

use opendal::{ErrorKind, Operator, services};
use tracing::{debug, warn};

use super::config::StorageProvider;
use super::error::StorageError;
use super::hasher::ContentHasher;
use super::local::LocalBackend;
use super::remote::RemoteBackend;

/// What a backend reports about an object after `write`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObjectInfo {
    /// Backend-relative key.
    pub path: String,
    /// URL as known at write time. Not servable for the local backend.
    pub url: String,
    /// Byte length of the stored payload.
    pub size: u64,
    /// Extension taken from the key.
    pub extension: String,
    /// Digest of the stored bytes.
    pub content_hash: String,
}

/// Uniform write / resolve / hash capability set.
pub trait StorageBackend: Send + Sync {
    /// Driver name recorded on catalog rows (`local`, `oss`, `s3`).
    fn driver(&self) -> &'static str;

    /// Persist `bytes` at `target_path`.
    ///
    /// An object already present at `target_path` with identical bytes is left untouched,
    /// so retries and racing duplicates of a content-addressed key write at most once.
    fn write(
        &self,
        bytes: &[u8],
        target_path: &str,
    ) -> impl Future<Output = Result<StoredObjectInfo, StorageError>> + Send;

    /// Externally resolvable URL for a stored key.
    fn resolve_url(&self, stored_path: &str) -> String;

    /// Whether URLs handed back to callers must go through [`StorageBackend::resolve_url`].
    fn requires_url_rewrite(&self) -> bool {
        false
    }

    /// Digest of `bytes`, identical across backends.
    fn hash(&self, bytes: &[u8]) -> String {
        ContentHasher::digest(bytes)
    }
}

/// The backend selected by configuration.
pub enum Backend {
    /// Local filesystem.
    Local(LocalBackend),
    /// Aliyun OSS.
    Oss(RemoteBackend),
    /// S3-compatible storage.
    S3(RemoteBackend),
}

impl Backend {
    /// Build the backend for a provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the OpenDAL operator cannot be initialized.
    pub fn from_provider(provider: &StorageProvider) -> Result<Self, StorageError> {
        match provider {
            StorageProvider::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
                public_url,
            } => {
                let builder = services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);

                let operator = Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish();
                Ok(Self::S3(RemoteBackend::new(operator, "s3", public_url)))
            }
            StorageProvider::Oss {
                endpoint,
                bucket,
                access_key_id,
                access_key_secret,
                public_url,
            } => {
                let builder = services::Oss::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .access_key_secret(access_key_secret);

                let operator = Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish();
                Ok(Self::Oss(RemoteBackend::new(operator, "oss", public_url)))
            }
            StorageProvider::LocalFs { root, public_url } => {
                LocalBackend::new(root, public_url).map(Self::Local)
            }
        }
    }
}

impl StorageBackend for Backend {
    fn driver(&self) -> &'static str {
        match self {
            Self::Local(b) => b.driver(),
            Self::Oss(b) | Self::S3(b) => b.driver(),
        }
    }

    async fn write(&self, bytes: &[u8], target_path: &str) -> Result<StoredObjectInfo, StorageError> {
        match self {
            Self::Local(b) => b.write(bytes, target_path).await,
            Self::Oss(b) | Self::S3(b) => b.write(bytes, target_path).await,
        }
    }

    fn resolve_url(&self, stored_path: &str) -> String {
        match self {
            Self::Local(b) => b.resolve_url(stored_path),
            Self::Oss(b) | Self::S3(b) => b.resolve_url(stored_path),
        }
    }

    fn requires_url_rewrite(&self) -> bool {
        match self {
            Self::Local(b) => b.requires_url_rewrite(),
            Self::Oss(b) | Self::S3(b) => b.requires_url_rewrite(),
        }
    }
}

/// Write `bytes` unless the same bytes already sit at `key`.
///
/// An object of equal length is read back and compared; anything else at
/// the key is overwritten, so a key never keeps stale content.
///
/// Returns whether bytes were actually sent to the backend.
pub(crate) async fn put_if_absent(
    operator: &Operator,
    key: &str,
    bytes: &[u8],
) -> Result<bool, StorageError> {
    validate_key(key)?;

    match operator.stat(key).await {
        Ok(meta) if meta.content_length() == bytes.len() as u64 => {
            if operator.read(key).await?.to_vec() == bytes {
                debug!(storage_key = %key, "object already stored, skipping write");
                return Ok(false);
            }
            warn!(storage_key = %key, "stored object differs from payload, overwriting");
        }
        Ok(_) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    operator.write(key, bytes.to_vec()).await?;
    debug!(storage_key = %key, size = bytes.len(), "object written");
    Ok(true)
}

/// Build the info record for an object written at `key`.
pub(crate) fn object_info(key: &str, url: String, bytes: &[u8]) -> StoredObjectInfo {
    StoredObjectInfo {
        path: key.to_string(),
        url,
        size: bytes.len() as u64,
        extension: extension_of(key),
        content_hash: ContentHasher::digest(bytes),
    }
}

/// Join a public URL prefix and a key.
pub(crate) fn join_url(base: &str, key: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        key.trim_start_matches('/')
    )
}

fn extension_of(key: &str) -> String {
    key.rsplit_once('/')
        .map_or(key, |(_, file)| file)
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default()
}

fn validate_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty() || key.ends_with('/') {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    if key.split('/').any(|segment| segment == "..") {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}
