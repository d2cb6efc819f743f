//! Object-storage backends (OSS, S3-compatible).

use opendal::Operator;

use super::backend::{StorageBackend, StoredObjectInfo, join_url, object_info, put_if_absent};
use super::error::StorageError;

/// Backend whose objects are directly addressable under a public URL.
#[derive(Debug, Clone)]
pub struct RemoteBackend {
    operator: Operator,
    driver: &'static str,
    public_url: String,
}

impl RemoteBackend {
    /// Wrap an operator already pointed at the bucket.
    #[must_use]
    pub fn new(operator: Operator, driver: &'static str, public_url: impl Into<String>) -> Self {
        Self {
            operator,
            driver,
            public_url: public_url.into(),
        }
    }
}

impl StorageBackend for RemoteBackend {
    fn driver(&self) -> &'static str {
        self.driver
    }

    async fn write(&self, bytes: &[u8], target_path: &str) -> Result<StoredObjectInfo, StorageError> {
        put_if_absent(&self.operator, target_path, bytes).await?;
        Ok(object_info(target_path, self.resolve_url(target_path), bytes))
    }

    fn resolve_url(&self, stored_path: &str) -> String {
        join_url(&self.public_url, stored_path)
    }
}
