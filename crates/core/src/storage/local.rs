//! Local filesystem backend.

use std::path::Path;

use opendal::{Operator, services};

use super::backend::{StorageBackend, StoredObjectInfo, join_url, object_info, put_if_absent};
use super::error::StorageError;

/// Stores objects under a directory served as a static root.
///
/// Write-time URLs are the bare key; callers get a servable URL through
/// [`StorageBackend::resolve_url`], which prefixes the configured public URL.
#[derive(Debug, Clone)]
pub struct LocalBackend {
    operator: Operator,
    public_url: String,
}

impl LocalBackend {
    /// Create a backend rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` is not valid UTF-8 or the operator cannot be built.
    pub fn new(root: &Path, public_url: impl Into<String>) -> Result<Self, StorageError> {
        let builder = services::Fs::default().root(
            root.to_str()
                .ok_or_else(|| StorageError::configuration("invalid path"))?,
        );

        let operator = Operator::new(builder)
            .map_err(|e| StorageError::configuration(e.to_string()))?
            .finish();

        Ok(Self {
            operator,
            public_url: public_url.into(),
        })
    }
}

impl StorageBackend for LocalBackend {
    fn driver(&self) -> &'static str {
        "local"
    }

    async fn write(&self, bytes: &[u8], target_path: &str) -> Result<StoredObjectInfo, StorageError> {
        put_if_absent(&self.operator, target_path, bytes).await?;
        Ok(object_info(target_path, target_path.to_string(), bytes))
    }

    fn resolve_url(&self, stored_path: &str) -> String {
        if stored_path.starts_with("http://") || stored_path.starts_with("https://") {
            return stored_path.to_string();
        }
        join_url(&self.public_url, stored_path)
    }

    fn requires_url_rewrite(&self) -> bool {
        true
    }
}
