//! Storage configuration types.

use mediahub_shared::StorageSettings;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::error::StorageError;

/// Storage provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageProvider {
    /// S3-compatible storage: MinIO, Cloudflare R2, AWS S3
    S3 {
        /// S3 endpoint URL.
        endpoint: String,
        /// S3 bucket name.
        bucket: String,
        /// Access key ID.
        access_key_id: String,
        /// Secret access key.
        secret_access_key: String,
        /// Region.
        region: String,
        /// Public URL prefix for stored objects.
        public_url: String,
    },
    /// Aliyun OSS object storage
    Oss {
        /// OSS endpoint URL.
        endpoint: String,
        /// OSS bucket name.
        bucket: String,
        /// Access key ID.
        access_key_id: String,
        /// Access key secret.
        access_key_secret: String,
        /// Public URL prefix for stored objects.
        public_url: String,
    },
    /// Local filesystem served as a static root
    LocalFs {
        /// Root directory path.
        root: PathBuf,
        /// URL under which `root` is served.
        public_url: String,
    },
}

impl StorageProvider {
    /// Create S3-compatible provider with a path-style public URL.
    #[must_use]
    pub fn s3(
        endpoint: impl Into<String>,
        bucket: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        let endpoint = endpoint.into();
        let bucket = bucket.into();
        let public_url = format!("{}/{}", endpoint.trim_end_matches('/'), bucket);
        Self::S3 {
            endpoint,
            bucket,
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            region: region.into(),
            public_url,
        }
    }

    /// Create Aliyun OSS provider with a virtual-host public URL.
    #[must_use]
    pub fn oss(
        endpoint: impl Into<String>,
        bucket: impl Into<String>,
        access_key_id: impl Into<String>,
        access_key_secret: impl Into<String>,
    ) -> Self {
        let endpoint = endpoint.into();
        let bucket = bucket.into();
        let public_url = bucket_host_url(&endpoint, &bucket);
        Self::Oss {
            endpoint,
            bucket,
            access_key_id: access_key_id.into(),
            access_key_secret: access_key_secret.into(),
            public_url,
        }
    }

    /// Create local filesystem provider.
    #[must_use]
    pub fn local_fs(root: impl Into<PathBuf>, public_url: impl Into<String>) -> Self {
        Self::LocalFs {
            root: root.into(),
            public_url: public_url.into(),
        }
    }

    /// Build the provider selected by `settings.driver`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an unknown driver or a missing credentials block.
    pub fn from_settings(settings: &StorageSettings) -> Result<Self, StorageError> {
        match settings.driver.trim().to_ascii_lowercase().as_str() {
            "local" | "" => Ok(Self::local_fs(
                &settings.local.root,
                settings.local.public_url.clone(),
            )),
            "oss" => {
                let oss = settings
                    .oss
                    .as_ref()
                    .ok_or_else(|| StorageError::configuration("driver `oss` needs [storage.oss]"))?;
                let mut provider = Self::oss(
                    &oss.endpoint,
                    &oss.bucket,
                    &oss.access_key_id,
                    &oss.access_key_secret,
                );
                if let (Some(url), Self::Oss { public_url, .. }) = (&oss.public_url, &mut provider) {
                    public_url.clone_from(url);
                }
                Ok(provider)
            }
            "s3" | "minio" => {
                let s3 = settings
                    .s3
                    .as_ref()
                    .ok_or_else(|| StorageError::configuration("driver `s3` needs [storage.s3]"))?;
                let mut provider = Self::s3(
                    &s3.endpoint,
                    &s3.bucket,
                    &s3.access_key_id,
                    &s3.secret_access_key,
                    &s3.region,
                );
                if let (Some(url), Self::S3 { public_url, .. }) = (&s3.public_url, &mut provider) {
                    public_url.clone_from(url);
                }
                Ok(provider)
            }
            other => Err(StorageError::configuration(format!(
                "unknown storage driver `{other}`"
            ))),
        }
    }

    /// Get the provider name recorded on catalog rows.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::S3 { .. } => "s3",
            Self::Oss { .. } => "oss",
            Self::LocalFs { .. } => "local",
        }
    }

    /// Get the public URL prefix.
    #[must_use]
    pub fn public_url(&self) -> &str {
        match self {
            Self::S3 { public_url, .. }
            | Self::Oss { public_url, .. }
            | Self::LocalFs { public_url, .. } => public_url,
        }
    }
}

/// `https://oss-cn-hangzhou.aliyuncs.com` + `media` -> `https://media.oss-cn-hangzhou.aliyuncs.com`
fn bucket_host_url(endpoint: &str, bucket: &str) -> String {
    let endpoint = endpoint.trim_end_matches('/');
    match endpoint.split_once("://") {
        Some((scheme, host)) => format!("{scheme}://{bucket}.{host}"),
        None => format!("https://{bucket}.{endpoint}"),
    }
}
