//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Storage backend configuration.
    #[serde(default)]
    pub storage: StorageSettings,
    /// Upload surface limits.
    #[serde(default)]
    pub upload: UploadSettings,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Storage backend selection and per-backend credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Backend selector: `local`, `oss`, or `s3` (alias `minio`).
    #[serde(default = "default_driver")]
    pub driver: String,
    /// Local filesystem settings.
    #[serde(default)]
    pub local: LocalStorageSettings,
    /// Aliyun OSS settings, required when `driver = "oss"`.
    #[serde(default)]
    pub oss: Option<OssSettings>,
    /// S3-compatible settings, required when `driver = "s3"`.
    #[serde(default)]
    pub s3: Option<S3Settings>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            driver: default_driver(),
            local: LocalStorageSettings::default(),
            oss: None,
            s3: None,
        }
    }
}

fn default_driver() -> String {
    "local".to_string()
}

/// Local filesystem storage settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LocalStorageSettings {
    /// Directory served as the static storage root.
    #[serde(default = "default_local_root")]
    pub root: String,
    /// Public URL under which `root` is served.
    #[serde(default = "default_local_public_url")]
    pub public_url: String,
}

impl Default for LocalStorageSettings {
    fn default() -> Self {
        Self {
            root: default_local_root(),
            public_url: default_local_public_url(),
        }
    }
}

fn default_local_root() -> String {
    "./web/app/storage".to_string()
}

fn default_local_public_url() -> String {
    "http://127.0.0.1:8080/storage".to_string()
}

/// Aliyun OSS settings.
#[derive(Debug, Clone, Deserialize)]
pub struct OssSettings {
    /// OSS endpoint, e.g. `https://oss-cn-hangzhou.aliyuncs.com`.
    pub endpoint: String,
    /// Bucket name.
    pub bucket: String,
    /// Access key id.
    pub access_key_id: String,
    /// Access key secret.
    pub access_key_secret: String,
    /// Public URL prefix (CDN or bucket domain). Derived from endpoint and bucket when absent.
    #[serde(default)]
    pub public_url: Option<String>,
}

/// S3-compatible storage settings (MinIO, R2, AWS S3).
#[derive(Debug, Clone, Deserialize)]
pub struct S3Settings {
    /// S3 endpoint URL.
    pub endpoint: String,
    /// Bucket name.
    pub bucket: String,
    /// Access key id.
    pub access_key_id: String,
    /// Secret access key.
    pub secret_access_key: String,
    /// Region.
    #[serde(default = "default_region")]
    pub region: String,
    /// Public URL prefix. Defaults to path-style `{endpoint}/{bucket}`.
    #[serde(default)]
    pub public_url: Option<String>,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

/// Limits for every upload surface.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadSettings {
    /// The image surface.
    #[serde(default)]
    pub image: SurfaceSettings,
}

impl UploadSettings {
    /// Look up a surface by its route resource name.
    #[must_use]
    pub fn surface(&self, resource: &str) -> Option<&SurfaceSettings> {
        match resource {
            "image" | "images" => Some(&self.image),
            _ => None,
        }
    }
}

/// Limits applied to one upload surface.
#[derive(Debug, Clone, Deserialize)]
pub struct SurfaceSettings {
    /// Maximum payload size in bytes.
    #[serde(default = "default_limit_size")]
    pub limit_size: u64,
    /// Allowed file extensions, lowercase without the dot.
    #[serde(default = "default_limit_type")]
    pub limit_type: Vec<String>,
    /// Key prefix under which objects are stored.
    #[serde(default = "default_save_path")]
    pub save_path: String,
    /// Maximum image width in pixels.
    #[serde(default)]
    pub limit_image_width: Option<u32>,
    /// Maximum image height in pixels.
    #[serde(default)]
    pub limit_image_height: Option<u32>,
}

impl Default for SurfaceSettings {
    fn default() -> Self {
        Self {
            limit_size: default_limit_size(),
            limit_type: default_limit_type(),
            save_path: default_save_path(),
            limit_image_width: None,
            limit_image_height: None,
        }
    }
}

fn default_limit_size() -> u64 {
    10 * 1024 * 1024
}

fn default_limit_type() -> Vec<String> {
    ["jpeg", "jpg", "png", "gif", "webp", "bmp"]
        .iter()
        .map(ToString::to_string)
        .collect()
}

fn default_save_path() -> String {
    "images".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("MEDIAHUB")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("upload.image.limit_type")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
