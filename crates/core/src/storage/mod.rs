//! Content-addressed storage over Apache OpenDAL.
//!
//! Three backends share one capability set ([`StorageBackend`]):
//! - Local filesystem served as a static root (URLs rewritten at read time)
//! - Aliyun OSS
//! - S3-compatible: MinIO, Cloudflare R2, AWS S3
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        StorageBackend                           │
//! │        write(bytes, key) · resolve_url(key) · hash(bytes)       │
//! ├───────────────────┬─────────────────────┬───────────────────────┤
//! │   LocalBackend    │   RemoteBackend     │   RemoteBackend       │
//! │   services::Fs    │   services::Oss     │   services::S3        │
//! └───────────────────┴─────────────────────┴───────────────────────┘
//! ```

mod backend;
mod config;
mod error;
mod hasher;
mod local;
mod remote;

pub use backend::{Backend, StorageBackend, StoredObjectInfo};
pub use config::StorageProvider;
pub use error::StorageError;
pub use hasher::ContentHasher;
pub use local::LocalBackend;
pub use remote::RemoteBackend;
