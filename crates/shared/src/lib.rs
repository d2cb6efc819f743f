//! Shared types, errors, and configuration for Mediahub.
//!
//! This crate provides common types used across all other crates:
//! - Pagination types for the upload listing endpoint
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::{
    AppConfig, LocalStorageSettings, OssSettings, S3Settings, StorageSettings, SurfaceSettings,
    UploadSettings,
};
pub use error::{AppError, AppResult};
