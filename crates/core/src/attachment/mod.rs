//! Attachment ingestion and catalog management.
//!
//! This module provides the business logic for media attachments:
//! - Upload validation against per-surface limits
//! - Content-hash deduplication before any storage write
//! - Base64 and crop payload decoding
//! - Listing and soft deletion

mod catalog;
mod error;
mod payload;
mod pipeline;
mod policy;
mod service;
mod types;


pub use catalog::AttachmentCatalog;
pub use error::AttachmentError;
pub use payload::DataPayload;
pub use pipeline::IngestionPipeline;
pub use policy::{UploadPolicy, extension_from_name};
pub use service::{AttachmentListing, AttachmentService};
pub use types::{
    Attachment, AttachmentCategory, AttachmentKind, AttachmentSearch, AttachmentSource,
    AttachmentStatus, AttachmentUpdate, Base64UploadInput, CropInput, Extra, NewAttachment,
    UploadInput, UploadResult,
};
