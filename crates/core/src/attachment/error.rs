//! Attachment error types.

use mediahub_shared::AppError;
use thiserror::Error;

use crate::storage::StorageError;
use crate::transform::TransformError;

/// Attachment operation errors.
#[derive(Debug, Error)]
pub enum AttachmentError {
    /// Attachment not found.
    #[error("attachment not found: {0}")]
    NotFound(i64),

    /// File too large.
    #[error("file too large: {size} bytes exceeds maximum {max} bytes")]
    FileTooLarge {
        /// Actual file size.
        size: u64,
        /// Maximum allowed size.
        max: u64,
    },

    /// Extension not in the surface's allow-list.
    #[error("file type '{0}' is not allowed")]
    ExtensionNotAllowed(String),

    /// Image dimensions exceed the surface's ceiling.
    #[error("image {width}x{height} exceeds the allowed dimensions")]
    ImageTooLarge {
        /// Actual width.
        width: u32,
        /// Actual height.
        height: u32,
    },

    /// Declared content type names a different image format than the bytes.
    #[error("declared content type '{declared}' does not match detected '{detected}'")]
    ContentTypeMismatch {
        /// Type sent by the client.
        declared: String,
        /// Type sniffed from the content.
        detected: &'static str,
    },

    /// Payload is not a `<mime-marker>,<base64>` pair.
    #[error("malformed payload: expected `<mime-marker>,<base64>`")]
    MalformedPayload,

    /// Base64 or image decoding failed.
    #[error("decode failed: {0}")]
    Decode(String),

    /// Storage operation failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Repository operation failed.
    #[error("repository error: {0}")]
    Repository(String),
}

impl AttachmentError {
    /// Create a not found error.
    #[must_use]
    pub fn not_found(id: i64) -> Self {
        Self::NotFound(id)
    }

    /// Create a file too large error.
    #[must_use]
    pub fn file_too_large(size: u64, max: u64) -> Self {
        Self::FileTooLarge { size, max }
    }

    /// Create a decode error.
    #[must_use]
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a repository error.
    #[must_use]
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }
}

impl From<TransformError> for AttachmentError {
    fn from(err: TransformError) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<AttachmentError> for AppError {
    fn from(err: AttachmentError) -> Self {
        let message = err.to_string();
        match err {
            AttachmentError::NotFound(_) => Self::NotFound(message),
            AttachmentError::FileTooLarge { .. }
            | AttachmentError::ExtensionNotAllowed(_)
            | AttachmentError::ImageTooLarge { .. }
            | AttachmentError::ContentTypeMismatch { .. }
            | AttachmentError::MalformedPayload => Self::Validation(message),
            AttachmentError::Decode(_) => Self::Decode(message),
            AttachmentError::Storage(_) => Self::Storage(message),
            AttachmentError::Repository(_) => Self::Database(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_mapping() {
        let app: AppError = AttachmentError::MalformedPayload.into();
        assert_eq!(app.status_code(), 400);

        let app: AppError = AttachmentError::not_found(7).into();
        assert_eq!(app.error_code(), "NOT_FOUND");
        assert_eq!(app.message(), "attachment not found: 7");

        let app: AppError = AttachmentError::decode("bad base64").into();
        assert_eq!(app.error_code(), "DECODE_ERROR");

        let app: AppError = AttachmentError::from(StorageError::operation("disk full")).into();
        assert_eq!(app.error_code(), "STORAGE_ERROR");
    }

    #[test]
    fn test_content_type_mismatch_is_validation() {
        let app: AppError = AttachmentError::ContentTypeMismatch {
            declared: "image/jpeg".into(),
            detected: "image/png",
        }
        .into();
        assert_eq!(app.status_code(), 400);
    }
}
