//! Attachment types and data structures.

use chrono::{DateTime, Utc};
use mediahub_shared::types::PageRequest;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form backend/transform metadata attached to a record.
pub type Extra = Map<String, Value>;

/// Where an upload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttachmentSource {
    /// Admin console.
    #[default]
    Admin,
    /// Mini-app client.
    Miniapp,
}

impl AttachmentSource {
    /// Convert to database string value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Miniapp => "MINIAPP",
        }
    }

    /// Parse from database string value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ADMIN" => Some(Self::Admin),
            "MINIAPP" => Some(Self::Miniapp),
            _ => None,
        }
    }
}

/// Coarse media type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttachmentKind {
    /// Raster image.
    #[default]
    Image,
    /// Video file.
    Video,
    /// Any other document.
    File,
}

impl AttachmentKind {
    /// Convert to database string value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "IMAGE",
            Self::Video => "VIDEO",
            Self::File => "FILE",
        }
    }

    /// Parse from database string value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "IMAGE" => Some(Self::Image),
            "VIDEO" => Some(Self::Video),
            "FILE" => Some(Self::File),
            _ => None,
        }
    }
}

/// Lifecycle flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AttachmentStatus {
    /// Soft-deleted; bytes are left in the backend.
    Deleted,
    /// Usable.
    #[default]
    Active,
}

impl AttachmentStatus {
    /// Convert to database value.
    #[must_use]
    pub const fn as_i16(self) -> i16 {
        match self {
            Self::Deleted => 0,
            Self::Active => 1,
        }
    }

    /// Parse from database value. Unknown values are reported as `None`.
    #[must_use]
    pub const fn from_i16(value: i16) -> Option<Self> {
        match value {
            0 => Some(Self::Deleted),
            1 => Some(Self::Active),
            _ => None,
        }
    }
}

/// Attachment catalog record.
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    /// Surrogate id, immutable after insert.
    pub id: i64,
    /// Uploading principal.
    pub owner_id: i64,
    /// Category, 0 when uncategorised.
    pub category_id: i64,
    /// Provenance.
    pub source: AttachmentSource,
    /// Media type.
    pub kind: AttachmentKind,
    /// Logical display name.
    pub name: String,
    /// Stored byte length.
    pub size: u64,
    /// Normalized extension.
    pub extension: String,
    /// Backend-relative key.
    pub path: String,
    /// External URL.
    pub url: String,
    /// Content digest (dedup key).
    pub hash: String,
    /// Backend holding the bytes.
    pub driver: String,
    /// Backend/transform metadata.
    pub extra: Extra,
    /// Lifecycle flag.
    pub status: AttachmentStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Input for inserting a catalog row. Rows are always inserted active.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAttachment {
    /// Uploading principal.
    pub owner_id: i64,
    /// Category, 0 when uncategorised.
    pub category_id: i64,
    /// Provenance.
    pub source: AttachmentSource,
    /// Media type.
    pub kind: AttachmentKind,
    /// Logical display name.
    pub name: String,
    /// Stored byte length.
    pub size: u64,
    /// Normalized extension.
    pub extension: String,
    /// Backend-relative key.
    pub path: String,
    /// External URL.
    pub url: String,
    /// Content digest.
    pub hash: String,
    /// Backend holding the bytes.
    pub driver: String,
    /// Backend/transform metadata.
    pub extra: Extra,
}

/// Storage fields replaced when a record's bytes change (crop).
#[derive(Debug, Clone, PartialEq)]
pub struct AttachmentUpdate {
    /// Logical display name.
    pub name: String,
    /// Stored byte length.
    pub size: u64,
    /// Normalized extension.
    pub extension: String,
    /// Backend-relative key.
    pub path: String,
    /// External URL.
    pub url: String,
    /// Content digest.
    pub hash: String,
    /// Backend holding the bytes.
    pub driver: String,
    /// Backend/transform metadata.
    pub extra: Extra,
}

/// Filters for the listing query.
#[derive(Debug, Clone)]
pub struct AttachmentSearch {
    /// Owner whose rows are listed.
    pub owner_id: i64,
    /// Media type.
    pub kind: AttachmentKind,
    /// Category filter, `None` or `Some(0)` for all.
    pub category_id: Option<i64>,
    /// Substring of the display name.
    pub name: Option<String>,
    /// Inclusive creation-time window.
    pub created_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    /// Page to return.
    pub page: PageRequest,
}

/// Attachment category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachmentCategory {
    /// Category id.
    pub id: i64,
    /// Owning principal.
    pub owner_id: i64,
    /// Display title.
    pub title: String,
    /// Sort weight, ascending.
    pub sort: i32,
    /// Description.
    pub description: String,
}

/// Input for a direct (multipart or base64) upload.
#[derive(Debug, Clone)]
pub struct UploadInput {
    /// Raw bytes.
    pub bytes: Vec<u8>,
    /// Client-supplied file name.
    pub name: Option<String>,
    /// Client-supplied content type.
    pub content_type: Option<String>,
    /// Uploading principal.
    pub owner_id: i64,
    /// Provenance.
    pub source: AttachmentSource,
    /// Category, 0 when uncategorised.
    pub category_id: i64,
}

/// Input for a base64 upload.
#[derive(Debug, Clone)]
pub struct Base64UploadInput {
    /// `<mime-marker>,<base64>` payload.
    pub file: String,
    /// Client-supplied file name.
    pub name: Option<String>,
    /// Uploading principal.
    pub owner_id: i64,
    /// Provenance.
    pub source: AttachmentSource,
    /// Category, 0 when uncategorised.
    pub category_id: i64,
}

/// Input for a crop request.
#[derive(Debug, Clone)]
pub struct CropInput {
    /// Record whose bytes are replaced.
    pub attachment_id: i64,
    /// Principal issuing the crop. Ownership of the record is not changed.
    pub owner_id: i64,
    /// `<mime-marker>,<base64>` payload.
    pub file: String,
    /// Raw `limitW` query value.
    pub limit_width: Option<String>,
    /// Raw `limitH` query value.
    pub limit_height: Option<String>,
}

/// Uniform response for upload and crop.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    /// Catalog id.
    pub id: i64,
    /// Logical display name.
    pub name: String,
    /// Backend-relative key.
    pub path: String,
    /// Servable URL.
    pub url: String,
    /// Content digest.
    pub hash: String,
    /// Stored byte length.
    pub size: u64,
    /// Normalized extension.
    pub extension: String,
    /// MIME type.
    pub content_type: String,
    /// Backend/transform metadata.
    pub extra: Extra,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_roundtrip() {
        for s in [AttachmentSource::Admin, AttachmentSource::Miniapp] {
            assert_eq!(AttachmentSource::parse(s.as_str()), Some(s));
        }
        assert_eq!(AttachmentSource::parse("admin"), None);
    }

    #[test]
    fn test_kind_roundtrip() {
        for k in [
            AttachmentKind::Image,
            AttachmentKind::Video,
            AttachmentKind::File,
        ] {
            assert_eq!(AttachmentKind::parse(k.as_str()), Some(k));
        }
    }

    #[test]
    fn test_status_values() {
        assert_eq!(AttachmentStatus::Active.as_i16(), 1);
        assert_eq!(AttachmentStatus::from_i16(0), Some(AttachmentStatus::Deleted));
        assert_eq!(AttachmentStatus::from_i16(7), None);
    }

    #[test]
    fn test_upload_result_serializes_camel_case() {
        let result = UploadResult {
            id: 1,
            name: "a.png".into(),
            path: "images/ab/ab.png".into(),
            url: "http://localhost/storage/images/ab/ab.png".into(),
            hash: "ab".into(),
            size: 3,
            extension: "png".into(),
            content_type: "image/png".into(),
            extra: Extra::new(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["contentType"], "image/png");
        assert_eq!(json["extension"], "png");
    }
}
