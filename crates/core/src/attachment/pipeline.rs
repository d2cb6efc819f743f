//! Validate → hash → dedup probe → (transform) → write → catalog.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use super::catalog::AttachmentCatalog;
use super::error::AttachmentError;
use super::payload::DataPayload;
use super::policy::{UploadPolicy, extension_from_name};
use super::types::{
    Attachment, AttachmentKind, AttachmentUpdate, Base64UploadInput, CropInput, Extra,
    NewAttachment, UploadInput, UploadResult,
};
use crate::storage::StorageBackend;
use crate::transform::{self, TransformStage};

/// Storage-facing fields shared by inserts, updates and responses.
#[derive(Debug, Clone)]
struct StoredFields {
    name: String,
    size: u64,
    extension: String,
    path: String,
    url: String,
    hash: String,
    extra: Extra,
}

/// Ingestion pipeline for one upload surface.
///
/// Backend writes always precede the catalog write of the same request, so a
/// failure in between leaves at worst an orphaned object, never a dangling row.
pub struct IngestionPipeline<C: AttachmentCatalog, B: StorageBackend> {
    catalog: Arc<C>,
    backend: Arc<B>,
    policy: UploadPolicy,
}

impl<C: AttachmentCatalog, B: StorageBackend> IngestionPipeline<C, B> {
    /// Create a new pipeline.
    #[must_use]
    pub fn new(catalog: Arc<C>, backend: Arc<B>, policy: UploadPolicy) -> Self {
        Self {
            catalog,
            backend,
            policy,
        }
    }

    /// Ingest a direct upload.
    ///
    /// Identical bytes already stored on the active backend are not written
    /// again; the caller gets a new catalog row pointing at the existing object.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The payload breaks a size, type or dimension limit (nothing is written)
    /// - The declared content type names another image format than the bytes
    /// - The payload is not a decodable image
    /// - The backend write or a catalog operation fails
    pub async fn handle(&self, input: UploadInput) -> Result<UploadResult, AttachmentError> {
        self.policy.check_size(input.bytes.len() as u64)?;
        if let Some(ext) = input.name.as_deref().and_then(extension_from_name) {
            self.policy.check_extension(&ext)?;
        }

        let probe = transform::probe(&input.bytes)?;
        self.policy.check_extension(probe.extension())?;
        if let Some(declared) = input.content_type.as_deref()
            && probe.matches_content_type(declared) == Some(false)
        {
            return Err(AttachmentError::ContentTypeMismatch {
                declared: declared.to_string(),
                detected: probe.content_type(),
            });
        }
        self.policy.check_dimensions(&probe)?;

        let hash = self.backend.hash(&input.bytes);
        let driver = self.backend.driver();

        if let Some(existing) = self.catalog.find_by_hash(&hash, driver).await? {
            let fields = StoredFields {
                name: existing.name,
                size: existing.size,
                extension: existing.extension,
                path: existing.path,
                url: existing.url,
                hash,
                extra: existing.extra,
            };
            let id = self
                .catalog
                .insert(new_record(&input, driver, fields.clone()))
                .await?;

            info!(
                attachment_id = id,
                source_attachment_id = existing.id,
                owner_id = input.owner_id,
                hash = %fields.hash,
                "upload deduplicated"
            );
            return Ok(self.respond(id, fields));
        }

        let key = self.policy.object_key(&hash, probe.extension());
        let stored = self.backend.write(&input.bytes, &key).await?;

        let fields = StoredFields {
            name: input
                .name
                .clone()
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| format!("{hash}.{}", stored.extension)),
            size: stored.size,
            extension: stored.extension,
            path: stored.path,
            url: stored.url,
            hash: stored.content_hash,
            extra: image_extra(probe.width, probe.height),
        };
        let id = self
            .catalog
            .insert(new_record(&input, driver, fields.clone()))
            .await?;

        info!(
            attachment_id = id,
            owner_id = input.owner_id,
            driver,
            storage_key = %fields.path,
            size = fields.size,
            "upload stored"
        );
        Ok(self.respond(id, fields))
    }

    /// Decode a `<mime-marker>,<base64>` body and ingest it as a direct upload.
    ///
    /// # Errors
    ///
    /// Returns [`AttachmentError::MalformedPayload`] or [`AttachmentError::Decode`]
    /// for a bad body, otherwise the errors of [`IngestionPipeline::handle`].
    pub async fn handle_base64(
        &self,
        input: Base64UploadInput,
    ) -> Result<UploadResult, AttachmentError> {
        let payload = DataPayload::parse(&input.file)?;
        debug!(
            owner_id = input.owner_id,
            mime = ?payload.mime,
            size = payload.bytes.len(),
            "base64 payload decoded"
        );

        self.handle(UploadInput {
            bytes: payload.bytes,
            name: input.name,
            content_type: payload.mime,
            owner_id: input.owner_id,
            source: input.source,
            category_id: input.category_id,
        })
        .await
    }

    /// Replace the bytes of an existing attachment with a cropped image.
    ///
    /// The row keeps its id, owner and name. A submitted image that already
    /// fits the effective limits and is stored byte for byte is reused as is.
    /// Otherwise the image is clamped and re-encoded, and the digest of the
    /// re-encoded bytes drives the second dedup probe, the object key and the
    /// row's hash.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The attachment does not exist
    /// - The payload is malformed or cannot be decoded
    /// - The backend write or a catalog operation fails
    pub async fn crop(&self, input: CropInput) -> Result<UploadResult, AttachmentError> {
        let attachment = self
            .catalog
            .find_by_id(input.attachment_id)
            .await?
            .ok_or_else(|| AttachmentError::not_found(input.attachment_id))?;

        let payload = DataPayload::parse(&input.file)?;
        self.policy.check_size(payload.bytes.len() as u64)?;

        let limits = self.policy.limits().with_overrides(
            input.limit_width.as_deref(),
            input.limit_height.as_deref(),
        );
        let probe = transform::probe(&payload.bytes)?;
        self.policy.check_extension(probe.extension())?;

        let driver = self.backend.driver();

        if limits.fits(probe.width, probe.height) {
            let submitted_hash = self.backend.hash(&payload.bytes);
            if let Some(existing) = self.catalog.find_by_hash(&submitted_hash, driver).await? {
                return self.reuse_for_crop(attachment, existing, input.owner_id).await;
            }
        }

        let stage = TransformStage::new(limits);
        let bytes = payload.bytes;
        let image = tokio::task::spawn_blocking(move || stage.apply(&bytes))
            .await
            .map_err(|e| AttachmentError::decode(format!("image transform aborted: {e}")))??;
        self.policy.check_extension(image.extension())?;

        let hash = self.backend.hash(&image.bytes);
        if let Some(existing) = self.catalog.find_by_hash(&hash, driver).await? {
            return self.reuse_for_crop(attachment, existing, input.owner_id).await;
        }

        let key = self.policy.object_key(&hash, image.extension());
        let stored = self.backend.write(&image.bytes, &key).await?;

        let fields = StoredFields {
            name: attachment.name,
            size: stored.size,
            extension: stored.extension,
            path: stored.path,
            url: stored.url,
            hash: stored.content_hash,
            extra: image_extra(image.width, image.height),
        };
        self.catalog
            .update_by_id(attachment.id, update_record(driver, fields.clone()))
            .await?;

        info!(
            attachment_id = attachment.id,
            owner_id = input.owner_id,
            width = image.width,
            height = image.height,
            storage_key = %fields.path,
            "crop stored"
        );
        Ok(self.respond(attachment.id, fields))
    }

    /// Point `attachment` at an object already in the catalog, without writing.
    async fn reuse_for_crop(
        &self,
        attachment: Attachment,
        existing: Attachment,
        owner_id: i64,
    ) -> Result<UploadResult, AttachmentError> {
        let fields = StoredFields {
            name: attachment.name,
            size: existing.size,
            extension: existing.extension,
            path: existing.path,
            url: existing.url,
            hash: existing.hash,
            extra: existing.extra,
        };
        self.catalog
            .update_by_id(
                attachment.id,
                update_record(self.backend.driver(), fields.clone()),
            )
            .await?;

        info!(
            attachment_id = attachment.id,
            source_attachment_id = existing.id,
            owner_id,
            "crop deduplicated"
        );
        Ok(self.respond(attachment.id, fields))
    }

    fn respond(&self, id: i64, fields: StoredFields) -> UploadResult {
        let url = if self.backend.requires_url_rewrite() {
            self.backend.resolve_url(&fields.path)
        } else {
            fields.url
        };
        UploadResult {
            id,
            content_type: transform::content_type_for_extension(&fields.extension).to_string(),
            name: fields.name,
            path: fields.path,
            url,
            hash: fields.hash,
            size: fields.size,
            extension: fields.extension,
            extra: fields.extra,
        }
    }
}

fn new_record(input: &UploadInput, driver: &str, fields: StoredFields) -> NewAttachment {
    NewAttachment {
        owner_id: input.owner_id,
        category_id: input.category_id,
        source: input.source,
        kind: AttachmentKind::Image,
        name: fields.name,
        size: fields.size,
        extension: fields.extension,
        path: fields.path,
        url: fields.url,
        hash: fields.hash,
        driver: driver.to_string(),
        extra: fields.extra,
    }
}

fn update_record(driver: &str, fields: StoredFields) -> AttachmentUpdate {
    AttachmentUpdate {
        name: fields.name,
        size: fields.size,
        extension: fields.extension,
        path: fields.path,
        url: fields.url,
        hash: fields.hash,
        driver: driver.to_string(),
        extra: fields.extra,
    }
}

fn image_extra(width: u32, height: u32) -> Extra {
    let mut extra = Extra::new();
    extra.insert("width".to_string(), Value::from(width));
    extra.insert("height".to_string(), Value::from(height));
    extra
}
