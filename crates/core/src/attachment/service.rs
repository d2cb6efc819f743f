//! Catalog reads and deletes.

use std::sync::Arc;

use mediahub_shared::types::Pagination;
use tracing::info;

use super::catalog::AttachmentCatalog;
use super::error::AttachmentError;
use super::types::{Attachment, AttachmentCategory, AttachmentSearch};
use crate::storage::StorageBackend;

/// One page of attachments plus the owner's categories.
#[derive(Debug, Clone)]
pub struct AttachmentListing {
    /// Attachments on this page, newest first.
    pub list: Vec<Attachment>,
    /// Categories owned by the caller.
    pub categories: Vec<AttachmentCategory>,
    /// Page position.
    pub pagination: Pagination,
}

/// Attachment service for listing and deletion.
pub struct AttachmentService<C: AttachmentCatalog, B: StorageBackend> {
    catalog: Arc<C>,
    backend: Arc<B>,
}

impl<C: AttachmentCatalog, B: StorageBackend> AttachmentService<C, B> {
    /// Create a new attachment service.
    #[must_use]
    pub fn new(catalog: Arc<C>, backend: Arc<B>) -> Self {
        Self { catalog, backend }
    }

    /// List active attachments. Local URLs are resolved against the served root.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog query fails.
    pub async fn list(&self, search: AttachmentSearch) -> Result<AttachmentListing, AttachmentError> {
        let owner_id = search.owner_id;
        let page = search.page;

        let (mut list, total) = self.catalog.list_by_search(search).await?;
        for attachment in &mut list {
            self.rewrite_url(attachment);
        }
        let categories = self.catalog.list_categories(owner_id).await?;

        Ok(AttachmentListing {
            list,
            categories,
            pagination: Pagination::new(page, total),
        })
    }

    /// Soft-delete an attachment. Stored bytes are left in place.
    ///
    /// # Errors
    ///
    /// Returns an error if no active attachment has this id or the update fails.
    pub async fn delete(&self, id: i64) -> Result<(), AttachmentError> {
        if !self.catalog.delete_by_id(id).await? {
            return Err(AttachmentError::not_found(id));
        }
        info!(attachment_id = id, "attachment deleted");
        Ok(())
    }

    fn rewrite_url(&self, attachment: &mut Attachment) {
        if self.backend.requires_url_rewrite() && attachment.driver == self.backend.driver() {
            attachment.url = self.backend.resolve_url(&attachment.path);
        }
    }
}
