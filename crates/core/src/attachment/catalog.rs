//! Persistence seam for attachment metadata.

use std::future::Future;

use super::error::AttachmentError;
use super::types::{
    Attachment, AttachmentCategory, AttachmentSearch, AttachmentUpdate, NewAttachment,
};

/// Repository trait for the attachment catalog.
///
/// This trait is implemented by the db crate to provide actual database operations.
/// Catalog writes are never in a transaction with backend writes; callers
/// order them write-then-catalog.
pub trait AttachmentCatalog: Send + Sync {
    /// Find an active row holding `hash` on `driver`.
    ///
    /// Several rows may share a hash (one per owner); any one of them is returned.
    fn find_by_hash(
        &self,
        hash: &str,
        driver: &str,
    ) -> impl Future<Output = Result<Option<Attachment>, AttachmentError>> + Send;

    /// Find an active row by id.
    fn find_by_id(
        &self,
        id: i64,
    ) -> impl Future<Output = Result<Option<Attachment>, AttachmentError>> + Send;

    /// Insert an active row and return its id.
    fn insert(
        &self,
        record: NewAttachment,
    ) -> impl Future<Output = Result<i64, AttachmentError>> + Send;

    /// Replace the storage fields of row `id`.
    fn update_by_id(
        &self,
        id: i64,
        update: AttachmentUpdate,
    ) -> impl Future<Output = Result<(), AttachmentError>> + Send;

    /// Paginated listing of active rows.
    fn list_by_search(
        &self,
        search: AttachmentSearch,
    ) -> impl Future<Output = Result<(Vec<Attachment>, u64), AttachmentError>> + Send;

    /// Soft-delete row `id`. Returns false if no active row matched.
    fn delete_by_id(&self, id: i64) -> impl Future<Output = Result<bool, AttachmentError>> + Send;

    /// Categories owned by `owner_id`, in display order.
    fn list_categories(
        &self,
        owner_id: i64,
    ) -> impl Future<Output = Result<Vec<AttachmentCategory>, AttachmentError>> + Send;
}
