//! Attachment repository for database operations.
//!
//! Implements the attachment catalog using SeaORM.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use tracing::warn;

use crate::entities::{attachment_categories, attachments};
use mediahub_core::attachment::{
    Attachment, AttachmentCatalog, AttachmentCategory, AttachmentError, AttachmentKind,
    AttachmentSearch, AttachmentSource, AttachmentStatus, AttachmentUpdate, Extra, NewAttachment,
};

const ACTIVE: i16 = AttachmentStatus::Active.as_i16();
const DELETED: i16 = AttachmentStatus::Deleted.as_i16();

/// Attachment repository implementation.
#[derive(Debug, Clone)]
pub struct AttachmentRepository {
    db: DatabaseConnection,
}

impl AttachmentRepository {
    /// Create a new attachment repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl AttachmentCatalog for AttachmentRepository {
    async fn find_by_hash(
        &self,
        hash: &str,
        driver: &str,
    ) -> Result<Option<Attachment>, AttachmentError> {
        let model = attachments::Entity::find()
            .filter(attachments::Column::Hash.eq(hash))
            .filter(attachments::Column::Driver.eq(driver))
            .filter(attachments::Column::Status.eq(ACTIVE))
            .order_by_asc(attachments::Column::Id)
            .one(&self.db)
            .await
            .map_err(repository_error)?;

        Ok(model.map(to_domain))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Attachment>, AttachmentError> {
        let model = attachments::Entity::find_by_id(id)
            .filter(attachments::Column::Status.eq(ACTIVE))
            .one(&self.db)
            .await
            .map_err(repository_error)?;

        Ok(model.map(to_domain))
    }

    async fn insert(&self, record: NewAttachment) -> Result<i64, AttachmentError> {
        let now = Utc::now().into();
        let active_model = attachments::ActiveModel {
            owner_id: Set(record.owner_id),
            category_id: Set(record.category_id),
            source: Set(record.source.as_str().to_string()),
            kind: Set(record.kind.as_str().to_string()),
            name: Set(record.name),
            size: Set(to_db_size(record.size)),
            extension: Set(record.extension),
            path: Set(record.path),
            url: Set(record.url),
            hash: Set(record.hash),
            driver: Set(record.driver),
            extra: Set(encode_extra(&record.extra)?),
            status: Set(ACTIVE),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(repository_error)?;

        Ok(model.id)
    }

    async fn update_by_id(&self, id: i64, update: AttachmentUpdate) -> Result<(), AttachmentError> {
        let result = attachments::ActiveModel {
            id: Set(id),
            name: Set(update.name),
            size: Set(to_db_size(update.size)),
            extension: Set(update.extension),
            path: Set(update.path),
            url: Set(update.url),
            hash: Set(update.hash),
            driver: Set(update.driver),
            extra: Set(encode_extra(&update.extra)?),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        }
        .update(&self.db)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(DbErr::RecordNotUpdated) => Err(AttachmentError::not_found(id)),
            Err(e) => Err(repository_error(e)),
        }
    }

    async fn list_by_search(
        &self,
        search: AttachmentSearch,
    ) -> Result<(Vec<Attachment>, u64), AttachmentError> {
        let mut query = attachments::Entity::find()
            .filter(attachments::Column::OwnerId.eq(search.owner_id))
            .filter(attachments::Column::Kind.eq(search.kind.as_str()))
            .filter(attachments::Column::Status.eq(ACTIVE));

        if let Some(category_id) = search.category_id.filter(|id| *id > 0) {
            query = query.filter(attachments::Column::CategoryId.eq(category_id));
        }
        if let Some(name) = search.name.as_deref().filter(|n| !n.is_empty()) {
            query = query.filter(attachments::Column::Name.contains(name));
        }
        if let Some((start, end)) = search.created_range {
            query = query.filter(
                attachments::Column::CreatedAt.between(start.fixed_offset(), end.fixed_offset()),
            );
        }

        let paginator = query
            .order_by_desc(attachments::Column::CreatedAt)
            .order_by_desc(attachments::Column::Id)
            .paginate(&self.db, search.page.limit().max(1));

        let total = paginator.num_items().await.map_err(repository_error)?;
        let models = paginator
            .fetch_page(search.page.offset() / search.page.limit().max(1))
            .await
            .map_err(repository_error)?;

        Ok((models.into_iter().map(to_domain).collect(), total))
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool, AttachmentError> {
        let result = attachments::Entity::update_many()
            .col_expr(attachments::Column::Status, Expr::value(DELETED))
            .col_expr(
                attachments::Column::UpdatedAt,
                Expr::value(Utc::now().fixed_offset()),
            )
            .filter(attachments::Column::Id.eq(id))
            .filter(attachments::Column::Status.eq(ACTIVE))
            .exec(&self.db)
            .await
            .map_err(repository_error)?;

        Ok(result.rows_affected > 0)
    }

    async fn list_categories(
        &self,
        owner_id: i64,
    ) -> Result<Vec<AttachmentCategory>, AttachmentError> {
        let models = attachment_categories::Entity::find()
            .filter(attachment_categories::Column::OwnerId.eq(owner_id))
            .filter(attachment_categories::Column::Status.eq(ACTIVE))
            .order_by_asc(attachment_categories::Column::Sort)
            .order_by_asc(attachment_categories::Column::Id)
            .all(&self.db)
            .await
            .map_err(repository_error)?;

        Ok(models.into_iter().map(to_domain_category).collect())
    }
}

fn repository_error(e: DbErr) -> AttachmentError {
    AttachmentError::repository(e.to_string())
}

fn to_db_size(size: u64) -> i64 {
    i64::try_from(size).unwrap_or(i64::MAX)
}

fn encode_extra(extra: &Extra) -> Result<String, AttachmentError> {
    serde_json::to_string(extra).map_err(|e| AttachmentError::repository(e.to_string()))
}

fn decode_extra(id: i64, raw: &str) -> Extra {
    if raw.trim().is_empty() {
        return Extra::new();
    }
    serde_json::from_str(raw).unwrap_or_else(|e| {
        warn!(attachment_id = id, error = %e, "unreadable attachment extra, ignoring");
        Extra::new()
    })
}

/// Convert database model to domain model.
fn to_domain(model: attachments::Model) -> Attachment {
    Attachment {
        id: model.id,
        owner_id: model.owner_id,
        category_id: model.category_id,
        source: AttachmentSource::parse(&model.source).unwrap_or_default(),
        kind: AttachmentKind::parse(&model.kind).unwrap_or_default(),
        extra: decode_extra(model.id, &model.extra),
        name: model.name,
        size: u64::try_from(model.size).unwrap_or(0),
        extension: model.extension,
        path: model.path,
        url: model.url,
        hash: model.hash,
        driver: model.driver,
        status: AttachmentStatus::from_i16(model.status).unwrap_or(AttachmentStatus::Deleted),
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

fn to_domain_category(model: attachment_categories::Model) -> AttachmentCategory {
    AttachmentCategory {
        id: model.id,
        owner_id: model.owner_id,
        title: model.title,
        sort: model.sort,
        description: model.description,
    }
}
