//! Attachment catalog tables.
//!
//! Built with the schema builder so the same migration runs on PostgreSQL
//! and on SQLite.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Attachments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Attachments::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Attachments::OwnerId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Attachments::CategoryId)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Attachments::Source)
                            .string_len(16)
                            .not_null()
                            .default("ADMIN"),
                    )
                    .col(
                        ColumnDef::new(Attachments::Kind)
                            .string_len(16)
                            .not_null()
                            .default("IMAGE"),
                    )
                    .col(ColumnDef::new(Attachments::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Attachments::Size).big_integer().not_null())
                    .col(ColumnDef::new(Attachments::Extension).string_len(32).not_null())
                    .col(ColumnDef::new(Attachments::Path).string_len(1024).not_null())
                    .col(ColumnDef::new(Attachments::Url).string_len(2048).not_null())
                    .col(ColumnDef::new(Attachments::Hash).string_len(64).not_null())
                    .col(ColumnDef::new(Attachments::Driver).string_len(16).not_null())
                    .col(ColumnDef::new(Attachments::Extra).text().not_null())
                    .col(
                        ColumnDef::new(Attachments::Status)
                            .small_integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(Attachments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Attachments::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Dedup probe; several ownership rows may share one hash
        manager
            .create_index(
                Index::create()
                    .name("idx_attachments_hash")
                    .table(Attachments::Table)
                    .col(Attachments::Hash)
                    .col(Attachments::Driver)
                    .to_owned(),
            )
            .await?;

        // Listing
        manager
            .create_index(
                Index::create()
                    .name("idx_attachments_owner_created")
                    .table(Attachments::Table)
                    .col(Attachments::OwnerId)
                    .col(Attachments::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AttachmentCategories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AttachmentCategories::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AttachmentCategories::OwnerId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AttachmentCategories::Title)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AttachmentCategories::Sort)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(AttachmentCategories::Description)
                            .string_len(1024)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(AttachmentCategories::Status)
                            .small_integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(AttachmentCategories::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AttachmentCategories::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_attachment_categories_owner")
                    .table(AttachmentCategories::Table)
                    .col(AttachmentCategories::OwnerId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(AttachmentCategories::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(Attachments::Table).if_exists().to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Attachments {
    Table,
    Id,
    OwnerId,
    CategoryId,
    Source,
    Kind,
    Name,
    Size,
    Extension,
    Path,
    Url,
    Hash,
    Driver,
    Extra,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum AttachmentCategories {
    Table,
    Id,
    OwnerId,
    Title,
    Sort,
    Description,
    Status,
    CreatedAt,
    UpdatedAt,
}
