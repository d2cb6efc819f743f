//! `SeaORM` entity definitions.

pub mod prelude;

pub mod attachment_categories;
pub mod attachments;
