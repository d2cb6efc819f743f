//! Entity re-exports.

pub use super::attachment_categories::Entity as AttachmentCategories;
pub use super::attachments::Entity as Attachments;
