//! Request extractors shared by the admin routes.

pub mod principal;

pub use principal::{ADMIN_ID_HEADER, AdminPrincipal};
