//! Calling principal, as forwarded by the fronting auth layer.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};

use crate::response::failure;
use mediahub_shared::AppError;

/// Header carrying the authenticated admin id.
pub const ADMIN_ID_HEADER: &str = "x-admin-id";

/// Extractor for the authenticated admin.
///
/// Use this in handlers to get the caller's id:
///
/// ```ignore
/// async fn handler(admin: AdminPrincipal) -> impl IntoResponse {
///     let owner_id = admin.id();
///     // ...
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminPrincipal(pub i64);

impl AdminPrincipal {
    /// Returns the admin id.
    #[must_use]
    pub const fn id(&self) -> i64 {
        self.0
    }
}

/// Rejection for a missing or malformed principal header.
#[derive(Debug)]
pub struct PrincipalRejection(&'static str);

impl IntoResponse for PrincipalRejection {
    fn into_response(self) -> Response {
        failure(&AppError::Unauthorized(self.0.to_string()))
    }
}

impl<S> FromRequestParts<S> for AdminPrincipal
where
    S: Send + Sync,
{
    type Rejection = PrincipalRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(ADMIN_ID_HEADER)
            .ok_or(PrincipalRejection("Authentication required"))?;

        raw.to_str()
            .ok()
            .and_then(|value| value.trim().parse::<i64>().ok())
            .filter(|id| *id > 0)
            .map(AdminPrincipal)
            .ok_or(PrincipalRejection("Invalid admin identity"))
    }
}
