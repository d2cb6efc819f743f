//! Admin upload routes.
//!
//! Mounted under `/admin/upload/{resource}`, where `{resource}` selects the
//! configured upload surface.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Multipart, Path, Query, State,
        multipart::MultipartRejection,
        rejection::{JsonRejection, QueryRejection},
    },
    response::Response,
    routing::{get, post},
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::{
    AppState,
    middleware::AdminPrincipal,
    response::{failure, success, success_message},
};
use mediahub_core::attachment::{
    Attachment, AttachmentKind, AttachmentSearch, AttachmentService, AttachmentSource,
    Base64UploadInput, CropInput, Extra, IngestionPipeline, UploadInput, UploadPolicy,
};
use mediahub_core::storage::Backend;
use mediahub_db::AttachmentRepository;
use mediahub_shared::{AppError, SurfaceSettings, types::PageRequest};

/// Items per listing page.
const PAGE_SIZE: u32 = 8;

/// Creates the upload routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/upload/{resource}/getList", get(get_list))
        .route(
            "/admin/upload/{resource}/delete",
            post(delete_by_body).get(delete_by_query),
        )
        .route("/admin/upload/{resource}/crop", post(crop))
        .route("/admin/upload/{resource}/handle", post(handle))
        .route("/admin/upload/{resource}/base64Handle", post(base64_handle))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for the listing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    /// Category filter, `0` or empty for all.
    pub category_id: Option<String>,
    /// Name substring.
    pub name: Option<String>,
    /// `YYYY-MM-DD,YYYY-MM-DD`, both ends inclusive.
    pub createtime: Option<String>,
    /// 1-based page.
    pub page: Option<String>,
}

/// Body or query carrying an attachment id.
#[derive(Debug, Deserialize)]
pub struct IdRequest {
    /// Attachment id.
    pub id: i64,
}

/// Crop request body.
#[derive(Debug, Deserialize)]
pub struct CropRequest {
    /// Attachment id.
    pub id: i64,
    /// `<mime-marker>,<base64>` payload.
    pub file: String,
}

/// Per-request crop ceilings.
#[derive(Debug, Default, Deserialize)]
pub struct CropLimits {
    /// Width override.
    #[serde(rename = "limitW")]
    pub limit_w: Option<String>,
    /// Height override.
    #[serde(rename = "limitH")]
    pub limit_h: Option<String>,
}

/// Base64 upload body.
#[derive(Debug, Deserialize)]
pub struct Base64Request {
    /// `<mime-marker>,<base64>` payload.
    pub file: String,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
}

/// Listing row.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentItem {
    /// Attachment id.
    pub id: i64,
    /// Uploading principal.
    pub owner_id: i64,
    /// Category id.
    pub category_id: i64,
    /// Provenance.
    pub source: AttachmentSource,
    /// Media type.
    #[serde(rename = "type")]
    pub kind: AttachmentKind,
    /// Display name.
    pub name: String,
    /// Byte length.
    pub size: u64,
    /// Extension.
    pub extension: String,
    /// Storage key.
    pub path: String,
    /// Servable URL.
    pub url: String,
    /// Content digest.
    pub hash: String,
    /// Metadata.
    pub extra: Extra,
    /// Created at.
    pub created_at: DateTime<Utc>,
    /// Updated at.
    pub updated_at: DateTime<Utc>,
}

impl From<Attachment> for AttachmentItem {
    fn from(a: Attachment) -> Self {
        Self {
            id: a.id,
            owner_id: a.owner_id,
            category_id: a.category_id,
            source: a.source,
            kind: a.kind,
            name: a.name,
            size: a.size,
            extension: a.extension,
            path: a.path,
            url: a.url,
            hash: a.hash,
            extra: a.extra,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Look up the upload surface named by the path.
fn lookup_surface<'a>(
    state: &'a AppState,
    resource: &str,
) -> Result<&'a SurfaceSettings, Response> {
    state.upload.surface(resource).ok_or_else(|| {
        failure(&AppError::NotFound(format!(
            "unknown upload resource: {resource}"
        )))
    })
}

fn pipeline(
    state: &AppState,
    surface: &SurfaceSettings,
) -> IngestionPipeline<AttachmentRepository, Backend> {
    IngestionPipeline::new(
        Arc::new(AttachmentRepository::new((*state.db).clone())),
        Arc::clone(&state.storage),
        UploadPolicy::from_settings(surface),
    )
}

fn service(state: &AppState) -> AttachmentService<AttachmentRepository, Backend> {
    AttachmentService::new(
        Arc::new(AttachmentRepository::new((*state.db).clone())),
        Arc::clone(&state.storage),
    )
}

/// Parse `start,end` dates into an inclusive UTC window.
fn parse_created_range(raw: &str) -> Result<(DateTime<Utc>, DateTime<Utc>), AppError> {
    let invalid = || AppError::Validation(format!("invalid createtime: {raw}"));

    let (start, end) = raw.split_once(',').ok_or_else(invalid)?;
    let start = NaiveDate::parse_from_str(start.trim(), "%Y-%m-%d").map_err(|_| invalid())?;
    let end = NaiveDate::parse_from_str(end.trim(), "%Y-%m-%d").map_err(|_| invalid())?;
    if start > end {
        return Err(invalid());
    }

    let start = start.and_hms_opt(0, 0, 0).ok_or_else(invalid)?.and_utc();
    let end = end
        .and_hms_nano_opt(23, 59, 59, 999_999_999)
        .ok_or_else(invalid)?
        .and_utc();
    Ok((start, end))
}

/// Lenient numeric query value: empty or unparsable means absent.
fn parse_number<T: std::str::FromStr>(raw: Option<&str>) -> Option<T> {
    raw.and_then(|value| value.trim().parse().ok())
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/admin/upload/{resource}/getList`
async fn get_list(
    State(state): State<AppState>,
    admin: AdminPrincipal,
    Path(resource): Path<String>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Response {
    if let Err(response) = lookup_surface(&state, &resource) {
        return response;
    }
    let Query(query) = match query {
        Ok(query) => query,
        Err(e) => return failure(&AppError::Validation(e.body_text())),
    };

    let created_range = match query.createtime.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => match parse_created_range(raw) {
            Ok(range) => Some(range),
            Err(e) => return failure(&e),
        },
        _ => None,
    };

    let search = AttachmentSearch {
        owner_id: admin.id(),
        kind: AttachmentKind::Image,
        category_id: parse_number(query.category_id.as_deref()),
        name: query.name.filter(|name| !name.trim().is_empty()),
        created_range,
        page: PageRequest::new(parse_number(query.page.as_deref()).unwrap_or(1), PAGE_SIZE),
    };

    match service(&state).list(search).await {
        Ok(listing) => {
            let list: Vec<AttachmentItem> =
                listing.list.into_iter().map(AttachmentItem::from).collect();
            success(
                "ok",
                json!({
                    "list": list,
                    "categories": listing.categories,
                    "pagination": listing.pagination
                }),
            )
        }
        Err(e) => failure(&e.into()),
    }
}

/// POST `/admin/upload/{resource}/delete` with `{id}`
async fn delete_by_body(
    State(state): State<AppState>,
    admin: AdminPrincipal,
    Path(resource): Path<String>,
    payload: Result<Json<IdRequest>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(request)) => delete_attachment(&state, admin, &resource, request.id).await,
        Err(e) => failure(&AppError::Validation(e.body_text())),
    }
}

/// GET `/admin/upload/{resource}/delete?id=`
async fn delete_by_query(
    State(state): State<AppState>,
    admin: AdminPrincipal,
    Path(resource): Path<String>,
    query: Result<Query<IdRequest>, QueryRejection>,
) -> Response {
    match query {
        Ok(Query(request)) => delete_attachment(&state, admin, &resource, request.id).await,
        Err(e) => failure(&AppError::Validation(e.body_text())),
    }
}

async fn delete_attachment(
    state: &AppState,
    admin: AdminPrincipal,
    resource: &str,
    id: i64,
) -> Response {
    if let Err(response) = lookup_surface(state, resource) {
        return response;
    }

    match service(state).delete(id).await {
        Ok(()) => {
            info!(attachment_id = id, admin_id = admin.id(), "Attachment deleted");
            success_message("deleted")
        }
        Err(e) => failure(&e.into()),
    }
}

/// POST `/admin/upload/{resource}/crop?limitW=&limitH=` with `{id, file}`
async fn crop(
    State(state): State<AppState>,
    admin: AdminPrincipal,
    Path(resource): Path<String>,
    limits: Result<Query<CropLimits>, QueryRejection>,
    payload: Result<Json<CropRequest>, JsonRejection>,
) -> Response {
    let surface = match lookup_surface(&state, &resource) {
        Ok(surface) => surface,
        Err(response) => return response,
    };
    let limits = limits.map(|Query(limits)| limits).unwrap_or_default();
    let request = match payload {
        Ok(Json(request)) => request,
        Err(e) => return failure(&AppError::Validation(e.body_text())),
    };

    let input = CropInput {
        attachment_id: request.id,
        owner_id: admin.id(),
        file: request.file,
        limit_width: limits.limit_w,
        limit_height: limits.limit_h,
    };

    match pipeline(&state, surface).crop(input).await {
        Ok(result) => success("crop success", result),
        Err(e) => failure(&e.into()),
    }
}

/// POST `/admin/upload/{resource}/handle` (multipart `file`)
async fn handle(
    State(state): State<AppState>,
    admin: AdminPrincipal,
    Path(resource): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let surface = match lookup_surface(&state, &resource) {
        Ok(surface) => surface,
        Err(response) => return response,
    };
    let mut multipart = match multipart {
        Ok(multipart) => multipart,
        Err(e) => return failure(&AppError::Validation(e.body_text())),
    };

    let mut file: Option<(Vec<u8>, Option<String>, Option<String>)> = None;
    let mut category_id = 0;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return failure(&AppError::Validation(e.body_text())),
        };

        match field.name().map(str::to_string).as_deref() {
            Some("file") => {
                let name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                match field.bytes().await {
                    Ok(bytes) => file = Some((bytes.to_vec(), name, content_type)),
                    Err(e) => return failure(&AppError::Validation(e.body_text())),
                }
            }
            Some("categoryId") => {
                category_id = parse_number(field.text().await.ok().as_deref()).unwrap_or(0);
            }
            _ => {}
        }
    }

    let Some((bytes, name, content_type)) = file else {
        return failure(&AppError::Validation("file is required".to_string()));
    };

    let input = UploadInput {
        bytes,
        name,
        content_type,
        owner_id: admin.id(),
        source: AttachmentSource::Admin,
        category_id,
    };

    match pipeline(&state, surface).handle(input).await {
        Ok(result) => success("upload success", result),
        Err(e) => failure(&e.into()),
    }
}

/// POST `/admin/upload/{resource}/base64Handle` with `{file, name?}`
async fn base64_handle(
    State(state): State<AppState>,
    admin: AdminPrincipal,
    Path(resource): Path<String>,
    payload: Result<Json<Base64Request>, JsonRejection>,
) -> Response {
    let surface = match lookup_surface(&state, &resource) {
        Ok(surface) => surface,
        Err(response) => return response,
    };
    let request = match payload {
        Ok(Json(request)) => request,
        Err(e) => return failure(&AppError::Validation(e.body_text())),
    };

    let input = Base64UploadInput {
        file: request.file,
        name: request.name,
        owner_id: admin.id(),
        source: AttachmentSource::Admin,
        category_id: 0,
    };

    match pipeline(&state, surface).handle_base64(input).await {
        Ok(result) => success("upload success", result),
        Err(e) => failure(&e.into()),
    }
}

#[cfg(test)]
mod tests;
