//! Route tests over in-memory SQLite and a temporary local storage root.

use std::io::Cursor;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header::CONTENT_TYPE},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use http_body_util::BodyExt;
use image::{ImageFormat, Rgb, RgbImage};
use rstest::rstest;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use serde_json::{Value, json};
use tower::ServiceExt;

use super::parse_created_range;
use crate::{AppState, create_router, middleware::ADMIN_ID_HEADER};
use mediahub_core::storage::{Backend, LocalBackend};
use mediahub_db::migration::Migrator;
use mediahub_shared::UploadSettings;
use mediahub_shared::config::DatabaseConfig;

const BOUNDARY: &str = "mediahub-test-boundary";

struct TestApp {
    router: Router,
    root: tempfile::TempDir,
}

async fn migrated_db() -> DatabaseConnection {
    let db = mediahub_db::connect(&DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
    })
    .await
    .expect("Failed to connect to database");
    Migrator::up(&db, None).await.expect("Failed to migrate");
    db
}

fn build_app(db: DatabaseConnection, backend: LocalBackend, root: tempfile::TempDir) -> TestApp {
    let mut upload = UploadSettings::default();
    upload.image.limit_image_width = Some(500);
    upload.image.limit_image_height = Some(500);

    let state = AppState::new(db, Backend::Local(backend), upload);
    TestApp {
        router: create_router(state),
        root,
    }
}

async fn test_app() -> TestApp {
    let root = tempfile::tempdir().expect("tempdir");
    let backend = LocalBackend::new(root.path(), "http://localhost:8080/storage").unwrap();
    build_app(migrated_db().await, backend, root)
}

/// App whose storage root is a plain file, so every write fails.
async fn broken_storage_app() -> TestApp {
    let root = tempfile::tempdir().expect("tempdir");
    let storage = root.path().join("storage");
    let backend = LocalBackend::new(&storage, "http://localhost:8080/storage").unwrap();
    if storage.exists() {
        std::fs::remove_dir_all(&storage).unwrap();
    }
    std::fs::write(&storage, b"").unwrap();
    build_app(migrated_db().await, backend, root)
}

fn png(width: u32, height: u32, shade: u8) -> Vec<u8> {
    let image = RgbImage::from_pixel(width, height, Rgb([shade, 64, 128]));
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

fn data_url(bytes: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(bytes))
}

fn multipart_request(uri: &str, admin_id: Option<&str>, bytes: &[u8]) -> Request<Body> {
    multipart_body(uri, admin_id, bytes, "image/png")
}

fn multipart_with_type(uri: &str, bytes: &[u8], content_type: &str) -> Request<Body> {
    multipart_body(uri, Some("1"), bytes, content_type)
}

fn multipart_body(
    uri: &str,
    admin_id: Option<&str>,
    bytes: &[u8],
    content_type: &str,
) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"photo.png\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(id) = admin_id {
        builder = builder.header(ADMIN_ID_HEADER, id);
    }
    builder.body(Body::from(body)).unwrap()
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(ADMIN_ID_HEADER, "1")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(ADMIN_ID_HEADER, "1")
        .body(Body::empty())
        .unwrap()
}

async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn upload(app: &TestApp, bytes: &[u8]) -> Value {
    let (status, body) = send(
        app,
        multipart_request("/api/admin/upload/image/handle", Some("1"), bytes),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["data"].clone()
}

#[tokio::test]
async fn test_health() {
    let app = test_app().await;
    let (status, body) = send(
        &app,
        Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_handle_without_principal_is_unauthorized() {
    let app = test_app().await;
    let (status, body) = send(
        &app,
        multipart_request("/api/admin/upload/image/handle", None, &png(4, 4, 1)),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], "error");
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn test_handle_stores_file_and_rewrites_url() {
    let app = test_app().await;
    let bytes = png(20, 10, 2);

    let data = upload(&app, &bytes).await;

    let path = data["path"].as_str().unwrap();
    assert!(path.starts_with("images/"));
    assert_eq!(
        data["url"],
        format!("http://localhost:8080/storage/{path}")
    );
    assert_eq!(data["extension"], "png");
    assert_eq!(data["contentType"], "image/png");
    assert_eq!(data["name"], "photo.png");
    assert_eq!(data["extra"]["width"], 20);

    let on_disk = std::fs::read(app.root.path().join(path)).unwrap();
    assert_eq!(on_disk, bytes);
}

#[tokio::test]
async fn test_identical_uploads_share_storage() {
    let app = test_app().await;
    let bytes = png(8, 8, 3);

    let first = upload(&app, &bytes).await;
    let second = upload(&app, &bytes).await;

    assert_ne!(first["id"], second["id"]);
    assert_eq!(first["hash"], second["hash"]);
    assert_eq!(first["path"], second["path"]);
}

#[tokio::test]
async fn test_handle_without_file_field_is_rejected() {
    let app = test_app().await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/admin/upload/image/handle")
        .header(ADMIN_ID_HEADER, "1")
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(format!("--{BOUNDARY}--\r\n")))
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "file is required");
}

#[tokio::test]
async fn test_storage_failure_hides_detail() {
    let app = broken_storage_app().await;
    let (status, body) = send(
        &app,
        multipart_request("/api/admin/upload/image/handle", Some("1"), &png(4, 4, 9)),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "An error occurred");
    assert!(body.get("data").is_none());

    let (_, body) = send(&app, get_request("/api/admin/upload/image/getList")).await;
    assert_eq!(body["data"]["pagination"]["total"], 0);
}

#[tokio::test]
async fn test_handle_with_mismatched_content_type_is_rejected() {
    let app = test_app().await;
    let request = multipart_with_type(
        "/api/admin/upload/image/handle",
        &png(4, 4, 10),
        "image/gif",
    );

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_unknown_resource_is_not_found() {
    let app = test_app().await;
    let (status, body) = send(
        &app,
        multipart_request("/api/admin/upload/video/handle", Some("1"), &png(4, 4, 1)),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_base64_handle() {
    let app = test_app().await;
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/admin/upload/image/base64Handle",
            &json!({"file": data_url(&png(6, 6, 4)), "name": "avatar.png"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["name"], "avatar.png");
}

#[tokio::test]
async fn test_base64_handle_without_comma_is_rejected() {
    let app = test_app().await;
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/admin/upload/image/base64Handle",
            &json!({"file": STANDARD.encode(png(6, 6, 4))}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_crop_updates_in_place_with_fallback_limit() {
    let app = test_app().await;
    let original = upload(&app, &png(10, 10, 5)).await;
    let id = original["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/admin/upload/image/crop?limitW=abc",
            &json!({"id": id, "file": data_url(&png(800, 400, 6))}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["id"], id);
    assert_eq!(body["data"]["name"], "photo.png");
    assert_eq!(body["data"]["extra"]["width"], 500);
    assert_eq!(body["data"]["extra"]["height"], 250);
    assert_ne!(body["data"]["path"], original["path"]);
}

#[tokio::test]
async fn test_crop_of_missing_attachment_is_not_found() {
    let app = test_app().await;
    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/admin/upload/image/crop",
            &json!({"id": 99, "file": data_url(&png(4, 4, 1))}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_list_and_delete() {
    let app = test_app().await;
    let first = upload(&app, &png(5, 5, 7)).await;
    upload(&app, &png(5, 5, 8)).await;

    let (status, body) = send(&app, get_request("/api/admin/upload/image/getList")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["list"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["pagination"]["pageSize"], 8);
    assert_eq!(body["data"]["pagination"]["total"], 2);
    assert_eq!(body["data"]["list"][0]["type"], "IMAGE");
    assert!(
        body["data"]["list"][0]["url"]
            .as_str()
            .unwrap()
            .starts_with("http://localhost:8080/storage/")
    );

    let id = first["id"].as_i64().unwrap();
    let (status, body) = send(
        &app,
        get_request(&format!("/api/admin/upload/image/delete?id={id}")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");

    let (_, body) = send(&app, get_request("/api/admin/upload/image/getList")).await;
    assert_eq!(body["data"]["pagination"]["total"], 1);

    let (status, _) = send(
        &app,
        json_request("POST", "/api/admin/upload/image/delete", &json!({"id": id})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_list_with_malformed_createtime_is_rejected() {
    let app = test_app().await;
    let (status, _) = send(
        &app,
        get_request("/api/admin/upload/image/getList?createtime=yesterday"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[rstest]
#[case("2026-01-01,2026-01-31", true)]
#[case("2026-01-31,2026-01-01", false)]
#[case("2026-01-01", false)]
#[case("2026-13-01,2026-12-31", false)]
fn test_parse_created_range(#[case] raw: &str, #[case] ok: bool) {
    assert_eq!(parse_created_range(raw).is_ok(), ok);
}

#[test]
fn test_created_range_is_inclusive() {
    let (start, end) = parse_created_range("2026-01-01,2026-01-01").unwrap();
    assert_eq!(start.to_rfc3339(), "2026-01-01T00:00:00+00:00");
    assert!(end > start + chrono::Duration::hours(23));
}
