//! The `{status, message, data}` response envelope.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use tracing::{error, warn};

use mediahub_shared::AppError;

/// Success envelope carrying `data`.
pub fn success<T: Serialize>(message: &str, data: T) -> Response {
    (
        StatusCode::OK,
        Json(json!({
            "status": "success",
            "message": message,
            "data": data
        })),
    )
        .into_response()
}

/// Success envelope without a payload.
pub fn success_message(message: &str) -> Response {
    (
        StatusCode::OK,
        Json(json!({
            "status": "success",
            "message": message
        })),
    )
        .into_response()
}

/// Error envelope. Server-side failures are logged and reported without detail.
pub fn failure(err: &AppError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let message = if status.is_server_error() {
        error!(code = err.error_code(), error = %err, "Request failed");
        "An error occurred"
    } else {
        warn!(code = err.error_code(), error = %err, "Request rejected");
        err.message()
    };

    (
        status,
        Json(json!({
            "status": "error",
            "message": message
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_success_envelope() {
        let response = success("ok", json!({"id": 1}));
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["data"]["id"], 1);
    }

    #[tokio::test]
    async fn test_failure_envelope_has_no_data() {
        let response = failure(&AppError::Validation("bad input".into()));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "bad input");
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn test_server_errors_hide_detail() {
        let response = failure(&AppError::Database("connection refused".into()));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["message"], "An error occurred");
    }
}
