//! HTTP rendering of [`AppError`]
//!
//! RFC 7807 Problem Details, extended with the public error `code` and
//! field-level `errors`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use super::app_error::AppError;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut body = serde_json::json!({
            "type": format!("https://httpstatuses.io/{}", self.status_code()),
            "title": self.kind().as_str(),
            "status": self.status_code(),
            "code": self.kind(),
            "detail": self.message(),
            "action": self.action(),
        });

        if !self.field_errors().is_empty() {
            body["errors"] = serde_json::json!(self.field_errors());
        }

        (status, Json(body)).into_response()
    }
}
