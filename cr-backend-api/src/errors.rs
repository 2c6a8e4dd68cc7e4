//! `ApiError` -> HTTP response mapping, playing the role the teacher's
//! (stub) `api` crate reserved for an error handler: one type, one
//! `IntoResponse` impl, no bare `unwrap()` in a handler.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not found")]
    NotFound,

    #[error("invalid query: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Domain(#[from] cr_backend_domain::DomainError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::Domain(cr_backend_domain::DomainError::NotFound) => {
                (StatusCode::NOT_FOUND, "not found".to_string())
            }
            ApiError::Domain(cr_backend_domain::DomainError::Validation(_)) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            ApiError::Domain(cr_backend_domain::DomainError::Database(e)) => {
                tracing::error!(error = %e, "backend api: database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
