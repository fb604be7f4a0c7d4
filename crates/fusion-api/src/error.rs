//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every error body is `{"message": ...}`. Internal failures are logged
//! with their cause and answered with a generic message.

use axum::{
  Json,
  extract::rejection::QueryRejection,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use fusion_core::BoxError;
use serde_json::json;
use thiserror::Error;

/// Added to guard rejections so callers know how to recover.
pub const TOKEN_HINT: &str =
  "Use /login endpoint to get a new token or /refresh to refresh existing token";

const INTERNAL_MESSAGE: &str = "Internal Server Error";

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("bad request: {0}")]
  BadRequest(String),

  /// The bearer guard refused the request.
  #[error("unauthorized: {0}")]
  Unauthorized(&'static str),

  /// The identity provider refused a login or refresh.
  #[error("authentication failed: {0}")]
  AuthenticationFailed(&'static str),

  #[error("internal error: {0}")]
  Internal(#[source] BoxError),
}

impl From<fusion_core::Error> for ApiError {
  fn from(e: fusion_core::Error) -> Self {
    match e {
      fusion_core::Error::Validation(_) => ApiError::BadRequest(e.to_string()),
      other => ApiError::Internal(Box::new(other)),
    }
  }
}

/// Query strings axum cannot deserialize (for example a parameter given
/// twice under its alias) answer with the same JSON body as other errors.
impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self { ApiError::BadRequest(rejection.body_text()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, body) = match &self {
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, json!({ "message": m })),
      ApiError::Unauthorized(m) => {
        (StatusCode::UNAUTHORIZED, json!({ "message": m, "hint": TOKEN_HINT }))
      }
      ApiError::AuthenticationFailed(m) => (StatusCode::UNAUTHORIZED, json!({ "message": m })),
      ApiError::Internal(e) => {
        tracing::error!(error = %e, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, json!({ "message": INTERNAL_MESSAGE }))
      }
    };
    (status, Json(body)).into_response()
  }
}
