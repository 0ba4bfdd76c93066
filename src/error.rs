//! Error types for the build server

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

/// Feedback for a single rejected form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
  pub field: &'static str,
  pub message: String,
}

impl FieldError {
  pub fn new(field: &'static str, message: impl Into<String>) -> Self {
    Self { field, message: message.into() }
  }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("Database error: {0}")]
  Database(#[from] sea_orm::DbErr),

  #[error("Invalid form: {} field(s) rejected", .0.len())]
  Validation(Vec<FieldError>),

  #[error("Bad request: {0}")]
  BadRequest(&'static str),

  #[error("Build not found")]
  BuildNotFound,
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let (status, body) = match &self {
      Error::Database(err) => {
        error!("Database error: {err}");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          json::json!({ "success": false, "error": "Database error" }),
        )
      }
      Error::Validation(fields) => (
        StatusCode::UNPROCESSABLE_ENTITY,
        json::json!({
          "success": false,
          "error": "Invalid form",
          "fields": fields,
        }),
      ),
      Error::BadRequest(message) => (
        StatusCode::BAD_REQUEST,
        json::json!({ "success": false, "error": message }),
      ),
      Error::BuildNotFound => (
        StatusCode::NOT_FOUND,
        json::json!({ "success": false, "error": "Build not found" }),
      ),
    };

    (status, Json(body)).into_response()
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
