// src/errors.rs

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::workflow::WorkflowError;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Conflict: {0}")]
  Conflict(String),

  #[error("Unauthorized: {0}")]
  Unauthorized(String),

  #[error("Forbidden: {0}")]
  Forbidden(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Migration Error: {0}")]
  Migrate(#[from] sqlx::migrate::MigrateError),

  #[error("Workflow Error: {source}")]
  Workflow {
    #[from]
    source: WorkflowError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl AppError {
  /// The text placed in the `message` field of the response body.
  /// Server-side failures never leak their detail to clients.
  pub fn client_message(&self) -> String {
    match self {
      AppError::Validation(m)
      | AppError::Conflict(m)
      | AppError::Unauthorized(m)
      | AppError::Forbidden(m)
      | AppError::NotFound(m) => m.clone(),
      AppError::Config(_)
      | AppError::Sqlx(_)
      | AppError::Migrate(_)
      | AppError::Workflow { .. }
      | AppError::Internal(_) => "Server error".to_string(),
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::Conflict(_) => StatusCode::CONFLICT,
      AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
      AppError::Forbidden(_) => StatusCode::FORBIDDEN,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Config(_)
      | AppError::Sqlx(_)
      | AppError::Migrate(_)
      | AppError::Workflow { .. }
      | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with server error");
    } else {
      tracing::warn!(application_error = %self, status = status.as_u16(), "Responding with client error");
    }
    HttpResponse::build(status).json(json!({ "message": self.client_message() }))
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn client_errors_keep_their_message() {
    let err = AppError::Validation("Insufficient stock for Milk. Available: 3".into());
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(err.client_message(), "Insufficient stock for Milk. Available: 3");
    assert_eq!(AppError::Forbidden("Forbidden".into()).status_code(), StatusCode::FORBIDDEN);
    assert_eq!(AppError::Conflict("dup".into()).status_code(), StatusCode::CONFLICT);
  }

  #[test]
  fn server_errors_are_masked() {
    let err = AppError::from(WorkflowError::HandlerMissing {
      step_name: "persist_order".into(),
    });
    assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(err.client_message(), "Server error");
    assert_eq!(AppError::Sqlx(sqlx::Error::RowNotFound).client_message(), "Server error");
  }
}
