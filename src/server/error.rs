use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::entity::EntityKind;
use crate::repository::RepositoryError;
use crate::schema::ValidationErrors;

/// Error rendered as a JSON response
#[derive(Debug)]
pub enum ApiError {
  Internal(anyhow::Error),
  NotFound(String),
  BadRequest(String),
  InvalidDto {
    kind: EntityKind,
    errors: ValidationErrors,
  },
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self {
      Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
      Self::NotFound(_) => StatusCode::NOT_FOUND,
      Self::BadRequest(_) | Self::InvalidDto { .. } => StatusCode::BAD_REQUEST,
    }
  }

  pub fn invalid_dto(kind: EntityKind, errors: ValidationErrors) -> Self {
    Self::InvalidDto { kind, errors }
  }
}

impl From<RepositoryError> for ApiError {
  fn from(e: RepositoryError) -> Self {
    match e {
      RepositoryError::NotFound { .. } => Self::NotFound(e.to_string()),
      other => Self::Internal(other.into()),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let body = match self {
      Self::Internal(e) => {
        tracing::error!("Request failed: {:#}", e);
        json!({ "error": "Internal Server Error" })
      }
      Self::NotFound(msg) | Self::BadRequest(msg) => {
        tracing::warn!("{}", msg);
        json!({ "error": msg })
      }
      Self::InvalidDto { kind, errors } => {
        let msg = format!("Invalid {} DTO format: {}", kind.name(), errors);
        tracing::warn!("{}", msg);
        json!({ "error": msg, "details": errors.messages() })
      }
    };
    (status, Json(body)).into_response()
  }
}
