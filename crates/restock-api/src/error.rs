//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error(transparent)]
  Invalid(#[from] restock_core::Error),

  #[error("{table} table: {source}")]
  Table {
    table:  &'static str,
    #[source]
    source: restock_csv::Error,
  },

  #[error("csv error: {0}")]
  Csv(#[from] restock_csv::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("internal error: {0}")]
  Internal(String),
}

impl ApiError {
  pub(crate) fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }

  /// Adapter for `map_err` on a named uploaded table.
  pub(crate) fn table(table: &'static str) -> impl FnOnce(restock_csv::Error) -> Self {
    move |source| Self::Table { table, source }
  }

  fn kind(&self) -> &'static str {
    match self {
      ApiError::NotFound(_) => "not_found",
      ApiError::BadRequest(_) => "bad_request",
      ApiError::Invalid(e) => e.kind(),
      ApiError::Table { .. } | ApiError::Csv(_) => "invalid_csv",
      ApiError::Store(_) => "store",
      ApiError::Internal(_) => "internal",
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::BadRequest(_)
      | ApiError::Invalid(_)
      | ApiError::Table { .. }
      | ApiError::Csv(_) => StatusCode::BAD_REQUEST,
      ApiError::Store(_) | ApiError::Internal(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    };
    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    }
    let body = json!({ "error": self.to_string(), "kind": self.kind() });
    (status, Json(body)).into_response()
  }
}
