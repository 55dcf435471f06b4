//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every error body has the shape `{"success": false, "message": ...}`.
//! Internal failures are logged and reported as an opaque `"Server error"`.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use helpdesk_core::DomainError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  /// Malformed request (unparseable JSON, bad query string).
  #[error("bad request: {0}")]
  BadRequest(String),

  /// Field constraint violations; all messages are returned to the client.
  #[error("validation failed: {}", .0.join("; "))]
  Validation(Vec<String>),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn ticket_not_found() -> Self { Self::NotFound("Ticket not found".into()) }

  /// Classify a backend error by its domain cause.
  pub fn from_store<E: DomainError>(e: E) -> Self {
    match e.domain() {
      Some(helpdesk_core::Error::TicketNotFound(_)) => Self::ticket_not_found(),
      Some(helpdesk_core::Error::Validation(messages)) => {
        Self::Validation(messages.clone())
      }
      None => Self::Store(Box::new(e)),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, json!(m)),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, json!(m)),
      ApiError::Validation(m) => (StatusCode::BAD_REQUEST, json!(m)),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, json!("Server error"))
      }
    };
    (status, Json(json!({ "success": false, "message": message })))
      .into_response()
  }
}
