//! Handler for `GET /health`.

use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Health {
  pub success:   bool,
  pub message:   &'static str,
  pub timestamp: DateTime<Utc>,
}

/// `GET /health`: liveness only; does not touch the store.
pub async fn handler() -> Json<Health> {
  Json(Health {
    success:   true,
    message:   "HelpDesk API is running",
    timestamp: Utc::now(),
  })
}
