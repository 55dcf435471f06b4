//! HTTP server assembly for the helpdesk.
//!
//! Mounts the JSON API under `/api` and wraps it with CORS and request
//! tracing. The binary in `main.rs` only loads configuration, opens the store
//! and binds a listener.

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  http::{HeaderValue, Method, header},
};
use helpdesk_api::{ApiConfig, api_router};
use helpdesk_core::store::{DEFAULT_LIST_LIMIT, TicketStore};
use serde::Deserialize;
use tower_http::{
  cors::{AllowOrigin, CorsLayer},
  trace::TraceLayer,
};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `HELPDESK_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:         String,
  pub port:         u16,
  pub store_path:   PathBuf,
  /// Browser origins allowed to call the API. `"*"` allows any origin.
  pub cors_origins: Vec<String>,
  /// Default and maximum page size for `GET /api/tickets`.
  pub list_limit:   usize,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:         "127.0.0.1".into(),
      port:         5000,
      store_path:   PathBuf::from("helpdesk.db"),
      cors_origins: vec!["http://localhost:5173".into()],
      list_limit:   DEFAULT_LIST_LIMIT,
    }
  }
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── CORS ─────────────────────────────────────────────────────────────────────

/// Build the CORS layer for the configured origins. Origins that are not
/// valid header values are skipped.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
  let allow_origin = if origins.iter().any(|o| o == "*") {
    AllowOrigin::any()
  } else {
    let values: Vec<HeaderValue> =
      origins.iter().filter_map(|o| o.parse().ok()).collect();
    AllowOrigin::list(values)
  };

  CorsLayer::new()
    .allow_origin(allow_origin)
    .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
    .allow_headers([header::CONTENT_TYPE])
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the complete application router.
pub fn app<S>(store: Arc<S>, config: &ServerConfig) -> Router
where
  S: TicketStore + 'static,
{
  let api = api_router(store, ApiConfig { list_limit: config.list_limit });

  Router::new()
    .nest("/api", api)
    .layer(cors_layer(&config.cors_origins))
    .layer(TraceLayer::new_for_http())
}
