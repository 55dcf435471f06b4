//! JSON REST API for the helpdesk.
//!
//! Exposes an axum [`Router`] backed by any
//! [`helpdesk_core::store::TicketStore`]. CORS, TLS, and transport concerns
//! are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", helpdesk_api::api_router(store.clone(), ApiConfig::default()))
//! ```

pub mod envelope;
pub mod error;
pub mod health;
pub mod tickets;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, put},
};
use helpdesk_core::store::{DEFAULT_LIST_LIMIT, TicketStore};

pub use error::ApiError;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Tunables for the ticket endpoints.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  /// Default and maximum number of tickets returned by `GET /tickets`.
  pub list_limit: usize,
}

impl Default for ApiConfig {
  fn default() -> Self { Self { list_limit: DEFAULT_LIST_LIMIT } }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<S> {
  pub store:  Arc<S>,
  pub config: Arc<ApiConfig>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self { store: self.store.clone(), config: self.config.clone() }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>, config: ApiConfig) -> Router<()>
where
  S: TicketStore + 'static,
{
  let state = AppState { store, config: Arc::new(config) };

  Router::new()
    .route("/health", get(health::handler))
    .route("/tickets", get(tickets::list::<S>).post(tickets::create::<S>))
    .route("/tickets/stats", get(tickets::stats::<S>))
    .route(
      "/tickets/{id}",
      get(tickets::get_one::<S>)
        .put(tickets::update::<S>)
        .delete(tickets::delete_one::<S>),
    )
    .route("/tickets/{id}/status", put(tickets::update_status::<S>))
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
