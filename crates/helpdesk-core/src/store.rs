//! The `TicketStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `helpdesk-store-sqlite`). Higher layers (`helpdesk-api`) depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  DomainError,
  ticket::{
    NewTicket, Priority, Status, StatusUpdate, Ticket, TicketPatch,
    TicketStats,
  },
};

/// Number of tickets returned by [`TicketStore::list`] when no limit is given.
pub const DEFAULT_LIST_LIMIT: usize = 50;

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`TicketStore::list`]. Results are always sorted newest
/// first by `created_at`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketQuery {
  pub status:   Option<Status>,
  pub priority: Option<Priority>,
  /// Case-insensitive substring matched against title, description and
  /// ticket number (any of them). Matched literally.
  pub search:   Option<String>,
  /// Defaults to [`DEFAULT_LIST_LIMIT`].
  pub limit:    Option<usize>,
  pub offset:   Option<usize>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a helpdesk ticket store backend.
///
/// Missing tickets are reported as [`crate::Error::TicketNotFound`] and bad
/// input as [`crate::Error::Validation`], both reachable through
/// [`DomainError::domain`] on the backend's error type.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait TicketStore: Send + Sync {
  type Error: DomainError;

  /// Tickets matching `query`, newest first.
  fn list<'a>(
    &'a self,
    query: &'a TicketQuery,
  ) -> impl Future<Output = Result<Vec<Ticket>, Self::Error>> + Send + 'a;

  /// Retrieve a ticket by id. Returns `None` if not found.
  fn get(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Ticket>, Self::Error>> + Send + '_;

  /// Validate and persist a new ticket. The store assigns the id, a unique
  /// ticket number, timestamps, the initial `Open` status, and a first
  /// history entry mirroring that status.
  fn create(
    &self,
    input: NewTicket,
  ) -> impl Future<Output = Result<Ticket, Self::Error>> + Send + '_;

  /// Replace the fields present in `patch` in a single transaction. A
  /// `patch.status` that differs from the stored status appends one history
  /// entry; the comparison happens inside the same transaction.
  fn update(
    &self,
    id: Uuid,
    patch: TicketPatch,
  ) -> impl Future<Output = Result<Ticket, Self::Error>> + Send + '_;

  /// Append a history entry for `update` and make the ticket's status (and
  /// assignee, if given) match it.
  fn update_status(
    &self,
    id: Uuid,
    update: StatusUpdate,
  ) -> impl Future<Output = Result<Ticket, Self::Error>> + Send + '_;

  /// Remove a ticket and its history. Errors if the ticket does not exist.
  fn delete(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Ticket counts by current status.
  fn stats(
    &self,
  ) -> impl Future<Output = Result<TicketStats, Self::Error>> + Send + '_;
}
