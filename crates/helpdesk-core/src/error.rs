//! Error types for `helpdesk-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  #[error("ticket not found: {0}")]
  TicketNotFound(Uuid),

  /// One or more field constraints failed. Messages are human-readable and
  /// safe to show to API clients.
  #[error("validation failed: {}", .0.join("; "))]
  Validation(Vec<String>),
}

impl Error {
  pub fn validation(message: impl Into<String>) -> Self {
    Self::Validation(vec![message.into()])
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Implemented by backend error types so that higher layers can recover the
/// domain-level cause (not found, validation) from an otherwise opaque error.
pub trait DomainError: std::error::Error + Send + Sync + 'static {
  /// The domain error carried by `self`, or `None` for infrastructure
  /// failures (I/O, database, decoding).
  fn domain(&self) -> Option<&Error>;
}

impl DomainError for Error {
  fn domain(&self) -> Option<&Error> { Some(self) }
}
