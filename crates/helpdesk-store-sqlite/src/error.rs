//! Error type for `helpdesk-store-sqlite`.

use helpdesk_core::DomainError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] helpdesk_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A column held a value outside its enum (e.g. a hand-edited database).
  #[error("unknown {column} value: {value:?}")]
  UnknownValue { column: &'static str, value: String },
}

impl Error {
  pub(crate) fn not_found(id: uuid::Uuid) -> Self {
    Self::Core(helpdesk_core::Error::TicketNotFound(id))
  }
}

impl DomainError for Error {
  fn domain(&self) -> Option<&helpdesk_core::Error> {
    match self {
      Self::Core(e) => Some(e),
      _ => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
