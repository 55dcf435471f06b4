//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microseconds, `Z`
//! suffix) so that lexical order equals chronological order. Enums are stored
//! as their wire names. UUIDs are stored as hyphenated lowercase strings.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use helpdesk_core::ticket::{HistoryEntry, Priority, Status, Ticket};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

/// The current time at the precision the store keeps.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Enums ───────────────────────────────────────────────────────────────────

pub fn encode_priority(p: Priority) -> &'static str { p.into() }

pub fn decode_priority(s: &str) -> Result<Priority> {
  Priority::from_str(s).map_err(|_| Error::UnknownValue {
    column: "priority",
    value:  s.to_owned(),
  })
}

pub fn encode_status(s: Status) -> &'static str { s.into() }

pub fn decode_status(s: &str) -> Result<Status> {
  Status::from_str(s).map_err(|_| Error::UnknownValue {
    column: "status",
    value:  s.to_owned(),
  })
}

// ─── LIKE patterns ───────────────────────────────────────────────────────────

/// Build a `LIKE ... ESCAPE '\'` pattern matching `term` as a literal
/// substring.
pub fn like_pattern(term: &str) -> String {
  let mut out = String::with_capacity(term.len() + 2);
  out.push('%');
  for c in term.chars() {
    if matches!(c, '\\' | '%' | '_') {
      out.push('\\');
    }
    out.push(c);
  }
  out.push('%');
  out
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `tickets` row.
pub struct RawTicket {
  pub ticket_id:     String,
  pub ticket_number: String,
  pub title:         String,
  pub description:   String,
  pub priority:      String,
  pub status:        String,
  pub assigned_to:   Option<String>,
  pub created_at:    String,
  pub updated_at:    String,
}

/// Raw strings read directly from a `ticket_history` row.
pub struct RawHistoryEntry {
  pub status:      String,
  pub notes:       Option<String>,
  pub assigned_to: Option<String>,
  pub updated_by:  Option<String>,
  pub recorded_at: String,
}

impl RawHistoryEntry {
  pub fn into_entry(self) -> Result<HistoryEntry> {
    Ok(HistoryEntry {
      status:      decode_status(&self.status)?,
      notes:       self.notes,
      assigned_to: self.assigned_to,
      updated_by:  self.updated_by,
      timestamp:   decode_dt(&self.recorded_at)?,
    })
  }
}

impl RawTicket {
  pub fn into_ticket(self, history: Vec<RawHistoryEntry>) -> Result<Ticket> {
    let history = history
      .into_iter()
      .map(RawHistoryEntry::into_entry)
      .collect::<Result<Vec<_>>>()?;

    Ok(Ticket {
      id: decode_uuid(&self.ticket_id)?,
      ticket_number: self.ticket_number,
      title: self.title,
      description: self.description,
      priority: decode_priority(&self.priority)?,
      status: decode_status(&self.status)?,
      assigned_to: self.assigned_to,
      history,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}
