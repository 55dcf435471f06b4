//! Ticket types: the single entity tracked by the helpdesk.
//!
//! A ticket carries its own status history. History entries are append-only;
//! the ticket's current `status` mirrors the most recent entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use uuid::Uuid;

// ─── Enums ───────────────────────────────────────────────────────────────────

/// How urgent a ticket is.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Priority {
  Low,
  #[default]
  Medium,
  High,
}

/// Where a ticket is in its lifecycle.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Status {
  #[default]
  Open,
  InProgress,
  Resolved,
}

// ─── History ─────────────────────────────────────────────────────────────────

/// An immutable audit record of a status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
  pub status:      Status,
  pub notes:       Option<String>,
  /// Opaque identifier of the agent the ticket was assigned to, if any.
  pub assigned_to: Option<String>,
  pub updated_by:  Option<String>,
  pub timestamp:   DateTime<Utc>,
}

// ─── Ticket ──────────────────────────────────────────────────────────────────

/// A support request tracked through its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
  pub id:            Uuid,
  /// Human-facing identifier, e.g. `TCKT-00042`. Assigned by the store.
  pub ticket_number: String,
  pub title:         String,
  pub description:   String,
  pub priority:      Priority,
  pub status:        Status,
  pub assigned_to:   Option<String>,
  /// Chronological; never empty once the ticket has been stored.
  pub history:       Vec<HistoryEntry>,
  pub created_at:    DateTime<Utc>,
  pub updated_at:    DateTime<Utc>,
}

impl Ticket {
  /// The most recent history entry.
  pub fn latest_entry(&self) -> Option<&HistoryEntry> { self.history.last() }
}

/// Format a store sequence value as a display ticket number.
pub fn ticket_number(seq: i64) -> String { format!("TCKT-{seq:05}") }

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Input to [`crate::store::TicketStore::create`].
/// Identity, numbering, status and timestamps are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTicket {
  pub title:       String,
  pub description: String,
  pub priority:    Priority,
}

impl NewTicket {
  pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
    Self {
      title:       title.into(),
      description: description.into(),
      priority:    Priority::default(),
    }
  }

  pub fn with_priority(mut self, priority: Priority) -> Self {
    self.priority = priority;
    self
  }
}

/// Partial replacement of a ticket's mutable fields. `None` leaves a field
/// untouched; for `assigned_to`, `Some(None)` clears the assignee.
///
/// `status` is applied through history: a status different from the
/// ticket's current one appends an entry, the same status is a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketPatch {
  pub title:       Option<String>,
  pub description: Option<String>,
  pub priority:    Option<Priority>,
  pub status:      Option<StatusUpdate>,
  pub assigned_to: Option<Option<String>>,
}

impl TicketPatch {
  pub fn is_empty(&self) -> bool { self == &Self::default() }
}

/// Input to [`crate::store::TicketStore::update_status`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
  pub status:      Status,
  pub notes:       Option<String>,
  /// When `Some`, also replaces the ticket's assignee.
  pub assigned_to: Option<String>,
  pub updated_by:  Option<String>,
}

impl StatusUpdate {
  pub fn new(status: Status) -> Self {
    Self { status, notes: None, assigned_to: None, updated_by: None }
  }

  pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
    self.notes = Some(notes.into());
    self
  }
}

// ─── Stats ───────────────────────────────────────────────────────────────────

/// Ticket counts by current status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketStats {
  pub total:       u64,
  pub open:        u64,
  pub in_progress: u64,
  pub resolved:    u64,
}

impl TicketStats {
  pub fn count(&self, status: Status) -> u64 {
    match status {
      Status::Open => self.open,
      Status::InProgress => self.in_progress,
      Status::Resolved => self.resolved,
    }
  }
}

#[cfg(test)]
mod tests {
  use std::str::FromStr;

  use chrono::TimeZone;
  use serde_json::json;

  use super::*;

  #[test]
  fn status_uses_kebab_case_everywhere() {
    assert_eq!(Status::InProgress.to_string(), "in-progress");
    assert_eq!(Status::from_str("in-progress").unwrap(), Status::InProgress);
    assert_eq!(
      serde_json::to_value(Status::InProgress).unwrap(),
      json!("in-progress")
    );
    assert!(Status::from_str("closed").is_err());
  }

  #[test]
  fn defaults_match_new_ticket_semantics() {
    assert_eq!(Priority::default(), Priority::Medium);
    assert_eq!(Status::default(), Status::Open);
  }

  #[test]
  fn ticket_number_is_zero_padded() {
    assert_eq!(ticket_number(1), "TCKT-00001");
    assert_eq!(ticket_number(123_456), "TCKT-123456");
  }

  #[test]
  fn ticket_serialises_with_camel_case_fields() {
    let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let ticket = Ticket {
      id:            Uuid::nil(),
      ticket_number: ticket_number(7),
      title:         "Login issue".into(),
      description:   "Cannot log in since today".into(),
      priority:      Priority::High,
      status:        Status::Open,
      assigned_to:   None,
      history:       vec![HistoryEntry {
        status:      Status::Open,
        notes:       None,
        assigned_to: None,
        updated_by:  None,
        timestamp:   at,
      }],
      created_at:    at,
      updated_at:    at,
    };

    let v = serde_json::to_value(&ticket).unwrap();
    assert_eq!(v["ticketNumber"], "TCKT-00007");
    assert_eq!(v["priority"], "high");
    assert_eq!(v["history"][0]["status"], "open");
    assert!(v.get("createdAt").is_some());
    assert!(v.get("assignedTo").is_some());
    assert!(v.get("ticket_number").is_none());
  }

  #[test]
  fn stats_count_by_status() {
    let stats = TicketStats { total: 6, open: 3, in_progress: 2, resolved: 1 };
    assert_eq!(stats.count(Status::InProgress), 2);
    assert_eq!(stats.count(Status::Resolved), 1);
  }

  #[test]
  fn empty_patch_is_detected() {
    assert!(TicketPatch::default().is_empty());
    let patch = TicketPatch { assigned_to: Some(None), ..Default::default() };
    assert!(!patch.is_empty());
    let patch = TicketPatch {
      status: Some(StatusUpdate::new(Status::Resolved)),
      ..Default::default()
    };
    assert!(!patch.is_empty());
  }
}
