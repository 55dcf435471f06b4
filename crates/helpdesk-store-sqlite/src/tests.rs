//! Integration tests for `SqliteStore` against an in-memory database.

use std::collections::HashSet;

use helpdesk_core::{
  DomainError,
  store::{TicketQuery, TicketStore},
  ticket::{
    NewTicket, Priority, Status, StatusUpdate, TicketPatch, TicketStats,
  },
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn login_issue() -> NewTicket {
  NewTicket::new("Login issue", "Cannot log in since today")
    .with_priority(Priority::High)
}

fn is_not_found(err: &Error) -> bool {
  matches!(err.domain(), Some(helpdesk_core::Error::TicketNotFound(_)))
}

fn is_validation(err: &Error) -> bool {
  matches!(err.domain(), Some(helpdesk_core::Error::Validation(_)))
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_seeds_status_and_history() {
  let s = store().await;

  let ticket = s.create(login_issue()).await.unwrap();
  assert_eq!(ticket.status, Status::Open);
  assert_eq!(ticket.priority, Priority::High);
  assert_eq!(ticket.history.len(), 1);
  assert_eq!(ticket.latest_entry().unwrap().status, ticket.status);
  assert_eq!(ticket.created_at, ticket.updated_at);
  assert!(ticket.ticket_number.starts_with("TCKT-"));
}

#[tokio::test]
async fn create_then_get_roundtrips() {
  let s = store().await;

  let created = s.create(login_issue()).await.unwrap();
  let fetched = s.get(created.id).await.unwrap().expect("ticket exists");
  assert_eq!(fetched, created);
}

#[tokio::test]
async fn create_defaults_to_medium_priority() {
  let s = store().await;
  let ticket = s
    .create(NewTicket::new("VPN drops", "Every ten minutes"))
    .await
    .unwrap();
  assert_eq!(ticket.priority, Priority::Medium);
}

#[tokio::test]
async fn create_rejects_empty_fields() {
  let s = store().await;

  let err = s.create(NewTicket::new("", "body")).await.unwrap_err();
  assert!(is_validation(&err));

  let err = s.create(NewTicket::new("title", "  ")).await.unwrap_err();
  assert!(is_validation(&err));

  let all = s.list(&TicketQuery::default()).await.unwrap();
  assert!(all.is_empty(), "rejected tickets must not be stored");
}

#[tokio::test]
async fn ticket_numbers_are_unique_and_never_reused() {
  let s = store().await;

  let mut numbers = HashSet::new();
  let mut last = None;
  for i in 0..5 {
    let t = s
      .create(NewTicket::new(format!("Ticket {i}"), "body"))
      .await
      .unwrap();
    assert!(numbers.insert(t.ticket_number.clone()));
    last = Some(t);
  }

  s.delete(last.unwrap().id).await.unwrap();
  let after = s.create(NewTicket::new("After", "delete")).await.unwrap();
  assert!(numbers.insert(after.ticket_number), "number reused after delete");
}

#[tokio::test]
async fn concurrent_creates_get_distinct_numbers() {
  let s = store().await;

  let handles: Vec<_> = (0..16)
    .map(|i| {
      let s = s.clone();
      tokio::spawn(async move {
        s.create(NewTicket::new(format!("Parallel {i}"), "body"))
          .await
          .unwrap()
          .ticket_number
      })
    })
    .collect();

  let mut numbers = HashSet::new();
  for h in handles {
    assert!(numbers.insert(h.await.unwrap()));
  }
  assert_eq!(numbers.len(), 16);
}

// ─── List ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_is_newest_first() {
  let s = store().await;
  let first = s.create(NewTicket::new("First", "a")).await.unwrap();
  let second = s.create(NewTicket::new("Second", "b")).await.unwrap();
  let third = s.create(NewTicket::new("Third", "c")).await.unwrap();

  let all = s.list(&TicketQuery::default()).await.unwrap();
  let ids: Vec<_> = all.iter().map(|t| t.id).collect();
  assert_eq!(ids, vec![third.id, second.id, first.id]);
}

#[tokio::test]
async fn list_filters_by_status() {
  let s = store().await;
  let a = s.create(NewTicket::new("A", "a")).await.unwrap();
  s.create(NewTicket::new("B", "b")).await.unwrap();
  s.update_status(a.id, StatusUpdate::new(Status::Resolved))
    .await
    .unwrap();

  let open = s
    .list(&TicketQuery { status: Some(Status::Open), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(open.len(), 1);
  assert!(open.iter().all(|t| t.status == Status::Open));

  let resolved = s
    .list(&TicketQuery {
      status: Some(Status::Resolved),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(resolved.len(), 1);
  assert_eq!(resolved[0].id, a.id);
}

#[tokio::test]
async fn list_filters_by_priority() {
  let s = store().await;
  s.create(login_issue()).await.unwrap();
  s.create(NewTicket::new("Mouse", "Left click sticks").with_priority(Priority::Low))
    .await
    .unwrap();

  let high = s
    .list(&TicketQuery {
      priority: Some(Priority::High),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(high.len(), 1);
  assert_eq!(high[0].title, "Login issue");
}

#[tokio::test]
async fn search_is_case_insensitive_across_fields() {
  let s = store().await;
  let login = s.create(login_issue()).await.unwrap();
  let printer = s
    .create(NewTicket::new("Printer jam", "Tray two keeps jamming on LOGIN day"))
    .await
    .unwrap();
  s.create(NewTicket::new("Monitor", "Flickers")).await.unwrap();

  let hits = s
    .list(&TicketQuery {
      search: Some("login".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  let ids: HashSet<_> = hits.iter().map(|t| t.id).collect();
  assert_eq!(ids, HashSet::from([login.id, printer.id]));

  let by_number = s
    .list(&TicketQuery {
      search: Some(printer.ticket_number.to_lowercase()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(by_number.len(), 1);
  assert_eq!(by_number[0].id, printer.id);
}

#[tokio::test]
async fn search_folds_case_beyond_ascii() {
  let s = store().await;
  let screen = s
    .create(NewTicket::new("Écran cassé", "Le moniteur"))
    .await
    .unwrap();
  s.create(NewTicket::new("Straße", "Adresse falsch")).await.unwrap();

  for term in ["écran", "ÉCRAN", "CASSÉ"] {
    let hits = s
      .list(&TicketQuery { search: Some(term.into()), ..Default::default() })
      .await
      .unwrap();
    assert_eq!(hits.len(), 1, "search {term:?}");
    assert_eq!(hits[0].id, screen.id);
  }
}

#[tokio::test]
async fn search_treats_wildcards_literally() {
  let s = store().await;
  s.create(NewTicket::new("Discount", "50% off")).await.unwrap();
  s.create(NewTicket::new("Other", "nothing here")).await.unwrap();

  let hits = s
    .list(&TicketQuery { search: Some("%".into()), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].title, "Discount");
}

#[tokio::test]
async fn list_respects_limit_and_offset() {
  let s = store().await;
  for i in 0..7 {
    s.create(NewTicket::new(format!("T{i}"), "body")).await.unwrap();
  }

  let page = s
    .list(&TicketQuery { limit: Some(3), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(page.len(), 3);
  assert_eq!(page[0].title, "T6");

  let next = s
    .list(&TicketQuery {
      limit: Some(3),
      offset: Some(3),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(next.len(), 3);
  assert_eq!(next[0].title, "T3");
}

#[tokio::test]
async fn list_defaults_to_fifty() {
  let s = store().await;
  for i in 0..55 {
    s.create(NewTicket::new(format!("T{i}"), "body")).await.unwrap();
  }
  let all = s.list(&TicketQuery::default()).await.unwrap();
  assert_eq!(all.len(), 50);
}

// ─── Update ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn update_replaces_only_present_fields() {
  let s = store().await;
  let t = s.create(login_issue()).await.unwrap();

  let updated = s
    .update(t.id, TicketPatch {
      title: Some("  Login issue (SSO)  ".into()),
      priority: Some(Priority::Low),
      assigned_to: Some(Some("agent-7".into())),
      ..Default::default()
    })
    .await
    .unwrap();

  assert_eq!(updated.title, "Login issue (SSO)");
  assert_eq!(updated.priority, Priority::Low);
  assert_eq!(updated.assigned_to.as_deref(), Some("agent-7"));
  assert_eq!(updated.description, t.description);
  assert_eq!(updated.ticket_number, t.ticket_number);
  assert_eq!(updated.history, t.history, "update must not touch history");
  assert!(updated.updated_at >= t.updated_at);

  let cleared = s
    .update(t.id, TicketPatch {
      assigned_to: Some(None),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(cleared.assigned_to, None);
}

#[tokio::test]
async fn update_revalidates() {
  let s = store().await;
  let t = s.create(login_issue()).await.unwrap();

  let err = s
    .update(t.id, TicketPatch {
      description: Some("x".repeat(1001)),
      ..Default::default()
    })
    .await
    .unwrap_err();
  assert!(is_validation(&err));

  let unchanged = s.get(t.id).await.unwrap().unwrap();
  assert_eq!(unchanged.description, t.description);
}

#[tokio::test]
async fn update_missing_ticket_is_not_found() {
  let s = store().await;
  let err = s
    .update(Uuid::new_v4(), TicketPatch::default())
    .await
    .unwrap_err();
  assert!(is_not_found(&err));
}

#[tokio::test]
async fn update_with_new_status_appends_history() {
  let s = store().await;
  let t = s.create(login_issue()).await.unwrap();

  let updated = s
    .update(t.id, TicketPatch {
      priority: Some(Priority::Low),
      status: Some(
        StatusUpdate::new(Status::Resolved).with_notes("Password reset"),
      ),
      ..Default::default()
    })
    .await
    .unwrap();

  assert_eq!(updated.priority, Priority::Low);
  assert_eq!(updated.status, Status::Resolved);
  assert_eq!(updated.history.len(), 2);
  let last = updated.latest_entry().unwrap();
  assert_eq!(last.status, updated.status);
  assert_eq!(last.notes.as_deref(), Some("Password reset"));
  assert_eq!(s.get(t.id).await.unwrap().unwrap(), updated);
}

#[tokio::test]
async fn update_with_same_status_leaves_history() {
  let s = store().await;
  let t = s.create(login_issue()).await.unwrap();

  let updated = s
    .update(t.id, TicketPatch {
      title: Some("Login issue (SSO)".into()),
      status: Some(StatusUpdate::new(Status::Open)),
      ..Default::default()
    })
    .await
    .unwrap();

  assert_eq!(updated.title, "Login issue (SSO)");
  assert_eq!(updated.status, Status::Open);
  assert_eq!(updated.history, t.history);
}

#[tokio::test]
async fn concurrent_updates_to_one_status_record_it_once() {
  let s = store().await;
  let id = s.create(login_issue()).await.unwrap().id;

  let handles: Vec<_> = (0..8)
    .map(|_| {
      let s = s.clone();
      tokio::spawn(async move {
        s.update(id, TicketPatch {
          status: Some(StatusUpdate::new(Status::InProgress)),
          ..Default::default()
        })
        .await
        .unwrap()
      })
    })
    .collect();
  for h in handles {
    h.await.unwrap();
  }

  let t = s.get(id).await.unwrap().unwrap();
  assert_eq!(t.status, Status::InProgress);
  let statuses: Vec<_> = t.history.iter().map(|e| e.status).collect();
  assert_eq!(statuses, vec![Status::Open, Status::InProgress]);
}

#[tokio::test]
async fn update_after_delete_is_not_found() {
  let s = store().await;
  let t = s.create(login_issue()).await.unwrap();
  s.delete(t.id).await.unwrap();

  let err = s
    .update(t.id, TicketPatch {
      title: Some("Too late".into()),
      status: Some(StatusUpdate::new(Status::Resolved)),
      ..Default::default()
    })
    .await
    .unwrap_err();
  assert!(is_not_found(&err));
  assert!(s.get(t.id).await.unwrap().is_none());
}

// ─── Status updates ──────────────────────────────────────────────────────────

#[tokio::test]
async fn update_status_appends_history() {
  let s = store().await;
  let t = s.create(login_issue()).await.unwrap();

  let mut update =
    StatusUpdate::new(Status::InProgress).with_notes("Reset the password");
  update.assigned_to = Some("agent-7".into());
  update.updated_by = Some("lead-1".into());
  s.update_status(t.id, update).await.unwrap();

  let fetched = s.get(t.id).await.unwrap().unwrap();
  assert_eq!(fetched.status, Status::InProgress);
  assert_eq!(fetched.assigned_to.as_deref(), Some("agent-7"));
  assert_eq!(fetched.history.len(), 2);

  let last = fetched.latest_entry().unwrap();
  assert_eq!(last.status, Status::InProgress);
  assert_eq!(last.notes.as_deref(), Some("Reset the password"));
  assert_eq!(last.updated_by.as_deref(), Some("lead-1"));
  assert!(last.timestamp >= fetched.history[0].timestamp);
}

#[tokio::test]
async fn update_status_keeps_assignee_when_omitted() {
  let s = store().await;
  let t = s.create(login_issue()).await.unwrap();

  let mut assign = StatusUpdate::new(Status::InProgress);
  assign.assigned_to = Some("agent-7".into());
  s.update_status(t.id, assign).await.unwrap();

  let resolved = s
    .update_status(t.id, StatusUpdate::new(Status::Resolved))
    .await
    .unwrap();
  assert_eq!(resolved.assigned_to.as_deref(), Some("agent-7"));
  assert_eq!(resolved.history.len(), 3);
  assert_eq!(resolved.latest_entry().unwrap().status, resolved.status);
}

#[tokio::test]
async fn concurrent_status_updates_keep_every_entry() {
  let s = store().await;
  let id = s.create(login_issue()).await.unwrap().id;

  let handles: Vec<_> = (0..10)
    .map(|i| {
      let s = s.clone();
      tokio::spawn(async move {
        s.update_status(
          id,
          StatusUpdate::new(Status::InProgress).with_notes(format!("note {i}")),
        )
        .await
        .unwrap();
      })
    })
    .collect();
  for h in handles {
    h.await.unwrap();
  }

  let fetched = s.get(id).await.unwrap().unwrap();
  assert_eq!(fetched.history.len(), 11);
}

#[tokio::test]
async fn update_status_missing_ticket_is_not_found() {
  let s = store().await;
  let err = s
    .update_status(Uuid::new_v4(), StatusUpdate::new(Status::Resolved))
    .await
    .unwrap_err();
  assert!(is_not_found(&err));
}

// ─── Delete ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_then_get_returns_none() {
  let s = store().await;
  let t = s.create(login_issue()).await.unwrap();
  s.update_status(t.id, StatusUpdate::new(Status::Resolved))
    .await
    .unwrap();

  s.delete(t.id).await.unwrap();
  assert!(s.get(t.id).await.unwrap().is_none());

  let err = s.delete(t.id).await.unwrap_err();
  assert!(is_not_found(&err));
}

// ─── Stats ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn stats_count_current_status() {
  let s = store().await;
  let a = s.create(NewTicket::new("A", "a")).await.unwrap();
  let b = s.create(NewTicket::new("B", "b")).await.unwrap();
  s.create(NewTicket::new("C", "c")).await.unwrap();

  s.update_status(a.id, StatusUpdate::new(Status::InProgress))
    .await
    .unwrap();
  s.update_status(b.id, StatusUpdate::new(Status::Resolved))
    .await
    .unwrap();

  let stats = s.stats().await.unwrap();
  assert_eq!(stats.total, 3);
  assert_eq!(stats.open, 1);
  assert_eq!(stats.in_progress, 1);
  assert_eq!(stats.resolved, 1);
}

#[tokio::test]
async fn stats_on_empty_store_are_zero() {
  let s = store().await;
  assert_eq!(s.stats().await.unwrap(), TicketStats::default());
}
