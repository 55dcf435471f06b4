//! Application state machine and event dispatcher.
//!
//! Key handling is split in two: [`App::on_key`] updates local state and
//! returns an [`Action`] describing any API call to make, and
//! [`App::handle_key`] performs that call. Only the second half touches the
//! network.

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use helpdesk_core::ticket::{Priority, Status, Ticket, TicketStats};
use strum::IntoEnumIterator;
use uuid::Uuid;

use crate::client::{ApiClient, ListFilter, StatusChange, TicketDraft};

// ─── Screen ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
  /// Focus on the ticket list.
  List,
  /// Focus on the selected ticket.
  Detail,
  /// New-ticket form.
  Create,
  /// Status-change form for the selected ticket.
  Status,
  /// Waiting for `y` to delete the selected ticket.
  ConfirmDelete,
}

// ─── Forms ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CreateField {
  #[default]
  Title,
  Description,
  Priority,
}

#[derive(Debug, Clone, Default)]
pub struct CreateForm {
  pub title:       String,
  pub description: String,
  pub priority:    Priority,
  pub field:       CreateField,
}

impl CreateForm {
  fn next_field(&mut self) {
    self.field = match self.field {
      CreateField::Title => CreateField::Description,
      CreateField::Description => CreateField::Priority,
      CreateField::Priority => CreateField::Title,
    };
  }

  fn prev_field(&mut self) {
    self.field = match self.field {
      CreateField::Title => CreateField::Priority,
      CreateField::Description => CreateField::Title,
      CreateField::Priority => CreateField::Description,
    };
  }

  fn text_mut(&mut self) -> Option<&mut String> {
    match self.field {
      CreateField::Title => Some(&mut self.title),
      CreateField::Description => Some(&mut self.description),
      CreateField::Priority => None,
    }
  }

  pub fn draft(&self) -> TicketDraft {
    TicketDraft {
      title:       self.title.clone(),
      description: self.description.clone(),
      priority:    self.priority,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusField {
  #[default]
  Status,
  Notes,
  Assignee,
}

#[derive(Debug, Clone, Default)]
pub struct StatusForm {
  pub status:      Status,
  pub notes:       String,
  pub assigned_to: String,
  pub field:       StatusField,
}

impl StatusForm {
  /// A form pre-filled from `ticket`'s current state.
  pub fn for_ticket(ticket: &Ticket) -> Self {
    Self {
      status: ticket.status,
      assigned_to: ticket.assigned_to.clone().unwrap_or_default(),
      ..Self::default()
    }
  }

  fn next_field(&mut self) {
    self.field = match self.field {
      StatusField::Status => StatusField::Notes,
      StatusField::Notes => StatusField::Assignee,
      StatusField::Assignee => StatusField::Status,
    };
  }

  fn prev_field(&mut self) {
    self.field = match self.field {
      StatusField::Status => StatusField::Assignee,
      StatusField::Notes => StatusField::Status,
      StatusField::Assignee => StatusField::Notes,
    };
  }

  fn text_mut(&mut self) -> Option<&mut String> {
    match self.field {
      StatusField::Status => None,
      StatusField::Notes => Some(&mut self.notes),
      StatusField::Assignee => Some(&mut self.assigned_to),
    }
  }

  pub fn change(&self) -> StatusChange {
    StatusChange {
      status:      self.status,
      notes:       self.notes.clone(),
      assigned_to: self.assigned_to.clone(),
    }
  }
}

// ─── Enum cycling ─────────────────────────────────────────────────────────────

/// Advance a list filter: unset → first variant → … → last variant → unset.
pub fn cycle_filter<T>(current: Option<T>) -> Option<T>
where
  T: IntoEnumIterator + PartialEq + Copy,
{
  let all: Vec<T> = T::iter().collect();
  match current {
    None => all.first().copied(),
    Some(c) => all
      .iter()
      .position(|v| *v == c)
      .and_then(|i| all.get(i + 1))
      .copied(),
  }
}

/// Step to the next (or previous) variant, wrapping around.
pub fn step<T>(current: T, forward: bool) -> T
where
  T: IntoEnumIterator + PartialEq + Copy,
{
  let all: Vec<T> = T::iter().collect();
  let i = all.iter().position(|v| *v == current).unwrap_or(0);
  let next = if forward {
    (i + 1) % all.len()
  } else {
    (i + all.len() - 1) % all.len()
  };
  all[next]
}

// ─── Actions ──────────────────────────────────────────────────────────────────

/// An API call requested by a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
  None,
  Quit,
  Refresh,
  OpenDetail(Uuid),
  Create(TicketDraft),
  UpdateStatus(Uuid, StatusChange),
  Delete(Uuid),
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  /// Current screen / keyboard focus.
  pub screen: Screen,

  /// Tickets matching `filter`, newest first.
  pub tickets: Vec<Ticket>,

  /// Counts shown in the header.
  pub stats: TicketStats,

  /// Filters sent with every list request.
  pub filter: ListFilter,

  /// Whether the user is typing a search term.
  pub search_active: bool,

  /// Search term being typed (applied on Enter).
  pub search_input: String,

  /// Cursor position within `tickets`.
  pub list_cursor: usize,

  /// Scroll offset within the detail pane.
  pub detail_scroll: usize,

  /// The ticket shown in the detail pane.
  pub selected: Option<Ticket>,

  pub create_form: CreateForm,
  pub status_form: StatusForm,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  /// Shared HTTP client.
  pub client: Arc<ApiClient>,
}

impl App {
  pub fn new(client: ApiClient) -> Self {
    Self {
      screen: Screen::List,
      tickets: Vec::new(),
      stats: TicketStats::default(),
      filter: ListFilter::default(),
      search_active: false,
      search_input: String::new(),
      list_cursor: 0,
      detail_scroll: 0,
      selected: None,
      create_form: CreateForm::default(),
      status_form: StatusForm::default(),
      status_msg: String::new(),
      client: Arc::new(client),
    }
  }

  // ── Data loading ──────────────────────────────────────────────────────────

  /// Reload the ticket list and stats with the current filters.
  pub async fn refresh(&mut self) -> anyhow::Result<()> {
    let tickets = self.client.list_tickets(&self.filter).await?;
    let stats = self.client.stats().await?;
    self.set_tickets(tickets);
    self.stats = stats;
    Ok(())
  }

  fn set_tickets(&mut self, tickets: Vec<Ticket>) {
    self.tickets = tickets;
    self.list_cursor = self.list_cursor.min(self.tickets.len().saturating_sub(1));
  }

  /// The ticket under the list cursor, if any.
  pub fn cursor_ticket(&self) -> Option<&Ticket> {
    self.tickets.get(self.list_cursor)
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event and run any resulting API call. Returns `true` to
  /// continue, `false` to quit. API failures are reported in the status bar.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    let action = self.on_key(key);
    if action == Action::Quit {
      return Ok(false);
    }
    if let Err(e) = self.perform(action).await {
      self.status_msg = format!("Error: {e}");
    }
    Ok(true)
  }

  async fn perform(&mut self, action: Action) -> anyhow::Result<()> {
    match action {
      Action::None | Action::Quit => {}
      Action::Refresh => {
        self.refresh().await?;
        self.status_msg.clear();
      }
      Action::OpenDetail(id) => {
        let ticket = self.client.get_ticket(id).await?;
        self.open_detail(ticket);
      }
      Action::Create(draft) => {
        let ticket = self.client.create_ticket(&draft).await?;
        self.create_form = CreateForm::default();
        self.status_msg = format!("Created {}", ticket.ticket_number);
        self.open_detail(ticket);
        self.refresh().await?;
      }
      Action::UpdateStatus(id, change) => {
        let ticket = self.client.update_status(id, &change).await?;
        self.status_msg =
          format!("{} is now {}", ticket.ticket_number, ticket.status);
        self.open_detail(ticket);
        self.refresh().await?;
      }
      Action::Delete(id) => {
        let result = self.client.delete_ticket(id).await;
        self.screen = Screen::Detail;
        result?;
        if let Some(t) = self.selected.take() {
          self.status_msg = format!("Deleted {}", t.ticket_number);
        }
        self.screen = Screen::List;
        self.refresh().await?;
      }
    }
    Ok(())
  }

  fn open_detail(&mut self, ticket: Ticket) {
    self.selected = Some(ticket);
    self.detail_scroll = 0;
    self.screen = Screen::Detail;
  }

  /// Update local state for `key` and return the API call it asks for.
  pub fn on_key(&mut self, key: KeyEvent) -> Action {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL)
      && key.code == KeyCode::Char('c')
    {
      return Action::Quit;
    }

    if self.search_active {
      return self.on_search_key(key);
    }

    match self.screen {
      Screen::List => self.on_list_key(key),
      Screen::Detail => self.on_detail_key(key),
      Screen::Create => self.on_create_key(key),
      Screen::Status => self.on_status_key(key),
      Screen::ConfirmDelete => self.on_confirm_key(key),
    }
  }

  fn on_search_key(&mut self, key: KeyEvent) -> Action {
    match key.code {
      KeyCode::Esc => {
        self.search_active = false;
        self.search_input.clear();
      }
      KeyCode::Enter => {
        self.search_active = false;
        self.filter.search = std::mem::take(&mut self.search_input);
        self.list_cursor = 0;
        return Action::Refresh;
      }
      KeyCode::Backspace => {
        self.search_input.pop();
      }
      KeyCode::Char(c) => self.search_input.push(c),
      _ => {}
    }
    Action::None
  }

  fn on_list_key(&mut self, key: KeyEvent) -> Action {
    match key.code {
      KeyCode::Char('q') => return Action::Quit,

      KeyCode::Down | KeyCode::Char('j') => {
        if self.list_cursor + 1 < self.tickets.len() {
          self.list_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.list_cursor = self.list_cursor.saturating_sub(1);
      }

      KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
        if let Some(id) = self.cursor_ticket().map(|t| t.id) {
          return Action::OpenDetail(id);
        }
      }

      KeyCode::Char('/') => {
        self.search_active = true;
        self.search_input = self.filter.search.clone();
      }
      KeyCode::Char('f') => {
        self.filter.status = cycle_filter(self.filter.status);
        self.list_cursor = 0;
        return Action::Refresh;
      }
      KeyCode::Char('p') => {
        self.filter.priority = cycle_filter(self.filter.priority);
        self.list_cursor = 0;
        return Action::Refresh;
      }
      KeyCode::Char('c') => {
        self.filter = ListFilter::default();
        self.list_cursor = 0;
        return Action::Refresh;
      }
      KeyCode::Char('r') => return Action::Refresh,

      KeyCode::Char('n') => {
        self.create_form = CreateForm::default();
        self.screen = Screen::Create;
      }

      _ => {}
    }
    Action::None
  }

  fn on_detail_key(&mut self, key: KeyEvent) -> Action {
    match key.code {
      KeyCode::Char('q') => return Action::Quit,

      KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') => {
        self.screen = Screen::List;
        self.selected = None;
      }

      KeyCode::Down | KeyCode::Char('j') => self.detail_scroll += 1,
      KeyCode::Up | KeyCode::Char('k') => {
        self.detail_scroll = self.detail_scroll.saturating_sub(1);
      }

      KeyCode::Char('s') => {
        if let Some(t) = &self.selected {
          self.status_form = StatusForm::for_ticket(t);
          self.screen = Screen::Status;
        }
      }
      KeyCode::Char('d') => {
        if self.selected.is_some() {
          self.screen = Screen::ConfirmDelete;
        }
      }
      KeyCode::Char('r') => {
        if let Some(id) = self.selected.as_ref().map(|t| t.id) {
          return Action::OpenDetail(id);
        }
      }

      _ => {}
    }
    Action::None
  }

  fn on_create_key(&mut self, key: KeyEvent) -> Action {
    let form = &mut self.create_form;
    match key.code {
      KeyCode::Esc => {
        self.screen = Screen::List;
        self.status_msg.clear();
      }
      KeyCode::Tab | KeyCode::Down => form.next_field(),
      KeyCode::BackTab | KeyCode::Up => form.prev_field(),
      KeyCode::Left if form.field == CreateField::Priority => {
        form.priority = step(form.priority, false);
      }
      KeyCode::Right if form.field == CreateField::Priority => {
        form.priority = step(form.priority, true);
      }
      KeyCode::Enter => {
        if form.field == CreateField::Priority {
          return Action::Create(form.draft());
        }
        form.next_field();
      }
      KeyCode::Backspace => {
        if let Some(text) = form.text_mut() {
          text.pop();
        }
      }
      KeyCode::Char(c) => {
        if let Some(text) = form.text_mut() {
          text.push(c);
        }
      }
      _ => {}
    }
    Action::None
  }

  fn on_status_key(&mut self, key: KeyEvent) -> Action {
    let form = &mut self.status_form;
    match key.code {
      KeyCode::Esc => {
        self.screen = Screen::Detail;
        self.status_msg.clear();
      }
      KeyCode::Tab | KeyCode::Down => form.next_field(),
      KeyCode::BackTab | KeyCode::Up => form.prev_field(),
      KeyCode::Left if form.field == StatusField::Status => {
        form.status = step(form.status, false);
      }
      KeyCode::Right if form.field == StatusField::Status => {
        form.status = step(form.status, true);
      }
      KeyCode::Enter => {
        if form.field == StatusField::Assignee {
          if let Some(id) = self.selected.as_ref().map(|t| t.id) {
            return Action::UpdateStatus(id, form.change());
          }
        } else {
          form.next_field();
        }
      }
      KeyCode::Backspace => {
        if let Some(text) = form.text_mut() {
          text.pop();
        }
      }
      KeyCode::Char(c) => {
        if let Some(text) = form.text_mut() {
          text.push(c);
        }
      }
      _ => {}
    }
    Action::None
  }

  fn on_confirm_key(&mut self, key: KeyEvent) -> Action {
    match (key.code, self.selected.as_ref()) {
      (KeyCode::Char('y') | KeyCode::Char('Y'), Some(t)) => Action::Delete(t.id),
      _ => {
        self.screen = Screen::Detail;
        Action::None
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use helpdesk_core::ticket::HistoryEntry;

  use super::*;
  use crate::client::ClientConfig;

  fn app() -> App {
    let client = ApiClient::new(ClientConfig {
      base_url: "http://localhost:5000".into(),
    })
    .unwrap();
    App::new(client)
  }

  fn key(code: KeyCode) -> KeyEvent { KeyEvent::new(code, KeyModifiers::NONE) }

  fn ticket(n: i64) -> Ticket {
    let now = Utc::now();
    Ticket {
      id:            Uuid::new_v4(),
      ticket_number: helpdesk_core::ticket::ticket_number(n),
      title:         format!("Ticket {n}"),
      description:   "body".into(),
      priority:      Priority::Medium,
      status:        Status::Open,
      assigned_to:   Some("agent-7".into()),
      history:       vec![HistoryEntry {
        status:      Status::Open,
        notes:       None,
        assigned_to: None,
        updated_by:  None,
        timestamp:   now,
      }],
      created_at:    now,
      updated_at:    now,
    }
  }

  fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
      app.on_key(key(KeyCode::Char(c)));
    }
  }

  #[test]
  fn filters_cycle_through_all_values() {
    let mut s = None;
    let mut seen = Vec::new();
    for _ in 0..4 {
      s = cycle_filter::<Status>(s);
      seen.push(s);
    }
    assert_eq!(
      seen,
      vec![
        Some(Status::Open),
        Some(Status::InProgress),
        Some(Status::Resolved),
        None
      ]
    );
    assert_eq!(step(Priority::High, true), Priority::Low);
    assert_eq!(step(Priority::Low, false), Priority::High);
  }

  #[test]
  fn ctrl_c_quits_everywhere() {
    let mut app = app();
    app.screen = Screen::Create;
    let action =
      app.on_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
    assert_eq!(action, Action::Quit);
  }

  #[test]
  fn list_navigation_and_open() {
    let mut app = app();
    app.tickets = vec![ticket(2), ticket(1)];

    app.on_key(key(KeyCode::Char('j')));
    app.on_key(key(KeyCode::Char('j')));
    assert_eq!(app.list_cursor, 1);

    let id = app.tickets[1].id;
    assert_eq!(app.on_key(key(KeyCode::Enter)), Action::OpenDetail(id));

    app.on_key(key(KeyCode::Char('k')));
    app.on_key(key(KeyCode::Char('k')));
    assert_eq!(app.list_cursor, 0);
  }

  #[test]
  fn filter_keys_request_refresh() {
    let mut app = app();
    assert_eq!(app.on_key(key(KeyCode::Char('f'))), Action::Refresh);
    assert_eq!(app.filter.status, Some(Status::Open));
    assert_eq!(app.on_key(key(KeyCode::Char('p'))), Action::Refresh);
    assert_eq!(app.filter.priority, Some(Priority::Low));
    assert_eq!(app.on_key(key(KeyCode::Char('c'))), Action::Refresh);
    assert!(app.filter.is_empty());
  }

  #[test]
  fn search_applies_on_enter() {
    let mut app = app();
    app.on_key(key(KeyCode::Char('/')));
    assert!(app.search_active);
    type_text(&mut app, "logx");
    app.on_key(key(KeyCode::Backspace));
    type_text(&mut app, "in");
    // Typing `q` while searching must not quit.
    assert_eq!(app.on_key(key(KeyCode::Char('q'))), Action::None);
    app.on_key(key(KeyCode::Backspace));

    assert_eq!(app.on_key(key(KeyCode::Enter)), Action::Refresh);
    assert!(!app.search_active);
    assert_eq!(app.filter.search, "login");
  }

  #[test]
  fn create_form_submits_from_priority_field() {
    let mut app = app();
    app.on_key(key(KeyCode::Char('n')));
    assert_eq!(app.screen, Screen::Create);

    type_text(&mut app, "Login issue");
    app.on_key(key(KeyCode::Tab));
    type_text(&mut app, "Cannot log in");
    app.on_key(key(KeyCode::Enter));
    assert_eq!(app.create_form.field, CreateField::Priority);
    app.on_key(key(KeyCode::Right));

    let action = app.on_key(key(KeyCode::Enter));
    assert_eq!(
      action,
      Action::Create(TicketDraft {
        title:       "Login issue".into(),
        description: "Cannot log in".into(),
        priority:    Priority::High,
      })
    );
  }

  #[test]
  fn status_form_is_prefilled_and_submits() {
    let mut app = app();
    let t = ticket(1);
    let id = t.id;
    app.selected = Some(t);
    app.screen = Screen::Detail;

    app.on_key(key(KeyCode::Char('s')));
    assert_eq!(app.screen, Screen::Status);
    assert_eq!(app.status_form.assigned_to, "agent-7");

    app.on_key(key(KeyCode::Right));
    app.on_key(key(KeyCode::Tab));
    type_text(&mut app, "Looking into it");
    app.on_key(key(KeyCode::Enter));

    let action = app.on_key(key(KeyCode::Enter));
    assert_eq!(
      action,
      Action::UpdateStatus(id, StatusChange {
        status:      Status::InProgress,
        notes:       "Looking into it".into(),
        assigned_to: "agent-7".into(),
      })
    );
  }

  #[test]
  fn delete_requires_confirmation() {
    let mut app = app();
    let t = ticket(1);
    let id = t.id;
    app.selected = Some(t);
    app.screen = Screen::Detail;

    app.on_key(key(KeyCode::Char('d')));
    assert_eq!(app.screen, Screen::ConfirmDelete);
    assert_eq!(app.on_key(key(KeyCode::Char('n'))), Action::None);
    assert_eq!(app.screen, Screen::Detail);

    app.on_key(key(KeyCode::Char('d')));
    assert_eq!(app.on_key(key(KeyCode::Char('y'))), Action::Delete(id));
  }

  #[test]
  fn escape_returns_to_list() {
    let mut app = app();
    app.selected = Some(ticket(1));
    app.screen = Screen::Detail;
    app.on_key(key(KeyCode::Esc));
    assert_eq!(app.screen, Screen::List);
    assert!(app.selected.is_none());
  }
}
