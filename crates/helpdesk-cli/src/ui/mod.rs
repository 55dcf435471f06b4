//! TUI rendering: orchestrates all panes.

pub mod forms;
pub mod ticket_detail;
pub mod ticket_list;

use helpdesk_core::ticket::{Priority, Status};
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};

use crate::app::{App, Screen};

// ─── Palette ──────────────────────────────────────────────────────────────────

pub fn status_color(status: Status) -> Color {
  match status {
    Status::Open => Color::Yellow,
    Status::InProgress => Color::Cyan,
    Status::Resolved => Color::Green,
  }
}

pub fn priority_color(priority: Priority) -> Color {
  match priority {
    Priority::Low => Color::DarkGray,
    Priority::Medium => Color::White,
    Priority::High => Color::Red,
  }
}

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let area = f.area();

  // Vertical stack: header, body, status bar.
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(area);

  draw_header(f, rows[0], app);
  draw_body(f, rows[1], app);
  draw_status(f, rows[2], app);
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
  let left = Span::styled(
    " helpdesk  [n] new  [/] search  [q] quit",
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let stats = &app.stats;
  let right = Span::styled(
    format!(
      "total {}  open {}  in progress {}  resolved {} ",
      stats.total, stats.open, stats.in_progress, stats.resolved
    ),
    Style::default().fg(Color::Gray),
  );

  // Simple left-right header: pad the middle.
  let pad = area
    .width
    .saturating_sub(left.width() as u16)
    .saturating_sub(right.width() as u16);

  let line = Line::from(vec![left, Span::raw(" ".repeat(pad as usize)), right]);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(line), inner);
}

// ─── Body ─────────────────────────────────────────────────────────────────────

fn draw_body(f: &mut Frame, area: Rect, app: &App) {
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
    .split(area);

  ticket_list::draw(f, cols[0], app);

  match app.screen {
    Screen::Create => forms::draw_create(f, cols[1], app),
    Screen::Status => {
      let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(7)])
        .split(cols[1]);
      ticket_detail::draw(f, right[0], app);
      forms::draw_status(f, right[1], app);
    }
    _ if app.selected.is_some() => ticket_detail::draw(f, cols[1], app),
    _ => draw_empty_detail(f, cols[1]),
  }
}

fn draw_empty_detail(f: &mut Frame, area: Rect) {
  let block = Block::default()
    .title(" Detail ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(
    Paragraph::new(Line::from(vec![Span::styled(
      "Select a ticket and press Enter.",
      Style::default().fg(Color::DarkGray),
    )])),
    inner,
  );
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let confirm;
  let (mode_label, hints) = match app.screen {
    _ if app.search_active => ("SEARCH", "Type a term  Enter apply  Esc cancel"),
    Screen::List => (
      "LIST",
      "↑↓/jk move  Enter open  f status  p priority  c clear  r refresh  n new  q quit",
    ),
    Screen::Detail => (
      "DETAIL",
      "↑↓/jk scroll  s status  d delete  r reload  Esc back  q quit",
    ),
    Screen::Create => (
      "NEW",
      "Tab next field  ←→ priority  Enter on priority submits  Esc cancel",
    ),
    Screen::Status => (
      "STATUS",
      "Tab next field  ←→ status  Enter on assignee submits  Esc cancel",
    ),
    Screen::ConfirmDelete => {
      let number = app
        .selected
        .as_ref()
        .map(|t| t.ticket_number.as_str())
        .unwrap_or_default();
      confirm = format!("Delete {number}? y to confirm, any other key cancels");
      ("DELETE", confirm.as_str())
    }
  };

  let status = if app.status_msg.is_empty() || app.screen == Screen::ConfirmDelete {
    hints.to_string()
  } else {
    app.status_msg.clone()
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );
  let hint_span = Span::styled(
    format!("  {status}"),
    Style::default().fg(Color::Gray),
  );

  let line = Line::from(vec![mode_span, hint_span]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}
