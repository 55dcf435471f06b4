//! Ticket detail pane: right panel.

use chrono::{DateTime, Local, Utc};
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};

use super::{priority_color, status_color};
use crate::app::App;

fn local(ts: DateTime<Utc>) -> String {
  ts.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

fn field<'a>(label: &'a str, value: Span<'a>) -> Line<'a> {
  Line::from(vec![
    Span::styled(
      format!("{label:<12}"),
      Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ),
    value,
  ])
}

/// Render the selected ticket into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let Some(t) = &app.selected else {
    return;
  };

  let block = Block::default()
    .title(format!(" {} ", t.ticket_number))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let mut lines = vec![
    Line::from(Span::styled(
      t.title.clone(),
      Style::default().add_modifier(Modifier::BOLD),
    )),
    Line::from(""),
    field(
      "status",
      Span::styled(t.status.to_string(), Style::default().fg(status_color(t.status))),
    ),
    field(
      "priority",
      Span::styled(
        t.priority.to_string(),
        Style::default().fg(priority_color(t.priority)),
      ),
    ),
    field(
      "assigned to",
      Span::raw(t.assigned_to.clone().unwrap_or_else(|| "—".into())),
    ),
    field("created", Span::raw(local(t.created_at))),
    field("updated", Span::raw(local(t.updated_at))),
    Line::from(""),
  ];
  lines.extend(t.description.lines().map(|l| Line::from(l.to_string())));

  lines.push(Line::from(""));
  lines.push(Line::from(Span::styled(
    format!("History ({})", t.history.len()),
    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
  )));

  for entry in &t.history {
    let mut spans = vec![
      Span::styled(
        format!("{}  ", local(entry.timestamp)),
        Style::default().fg(Color::DarkGray),
      ),
      Span::styled(
        entry.status.to_string(),
        Style::default().fg(status_color(entry.status)),
      ),
    ];
    if let Some(who) = &entry.assigned_to {
      spans.push(Span::styled(
        format!("  → {who}"),
        Style::default().fg(Color::Gray),
      ));
    }
    if let Some(by) = &entry.updated_by {
      spans.push(Span::styled(
        format!("  by {by}"),
        Style::default().fg(Color::DarkGray),
      ));
    }
    lines.push(Line::from(spans));
    if let Some(notes) = &entry.notes {
      lines.push(Line::from(format!("    {notes}")));
    }
  }

  let para = Paragraph::new(lines)
    .wrap(Wrap { trim: false })
    .scroll((app.detail_scroll as u16, 0));
  f.render_widget(para, inner);
}
