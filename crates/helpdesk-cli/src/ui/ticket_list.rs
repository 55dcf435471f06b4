//! Ticket list pane: left panel.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use super::{priority_color, status_color};
use crate::app::{App, Screen};

/// Human-readable summary of the active filters, or `None` when unfiltered.
fn filter_summary(app: &App) -> Option<String> {
  let mut parts = Vec::new();
  if let Some(s) = app.filter.status {
    parts.push(format!("status={s}"));
  }
  if let Some(p) = app.filter.priority {
    parts.push(format!("priority={p}"));
  }
  if !app.filter.search.is_empty() {
    parts.push(format!("\"{}\"", app.filter.search));
  }
  (!parts.is_empty()).then(|| parts.join(" "))
}

/// Render the ticket list into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let focused = app.screen == Screen::List;

  let block = Block::default()
    .title(format!(" Tickets ({}) ", app.tickets.len()))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(if focused {
      Color::Gray
    } else {
      Color::DarkGray
    }));

  let items: Vec<ListItem> = app
    .tickets
    .iter()
    .map(|t| {
      ListItem::new(Line::from(vec![
        Span::styled(
          format!("{} ", t.ticket_number),
          Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
          format!("{:<11} ", t.status.to_string()),
          Style::default().fg(status_color(t.status)),
        ),
        Span::styled(
          format!("{:<6} ", t.priority.to_string()),
          Style::default().fg(priority_color(t.priority)),
        ),
        Span::raw(t.title.clone()),
      ]))
    })
    .collect();

  let mut inner_area = block.inner(area);
  f.render_widget(block, area);

  // Filter / search bar on the last line of the pane.
  let bar = if app.search_active {
    Some((format!("/{}_", app.search_input), Color::Yellow))
  } else {
    filter_summary(app).map(|s| (s, Color::Magenta))
  };
  if let Some((text, color)) = bar
    && inner_area.height > 2
  {
    let bar_area = Rect {
      x:      inner_area.x,
      y:      inner_area.y + inner_area.height - 1,
      width:  inner_area.width,
      height: 1,
    };
    inner_area.height -= 1;
    f.render_widget(
      Paragraph::new(text).style(Style::default().fg(color)),
      bar_area,
    );
  }

  if app.tickets.is_empty() {
    f.render_widget(
      Paragraph::new("No tickets.").style(Style::default().fg(Color::DarkGray)),
      inner_area,
    );
    return;
  }

  let mut state = ListState::default();
  state.select(Some(app.list_cursor));

  f.render_stateful_widget(
    List::new(items).highlight_style(
      Style::default()
        .bg(if focused { Color::Blue } else { Color::DarkGray })
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    ),
    inner_area,
    &mut state,
  );
}
