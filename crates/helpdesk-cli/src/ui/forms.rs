//! Create and status-change forms.

use std::fmt;

use helpdesk_core::ticket::{Priority, Status};
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};
use strum::IntoEnumIterator;

use super::{priority_color, status_color};
use crate::app::{App, CreateField, StatusField};

fn label(text: &str, active: bool) -> Span<'static> {
  let style = if active {
    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
  } else {
    Style::default().fg(Color::Cyan)
  };
  Span::styled(format!("{text:<13}"), style)
}

fn text_value(value: &str, active: bool) -> Span<'static> {
  if active {
    Span::raw(format!("{value}_"))
  } else {
    Span::raw(value.to_string())
  }
}

/// A row of choices with the current one highlighted.
fn choices<T>(current: T, color: fn(T) -> Color) -> Vec<Span<'static>>
where
  T: IntoEnumIterator + PartialEq + Copy + fmt::Display,
{
  T::iter()
    .map(|v| {
      let style = if v == current {
        Style::default()
          .fg(Color::Black)
          .bg(color(v))
          .add_modifier(Modifier::BOLD)
      } else {
        Style::default().fg(Color::DarkGray)
      };
      Span::styled(format!(" {v} "), style)
    })
    .collect()
}

fn form_block(title: &str) -> Block<'static> {
  Block::default()
    .title(format!(" {title} "))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Yellow))
}

/// Render the new-ticket form into `area`.
pub fn draw_create(f: &mut Frame, area: Rect, app: &App) {
  let form = &app.create_form;
  let block = form_block("New ticket");
  let inner = block.inner(area);
  f.render_widget(block, area);

  let mut priority_line =
    vec![label("priority", form.field == CreateField::Priority)];
  priority_line.extend(choices::<Priority>(form.priority, priority_color));

  let lines = vec![
    Line::from(vec![
      label("title", form.field == CreateField::Title),
      text_value(&form.title, form.field == CreateField::Title),
    ]),
    Line::from(""),
    Line::from(vec![
      label("description", form.field == CreateField::Description),
      text_value(&form.description, form.field == CreateField::Description),
    ]),
    Line::from(""),
    Line::from(priority_line),
  ];

  f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

/// Render the status-change form into `area`.
pub fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let form = &app.status_form;
  let block = form_block("Update status");
  let inner = block.inner(area);
  f.render_widget(block, area);

  let mut status_line = vec![label("status", form.field == StatusField::Status)];
  status_line.extend(choices::<Status>(form.status, status_color));

  let lines = vec![
    Line::from(status_line),
    Line::from(vec![
      label("notes", form.field == StatusField::Notes),
      text_value(&form.notes, form.field == StatusField::Notes),
    ]),
    Line::from(vec![
      label("assign to", form.field == StatusField::Assignee),
      text_value(&form.assigned_to, form.field == StatusField::Assignee),
    ]),
  ];

  f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}
