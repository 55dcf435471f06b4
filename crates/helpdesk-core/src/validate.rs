//! Field constraints for tickets.
//!
//! Every check pushes human-readable messages into a caller-owned list so
//! that a request with several problems reports all of them at once.

use std::str::FromStr;

use crate::{
  Error, Result,
  ticket::{NewTicket, Priority, Status, TicketPatch},
};

pub const TITLE_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 1000;

/// Check a title as it will be stored (i.e. already trimmed).
pub fn check_title(title: &str, errors: &mut Vec<String>) {
  if title.is_empty() {
    errors.push("Please add a title".into());
  } else if title.chars().count() > TITLE_MAX_CHARS {
    errors.push(format!("Title cannot exceed {TITLE_MAX_CHARS} characters"));
  }
}

pub fn check_description(description: &str, errors: &mut Vec<String>) {
  if description.trim().is_empty() {
    errors.push("Please add a description".into());
  } else if description.chars().count() > DESCRIPTION_MAX_CHARS {
    errors.push(format!(
      "Description cannot exceed {DESCRIPTION_MAX_CHARS} characters"
    ));
  }
}

pub fn parse_priority(raw: &str) -> Result<Priority, String> {
  Priority::from_str(raw.trim()).map_err(|_| {
    format!("`{raw}` is not a valid priority (expected low, medium or high)")
  })
}

pub fn parse_status(raw: &str) -> Result<Status, String> {
  Status::from_str(raw.trim()).map_err(|_| {
    format!(
      "`{raw}` is not a valid status (expected open, in-progress or resolved)"
    )
  })
}

fn finish(errors: Vec<String>) -> Result<()> {
  if errors.is_empty() { Ok(()) } else { Err(Error::Validation(errors)) }
}

impl NewTicket {
  /// Trim the title and check every constraint.
  pub fn normalized(mut self) -> Result<Self> {
    self.title = self.title.trim().to_owned();
    let mut errors = Vec::new();
    check_title(&self.title, &mut errors);
    check_description(&self.description, &mut errors);
    finish(errors)?;
    Ok(self)
  }
}

impl TicketPatch {
  /// Trim the title (if present) and check the fields being replaced.
  pub fn normalized(mut self) -> Result<Self> {
    let mut errors = Vec::new();
    if let Some(title) = self.title.as_mut() {
      *title = title.trim().to_owned();
      check_title(title, &mut errors);
    }
    if let Some(description) = &self.description {
      check_description(description, &mut errors);
    }
    if matches!(&self.assigned_to, Some(Some(a)) if a.trim().is_empty()) {
      self.assigned_to = Some(None);
    }
    finish(errors)?;
    Ok(self)
  }
}
