//! Handlers for `/tickets` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/tickets` | Optional `status`, `priority`, `search`, `limit`, `offset` |
//! | `GET`    | `/tickets/stats` | Counts by status |
//! | `GET`    | `/tickets/:id` | 404 if not found |
//! | `POST`   | `/tickets` | Body: [`CreateBody`]; returns 201 + stored ticket |
//! | `PUT`    | `/tickets/:id` | Body: [`UpdateBody`]; a status change is recorded in history |
//! | `PUT`    | `/tickets/:id/status` | Body: [`StatusBody`]; always appends history |
//! | `DELETE` | `/tickets/:id` | 404 if not found |
//!
//! Enum fields arrive as raw strings and are parsed here so that an invalid
//! value is reported alongside any other validation message.

use axum::{
  Json,
  extract::{
    Path, Query, State,
    rejection::{JsonRejection, PathRejection, QueryRejection},
  },
  http::StatusCode,
  response::IntoResponse,
};
use helpdesk_core::{
  store::{TicketQuery, TicketStore},
  ticket::{
    NewTicket, Priority, StatusUpdate, Ticket, TicketPatch,
    TicketStats,
  },
  validate::{parse_priority, parse_status},
};
use serde::{Deserialize, Deserializer};
use uuid::Uuid;

use crate::{
  AppState,
  envelope::{Data, List, Message},
  error::ApiError,
};

// ─── Extraction helpers ──────────────────────────────────────────────────────

fn ticket_id(path: Result<Path<Uuid>, PathRejection>) -> Result<Uuid, ApiError> {
  // An id that is not a UUID cannot name a ticket.
  path.map(|Path(id)| id).map_err(|_| ApiError::ticket_not_found())
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
  body
    .map(|Json(b)| b)
    .map_err(|e| ApiError::BadRequest(e.body_text()))
}

/// Trimmed, non-empty value of an optional string field.
fn non_blank(value: Option<String>) -> Option<String> {
  value
    .map(|v| v.trim().to_owned())
    .filter(|v| !v.is_empty())
}

fn parse_field<T>(
  raw: Option<&str>,
  parse: fn(&str) -> Result<T, String>,
  errors: &mut Vec<String>,
) -> Option<T> {
  match raw.map(parse) {
    Some(Ok(v)) => Some(v),
    Some(Err(msg)) => {
      errors.push(msg);
      None
    }
    None => None,
  }
}

/// Distinguishes an absent field (`None`) from an explicit `null`
/// (`Some(None)`).
fn double_option<'de, D>(de: D) -> Result<Option<Option<String>>, D::Error>
where
  D: Deserializer<'de>,
{
  Option::<String>::deserialize(de).map(Some)
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// Query string for `GET /tickets`. Everything is read as text so that empty
/// values (`?status=&search=`) mean "unset" rather than a parse failure.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  /// Exact status, or `all`.
  pub status:   Option<String>,
  /// Exact priority, or `all`.
  pub priority: Option<String>,
  pub search:   Option<String>,
  pub limit:    Option<String>,
  pub offset:   Option<String>,
}

fn filter_value(value: Option<String>) -> Option<String> {
  non_blank(value).filter(|v| !v.eq_ignore_ascii_case("all"))
}

fn parse_count(
  raw: Option<String>,
  name: &str,
  errors: &mut Vec<String>,
) -> Option<usize> {
  let raw = non_blank(raw)?;
  match raw.parse::<usize>() {
    Ok(n) => Some(n),
    Err(_) => {
      errors.push(format!("`{raw}` is not a valid {name}"));
      None
    }
  }
}

impl ListParams {
  /// Convert to a store query, clamping `limit` to `max_limit`. A `limit` of
  /// zero means the default page size.
  pub fn into_query(self, max_limit: usize) -> Result<TicketQuery, ApiError> {
    let mut errors = Vec::new();
    let status_raw = filter_value(self.status);
    let priority_raw = filter_value(self.priority);

    let status = parse_field(status_raw.as_deref(), parse_status, &mut errors);
    let priority =
      parse_field(priority_raw.as_deref(), parse_priority, &mut errors);
    let limit = parse_count(self.limit, "limit", &mut errors);
    let offset = parse_count(self.offset, "offset", &mut errors);

    if !errors.is_empty() {
      return Err(ApiError::Validation(errors));
    }

    Ok(TicketQuery {
      status,
      priority,
      search: non_blank(self.search),
      limit: Some(limit.filter(|&n| n > 0).unwrap_or(max_limit).min(max_limit)),
      offset,
    })
  }
}

/// `GET /tickets[?status=..][&priority=..][&search=..][&limit=..][&offset=..]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<List<Ticket>>, ApiError>
where
  S: TicketStore + 'static,
{
  let Query(params) =
    params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
  let query = params.into_query(state.config.list_limit)?;

  let tickets = state.store.list(&query).await.map_err(ApiError::from_store)?;
  Ok(Json(List::new(tickets)))
}

// ─── Stats ────────────────────────────────────────────────────────────────────

/// `GET /tickets/stats`
pub async fn stats<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Data<TicketStats>>, ApiError>
where
  S: TicketStore + 'static,
{
  let stats = state.store.stats().await.map_err(ApiError::from_store)?;
  Ok(Json(Data::new(stats)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /tickets/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Data<Ticket>>, ApiError>
where
  S: TicketStore + 'static,
{
  let id = ticket_id(path)?;
  let ticket = state
    .store
    .get(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(ApiError::ticket_not_found)?;
  Ok(Json(Data::new(ticket)))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /tickets`.
#[derive(Debug, Default, Deserialize)]
pub struct CreateBody {
  pub title:       Option<String>,
  pub description: Option<String>,
  pub priority:    Option<String>,
}

impl CreateBody {
  pub fn into_new_ticket(self) -> Result<NewTicket, ApiError> {
    let mut errors = Vec::new();
    let priority =
      parse_field(self.priority.as_deref(), parse_priority, &mut errors);

    let input = NewTicket {
      title:       self.title.unwrap_or_default(),
      description: self.description.unwrap_or_default(),
      priority:    priority.unwrap_or_default(),
    };
    if let Err(helpdesk_core::Error::Validation(more)) =
      input.clone().normalized()
    {
      errors.extend(more);
    }

    if errors.is_empty() {
      Ok(input)
    } else {
      Err(ApiError::Validation(errors))
    }
  }
}

/// `POST /tickets`: returns 201 + the stored [`Ticket`].
pub async fn create<S>(
  State(state): State<AppState<S>>,
  body: Result<Json<CreateBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TicketStore + 'static,
{
  let input = json_body(body)?.into_new_ticket()?;
  let ticket = state.store.create(input).await.map_err(ApiError::from_store)?;

  tracing::info!(ticket = %ticket.ticket_number, id = %ticket.id, "ticket created");
  Ok((StatusCode::CREATED, Json(Data::new(ticket))))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `PUT /tickets/:id`. Unknown and immutable fields
/// (`id`, `ticketNumber`, `history`, timestamps) are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBody {
  pub title:       Option<String>,
  pub description: Option<String>,
  pub priority:    Option<String>,
  pub status:      Option<String>,
  /// `null` clears the assignee; absence leaves it unchanged.
  #[serde(default, deserialize_with = "double_option")]
  pub assigned_to: Option<Option<String>>,
  /// Recorded on the history entry when `status` changes.
  pub notes:       Option<String>,
  pub updated_by:  Option<String>,
}

impl UpdateBody {
  /// Validate every field and build a single patch; a `status` becomes a
  /// status change carrying `notes` and `updatedBy`.
  pub fn into_patch(self) -> Result<TicketPatch, ApiError> {
    let mut errors = Vec::new();
    let priority: Option<Priority> =
      parse_field(self.priority.as_deref(), parse_priority, &mut errors);
    let status = parse_field(self.status.as_deref(), parse_status, &mut errors);
    let notes = non_blank(self.notes);
    let updated_by = non_blank(self.updated_by);

    let patch = TicketPatch {
      title: self.title,
      description: self.description,
      priority,
      status: status.map(|status| StatusUpdate {
        status,
        notes,
        assigned_to: None,
        updated_by,
      }),
      assigned_to: self.assigned_to,
    };
    let patch = match patch.normalized() {
      Ok(p) => p,
      Err(helpdesk_core::Error::Validation(more)) => {
        errors.extend(more);
        TicketPatch::default()
      }
      Err(other) => return Err(ApiError::from_store(other)),
    };

    if errors.is_empty() {
      Ok(patch)
    } else {
      Err(ApiError::Validation(errors))
    }
  }
}

/// `PUT /tickets/:id`: partial update in one store call. A `status`
/// different from the current one appends a history entry (with `notes`, if
/// given); other fields are replaced without touching history.
pub async fn update<S>(
  State(state): State<AppState<S>>,
  path: Result<Path<Uuid>, PathRejection>,
  body: Result<Json<UpdateBody>, JsonRejection>,
) -> Result<Json<Data<Ticket>>, ApiError>
where
  S: TicketStore + 'static,
{
  let id = ticket_id(path)?;
  let patch = json_body(body)?.into_patch()?;

  let ticket = if patch.is_empty() {
    state
      .store
      .get(id)
      .await
      .map_err(ApiError::from_store)?
      .ok_or_else(ApiError::ticket_not_found)?
  } else {
    state.store.update(id, patch).await.map_err(ApiError::from_store)?
  };

  tracing::info!(ticket = %ticket.ticket_number, "ticket updated");
  Ok(Json(Data::new(ticket)))
}

// ─── Status ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `PUT /tickets/:id/status`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBody {
  pub status:      Option<String>,
  pub assigned_to: Option<String>,
  pub notes:       Option<String>,
  pub updated_by:  Option<String>,
}

impl StatusBody {
  pub fn into_status_update(self) -> Result<StatusUpdate, ApiError> {
    let raw = self
      .status
      .ok_or_else(|| ApiError::Validation(vec!["Status is required".into()]))?;
    let status = parse_status(&raw).map_err(|m| ApiError::Validation(vec![m]))?;

    Ok(StatusUpdate {
      status,
      notes: non_blank(self.notes),
      assigned_to: non_blank(self.assigned_to),
      updated_by: non_blank(self.updated_by),
    })
  }
}

/// `PUT /tickets/:id/status`: body: `{"status": "...", "notes"?, "assignedTo"?}`
pub async fn update_status<S>(
  State(state): State<AppState<S>>,
  path: Result<Path<Uuid>, PathRejection>,
  body: Result<Json<StatusBody>, JsonRejection>,
) -> Result<Json<Data<Ticket>>, ApiError>
where
  S: TicketStore + 'static,
{
  let id = ticket_id(path)?;
  let change = json_body(body)?.into_status_update()?;

  let ticket = state
    .store
    .update_status(id, change)
    .await
    .map_err(ApiError::from_store)?;

  tracing::info!(
    ticket = %ticket.ticket_number,
    status = %ticket.status,
    "ticket status changed"
  );
  Ok(Json(Data::new(ticket)))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /tickets/:id`: 404 if the ticket does not exist.
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Message>, ApiError>
where
  S: TicketStore + 'static,
{
  let id = ticket_id(path)?;
  state.store.delete(id).await.map_err(ApiError::from_store)?;

  tracing::info!(%id, "ticket deleted");
  Ok(Json(Message::new("Ticket removed")))
}
