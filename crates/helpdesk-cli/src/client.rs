//! Async HTTP client wrapping the helpdesk JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use helpdesk_core::ticket::{Priority, Status, Ticket, TicketStats};
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Value, json};
use uuid::Uuid;

/// Connection settings for the helpdesk API.
#[derive(Debug, Clone)]
pub struct ClientConfig {
  pub base_url: String,
}

/// Filters applied to `GET /api/tickets`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
  pub status:   Option<Status>,
  pub priority: Option<Priority>,
  pub search:   String,
}

impl ListFilter {
  /// Query-string pairs for the set filters.
  pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
    let mut pairs = Vec::new();
    if let Some(status) = self.status {
      pairs.push(("status", status.to_string()));
    }
    if let Some(priority) = self.priority {
      pairs.push(("priority", priority.to_string()));
    }
    if !self.search.trim().is_empty() {
      pairs.push(("search", self.search.trim().to_string()));
    }
    pairs
  }

  pub fn is_empty(&self) -> bool { self.query_pairs().is_empty() }
}

/// A new ticket as entered in the create form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketDraft {
  pub title:       String,
  pub description: String,
  pub priority:    Priority,
}

/// A status change as entered in the status form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
  pub status:      Status,
  pub notes:       String,
  pub assigned_to: String,
}

#[derive(Deserialize)]
struct Envelope<T> {
  data: T,
}

#[derive(Deserialize)]
struct ErrorBody {
  message: Value,
}

/// Flatten an error body's `message` (a string or a list of strings).
fn error_message(body: &ErrorBody) -> Option<String> {
  match &body.message {
    Value::String(s) => Some(s.clone()),
    Value::Array(items) => {
      let parts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
      (!parts.is_empty()).then(|| parts.join("; "))
    }
    _ => None,
  }
}

/// Async HTTP client for the helpdesk JSON REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ClientConfig,
}

impl ApiClient {
  pub fn new(config: ClientConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.config.base_url.trim_end_matches('/'), path)
  }

  /// Send `req` and decode the `data` field of a success envelope. Error
  /// bodies are turned into their server-provided message.
  async fn fetch<T: DeserializeOwned>(
    req: RequestBuilder,
    what: &str,
  ) -> Result<T> {
    let resp = req.send().await.with_context(|| format!("{what} failed"))?;
    let resp = Self::check(resp, what).await?;
    let envelope: Envelope<T> = resp
      .json()
      .await
      .with_context(|| format!("deserialising {what} response"))?;
    Ok(envelope.data)
  }

  async fn check(resp: Response, what: &str) -> Result<Response> {
    if resp.status().is_success() {
      return Ok(resp);
    }
    let status = resp.status();
    let message = resp
      .json::<ErrorBody>()
      .await
      .ok()
      .as_ref()
      .and_then(error_message);
    Err(match message {
      Some(m) => anyhow!("{m}"),
      None => anyhow!("{what} → {status}"),
    })
  }

  // ── Tickets ───────────────────────────────────────────────────────────────

  /// `GET /api/tickets[?status=..&priority=..&search=..]`
  pub async fn list_tickets(&self, filter: &ListFilter) -> Result<Vec<Ticket>> {
    let req = self
      .client
      .get(self.url("/tickets"))
      .query(&filter.query_pairs());
    Self::fetch(req, "GET /tickets").await
  }

  /// `GET /api/tickets/stats`
  pub async fn stats(&self) -> Result<TicketStats> {
    Self::fetch(self.client.get(self.url("/tickets/stats")), "GET /tickets/stats")
      .await
  }

  /// `GET /api/tickets/:id`
  pub async fn get_ticket(&self, id: Uuid) -> Result<Ticket> {
    let req = self.client.get(self.url(&format!("/tickets/{id}")));
    Self::fetch(req, "GET /tickets/:id").await
  }

  /// `POST /api/tickets`
  pub async fn create_ticket(&self, draft: &TicketDraft) -> Result<Ticket> {
    let req = self.client.post(self.url("/tickets")).json(&json!({
      "title": draft.title,
      "description": draft.description,
      "priority": draft.priority,
    }));
    Self::fetch(req, "POST /tickets").await
  }

  /// `PUT /api/tickets/:id/status`
  pub async fn update_status(
    &self,
    id: Uuid,
    change: &StatusChange,
  ) -> Result<Ticket> {
    let mut body = json!({ "status": change.status });
    if !change.notes.trim().is_empty() {
      body["notes"] = json!(change.notes.trim());
    }
    if !change.assigned_to.trim().is_empty() {
      body["assignedTo"] = json!(change.assigned_to.trim());
    }
    let req = self
      .client
      .put(self.url(&format!("/tickets/{id}/status")))
      .json(&body);
    Self::fetch(req, "PUT /tickets/:id/status").await
  }

  /// `DELETE /api/tickets/:id`
  pub async fn delete_ticket(&self, id: Uuid) -> Result<()> {
    let resp = self
      .client
      .delete(self.url(&format!("/tickets/{id}")))
      .send()
      .await
      .context("DELETE /tickets/:id failed")?;
    Self::check(resp, "DELETE /tickets/:id").await?;
    Ok(())
  }
}
