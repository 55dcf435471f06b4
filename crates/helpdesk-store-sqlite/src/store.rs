//! [`SqliteStore`]: the SQLite implementation of [`TicketStore`].

use std::path::Path;

use rusqlite::{OptionalExtension as _, functions::FunctionFlags};
use uuid::Uuid;

use helpdesk_core::{
  store::{DEFAULT_LIST_LIMIT, TicketQuery, TicketStore},
  ticket::{
    HistoryEntry, NewTicket, Status, StatusUpdate, Ticket, TicketPatch,
    TicketStats, ticket_number,
  },
};

use crate::{
  Error, Result,
  encode::{
    RawHistoryEntry, RawTicket, decode_status, encode_dt, encode_priority,
    encode_status, encode_uuid, like_pattern, now,
  },
  schema::SCHEMA,
};

const TICKET_COLUMNS: &str = "ticket_id, ticket_number, title, description, \
                              priority, status, assigned_to, created_at, \
                              updated_at";

// ─── Row helpers ─────────────────────────────────────────────────────────────
//
// These run on the database thread, inside `Connection::call` closures.

fn read_ticket_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawTicket> {
  Ok(RawTicket {
    ticket_id:     row.get(0)?,
    ticket_number: row.get(1)?,
    title:         row.get(2)?,
    description:   row.get(3)?,
    priority:      row.get(4)?,
    status:        row.get(5)?,
    assigned_to:   row.get(6)?,
    created_at:    row.get(7)?,
    updated_at:    row.get(8)?,
  })
}

fn load_history(
  conn: &rusqlite::Connection,
  ticket_id: &str,
) -> rusqlite::Result<Vec<RawHistoryEntry>> {
  let mut stmt = conn.prepare_cached(
    "SELECT status, notes, assigned_to, updated_by, recorded_at
     FROM ticket_history
     WHERE ticket_id = ?1
     ORDER BY entry_id ASC",
  )?;
  stmt
    .query_map(rusqlite::params![ticket_id], |row| {
      Ok(RawHistoryEntry {
        status:      row.get(0)?,
        notes:       row.get(1)?,
        assigned_to: row.get(2)?,
        updated_by:  row.get(3)?,
        recorded_at: row.get(4)?,
      })
    })?
    .collect()
}

type RawFullTicket = (RawTicket, Vec<RawHistoryEntry>);

fn load_ticket(
  conn: &rusqlite::Connection,
  ticket_id: &str,
) -> rusqlite::Result<Option<RawFullTicket>> {
  let raw = conn
    .query_row(
      &format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE ticket_id = ?1"),
      rusqlite::params![ticket_id],
      read_ticket_row,
    )
    .optional()?;

  match raw {
    Some(raw) => {
      let history = load_history(conn, ticket_id)?;
      Ok(Some((raw, history)))
    }
    None => Ok(None),
  }
}

fn insert_history(
  conn: &rusqlite::Connection,
  ticket_id: &str,
  entry: &HistoryEntry,
) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO ticket_history (
       ticket_id, status, notes, assigned_to, updated_by, recorded_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    rusqlite::params![
      ticket_id,
      encode_status(entry.status),
      entry.notes,
      entry.assigned_to,
      entry.updated_by,
      encode_dt(entry.timestamp),
    ],
  )?;
  Ok(())
}

/// Register `lower_unicode(text)`, a lowercase that folds every script
/// rather than only ASCII. Search compares through it.
fn register_functions(conn: &rusqlite::Connection) -> rusqlite::Result<()> {
  conn.create_scalar_function(
    "lower_unicode",
    1,
    FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
    |ctx| {
      let text: Option<String> = ctx.get(0)?;
      Ok(text.map(|t| t.to_lowercase()))
    },
  )
}

fn decode_full(raw: Option<RawFullTicket>, id: Uuid) -> Result<Ticket> {
  let (raw, history) = raw.ok_or_else(|| Error::not_found(id))?;
  raw.into_ticket(history)
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A helpdesk ticket store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted. Every call is
/// executed on the connection's own thread, one at a time; multi-statement
/// writes additionally run inside a transaction.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init().await?;
    Ok(store)
  }

  /// Open an in-memory store: useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init().await?;
    Ok(store)
  }

  async fn init(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        register_functions(conn)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── TicketStore impl ────────────────────────────────────────────────────────

impl TicketStore for SqliteStore {
  type Error = Error;

  async fn list(&self, query: &TicketQuery) -> Result<Vec<Ticket>> {
    let status_str   = query.status.map(encode_status);
    let priority_str = query.priority.map(encode_priority);
    let pattern      = query
      .search
      .as_deref()
      .map(str::trim)
      .filter(|t| !t.is_empty())
      .map(|t| like_pattern(&t.to_lowercase()));
    let limit_val    = query.limit.unwrap_or(DEFAULT_LIST_LIMIT) as i64;
    let offset_val   = query.offset.unwrap_or(0) as i64;

    let raws: Vec<RawFullTicket> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {TICKET_COLUMNS}
           FROM tickets
           WHERE (?1 IS NULL OR status = ?1)
             AND (?2 IS NULL OR priority = ?2)
             AND (?3 IS NULL
                  OR lower_unicode(title)         LIKE ?3 ESCAPE '\\'
                  OR lower_unicode(description)   LIKE ?3 ESCAPE '\\'
                  OR lower_unicode(ticket_number) LIKE ?3 ESCAPE '\\')
           ORDER BY created_at DESC, seq DESC
           LIMIT ?4 OFFSET ?5"
        );

        let mut stmt = conn.prepare(&sql)?;
        let tickets = stmt
          .query_map(
            rusqlite::params![
              status_str,
              priority_str,
              pattern.as_deref(),
              limit_val,
              offset_val,
            ],
            read_ticket_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut out = Vec::with_capacity(tickets.len());
        for raw in tickets {
          let history = load_history(conn, &raw.ticket_id)?;
          out.push((raw, history));
        }
        Ok(out)
      })
      .await?;

    raws
      .into_iter()
      .map(|(raw, history)| raw.into_ticket(history))
      .collect()
  }

  async fn get(&self, id: Uuid) -> Result<Option<Ticket>> {
    let id_str = encode_uuid(id);

    let raw = self
      .conn
      .call(move |conn| Ok(load_ticket(conn, &id_str)?))
      .await?;

    raw
      .map(|(raw, history)| raw.into_ticket(history))
      .transpose()
  }

  async fn create(&self, input: NewTicket) -> Result<Ticket> {
    let input = input.normalized()?;
    let created_at = now();

    let initial = HistoryEntry {
      status:      Status::Open,
      notes:       None,
      assigned_to: None,
      updated_by:  None,
      timestamp:   created_at,
    };

    let mut ticket = Ticket {
      id:            Uuid::new_v4(),
      ticket_number: String::new(),
      title:         input.title,
      description:   input.description,
      priority:      input.priority,
      status:        initial.status,
      assigned_to:   None,
      history:       vec![initial],
      created_at,
      updated_at:    created_at,
    };

    let row = ticket.clone();
    let seq: i64 = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        tx.execute(
          "UPDATE sequences SET value = value + 1 WHERE name = 'ticket_number'",
          [],
        )?;
        let seq: i64 = tx.query_row(
          "SELECT value FROM sequences WHERE name = 'ticket_number'",
          [],
          |r| r.get(0),
        )?;

        let id_str = encode_uuid(row.id);
        tx.execute(
          "INSERT INTO tickets (
             ticket_id, seq, ticket_number, title, description,
             priority, status, assigned_to, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
          rusqlite::params![
            id_str,
            seq,
            ticket_number(seq),
            row.title,
            row.description,
            encode_priority(row.priority),
            encode_status(row.status),
            row.assigned_to,
            encode_dt(row.created_at),
            encode_dt(row.updated_at),
          ],
        )?;
        for entry in &row.history {
          insert_history(&tx, &id_str, entry)?;
        }

        tx.commit()?;
        Ok(seq)
      })
      .await?;

    ticket.ticket_number = ticket_number(seq);
    Ok(ticket)
  }

  async fn update(&self, id: Uuid, patch: TicketPatch) -> Result<Ticket> {
    let patch  = patch.normalized()?;
    let id_str = encode_uuid(id);
    let at     = now();

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let Some((mut current, _)) = load_ticket(&tx, &id_str)? else {
          return Ok(None);
        };

        if let Some(title) = patch.title {
          current.title = title;
        }
        if let Some(description) = patch.description {
          current.description = description;
        }
        if let Some(priority) = patch.priority {
          current.priority = encode_priority(priority).to_owned();
        }
        if let Some(assigned_to) = patch.assigned_to {
          current.assigned_to = assigned_to;
        }

        // Compared against the row read in this transaction.
        if let Some(change) = patch.status
          && encode_status(change.status) != current.status
        {
          if change.assigned_to.is_some() {
            current.assigned_to = change.assigned_to.clone();
          }
          let entry = HistoryEntry {
            status:      change.status,
            notes:       change.notes,
            assigned_to: change.assigned_to,
            updated_by:  change.updated_by,
            timestamp:   at,
          };
          insert_history(&tx, &id_str, &entry)?;
          current.status = encode_status(entry.status).to_owned();
        }

        tx.execute(
          "UPDATE tickets
           SET title = ?2, description = ?3, priority = ?4, status = ?5,
               assigned_to = ?6, updated_at = ?7
           WHERE ticket_id = ?1",
          rusqlite::params![
            id_str,
            current.title,
            current.description,
            current.priority,
            current.status,
            current.assigned_to,
            encode_dt(at),
          ],
        )?;

        let updated = load_ticket(&tx, &id_str)?;
        tx.commit()?;
        Ok(updated)
      })
      .await?;

    decode_full(raw, id)
  }

  async fn update_status(
    &self,
    id:     Uuid,
    update: StatusUpdate,
  ) -> Result<Ticket> {
    let id_str = encode_uuid(id);
    let entry  = HistoryEntry {
      status:      update.status,
      notes:       update.notes,
      assigned_to: update.assigned_to,
      updated_by:  update.updated_by,
      timestamp:   now(),
    };

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let exists = tx
          .query_row(
            "SELECT 1 FROM tickets WHERE ticket_id = ?1",
            rusqlite::params![id_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if !exists {
          return Ok(None);
        }

        insert_history(&tx, &id_str, &entry)?;
        tx.execute(
          "UPDATE tickets
           SET status = ?2,
               assigned_to = COALESCE(?3, assigned_to),
               updated_at = ?4
           WHERE ticket_id = ?1",
          rusqlite::params![
            id_str,
            encode_status(entry.status),
            entry.assigned_to,
            encode_dt(entry.timestamp),
          ],
        )?;

        let updated = load_ticket(&tx, &id_str)?;
        tx.commit()?;
        Ok(updated)
      })
      .await?;

    decode_full(raw, id)
  }

  async fn delete(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    let removed = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "DELETE FROM ticket_history WHERE ticket_id = ?1",
          rusqlite::params![id_str],
        )?;
        let removed = tx.execute(
          "DELETE FROM tickets WHERE ticket_id = ?1",
          rusqlite::params![id_str],
        )?;
        tx.commit()?;
        Ok(removed)
      })
      .await?;

    if removed == 0 {
      return Err(Error::not_found(id));
    }
    Ok(())
  }

  async fn stats(&self) -> Result<TicketStats> {
    let rows: Vec<(String, i64)> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT status, COUNT(*) FROM tickets GROUP BY status")?;
        let rows = stmt
          .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut stats = TicketStats::default();
    for (status, count) in rows {
      let count = count as u64;
      match decode_status(&status)? {
        Status::Open => stats.open = count,
        Status::InProgress => stats.in_progress = count,
        Status::Resolved => stats.resolved = count,
      }
      stats.total += count;
    }
    Ok(stats)
  }
}
