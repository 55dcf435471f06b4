//! SQL schema for the helpdesk SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS` / `OR IGNORE`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Monotonic counters. Incremented inside the transaction that consumes the
-- value, so a number is never handed out twice, even after deletes.
CREATE TABLE IF NOT EXISTS sequences (
    name   TEXT PRIMARY KEY,
    value  INTEGER NOT NULL
);

INSERT OR IGNORE INTO sequences (name, value) VALUES ('ticket_number', 0);

CREATE TABLE IF NOT EXISTS tickets (
    ticket_id      TEXT PRIMARY KEY,
    seq            INTEGER NOT NULL UNIQUE,
    ticket_number  TEXT NOT NULL UNIQUE,
    title          TEXT NOT NULL,
    description    TEXT NOT NULL,
    priority       TEXT NOT NULL DEFAULT 'medium'
                   CHECK (priority IN ('low', 'medium', 'high')),
    status         TEXT NOT NULL DEFAULT 'open'
                   CHECK (status IN ('open', 'in-progress', 'resolved')),
    assigned_to    TEXT,
    created_at     TEXT NOT NULL,   -- RFC 3339 UTC, fixed width
    updated_at     TEXT NOT NULL
);

-- Append-only. entry_id order is chronological order.
CREATE TABLE IF NOT EXISTS ticket_history (
    entry_id     INTEGER PRIMARY KEY AUTOINCREMENT,
    ticket_id    TEXT NOT NULL REFERENCES tickets(ticket_id) ON DELETE CASCADE,
    status       TEXT NOT NULL,
    notes        TEXT,
    assigned_to  TEXT,
    updated_by   TEXT,
    recorded_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS tickets_created_idx  ON tickets(created_at);
CREATE INDEX IF NOT EXISTS tickets_status_idx   ON tickets(status);
CREATE INDEX IF NOT EXISTS history_ticket_idx   ON ticket_history(ticket_id, entry_id);

PRAGMA user_version = 1;
";
