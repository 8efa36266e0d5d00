//! SQL schema for the Roster SQLite store.
//!
//! Executed once at connection startup. The rollback journal is kept (no WAL)
//! so the database file alone is a complete snapshot for the backup agent.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = DELETE;

-- AUTOINCREMENT: ids are never reused after a delete.
-- (full_name, phone) is the duplicate key but is deliberately not UNIQUE;
-- callers check it before inserting.
CREATE TABLE IF NOT EXISTS customers (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    full_name     TEXT NOT NULL CHECK (full_name <> ''),
    phone         TEXT,
    email         TEXT,
    address       TEXT,
    registered_at TEXT NOT NULL    -- 'YYYY-MM-DD HH:MM:SS', local time
);

CREATE INDEX IF NOT EXISTS customers_key_idx        ON customers(full_name, phone);
CREATE INDEX IF NOT EXISTS customers_registered_idx ON customers(registered_at);

PRAGMA user_version = 1;
";
