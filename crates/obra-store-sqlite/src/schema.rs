//! SQL schema for the Obra SQLite store.
//!
//! Executed once at connection startup. The snapshots themselves carry no
//! version; `PRAGMA user_version` tracks only the table layout.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per collection. `value` is the whole collection as a JSON array
-- and is replaced wholesale on every write.
CREATE TABLE IF NOT EXISTS slots (
    key         TEXT PRIMARY KEY,   -- 'obreiros' | 'pastores' | 'contribuicoes'
    value       TEXT NOT NULL,
    updated_at  TEXT NOT NULL       -- ISO 8601 UTC
);

PRAGMA user_version = 1;
";
