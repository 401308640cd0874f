//! SQL schema for the facegate SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS accounts (
    account_id         TEXT PRIMARY KEY,
    login_identifier   TEXT NOT NULL UNIQUE,
    face_login_enabled INTEGER NOT NULL DEFAULT 0,
    created_at         TEXT NOT NULL
);

-- Descriptors are never edited in place. Revocation flips is_active only.
CREATE TABLE IF NOT EXISTS face_descriptors (
    descriptor_id    TEXT PRIMARY KEY,
    account_id       TEXT NOT NULL REFERENCES accounts(account_id),
    descriptor_text  TEXT NOT NULL,
    is_active        INTEGER NOT NULL DEFAULT 1,
    source_image_ref TEXT,
    enrolled_at      TEXT NOT NULL     -- RFC 3339 UTC; server-assigned
);

CREATE INDEX IF NOT EXISTS descriptors_active_idx  ON face_descriptors(is_active, enrolled_at);
CREATE INDEX IF NOT EXISTS descriptors_account_idx ON face_descriptors(account_id);

PRAGMA user_version = 1;
";
