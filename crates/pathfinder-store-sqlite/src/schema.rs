//! SQL schema for the PathFinder SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Reference data; never written by a generation run.
CREATE TABLE IF NOT EXISTS subjects (
    subject_id  INTEGER PRIMARY KEY,
    name        TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS streams (
    stream_id   INTEGER PRIMARY KEY,
    name        TEXT NOT NULL,
    active      INTEGER NOT NULL DEFAULT 1,
    rule_json   TEXT NOT NULL DEFAULT 'null'   -- untrusted until parsed
);

-- Derived table: cleared and refilled wholesale by every generation run.
CREATE TABLE IF NOT EXISTS valid_combinations (
    combination_id TEXT PRIMARY KEY,
    stream_id      INTEGER NOT NULL REFERENCES streams(stream_id),
    subject1       INTEGER NOT NULL REFERENCES subjects(subject_id),
    subject2       INTEGER NOT NULL REFERENCES subjects(subject_id),
    subject3       INTEGER NOT NULL REFERENCES subjects(subject_id),
    course_ids     TEXT NOT NULL DEFAULT '[]',  -- JSON array of course ids
    created_by     TEXT NOT NULL,
    created_at     TEXT NOT NULL,               -- ISO 8601 UTC
    updated_by     TEXT NOT NULL,
    updated_at     TEXT NOT NULL,
    UNIQUE (stream_id, subject1, subject2, subject3),
    CHECK  (subject1 < subject2 AND subject2 < subject3)
);

CREATE INDEX IF NOT EXISTS combinations_triple_idx
    ON valid_combinations(subject1, subject2, subject3);

PRAGMA user_version = 1;
";
