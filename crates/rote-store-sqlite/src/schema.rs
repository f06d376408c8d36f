//! SQL schema for the Rote SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA busy_timeout = 5000;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS notes (
    note_id     INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id     INTEGER NOT NULL,
    topic       TEXT    NOT NULL,
    content     TEXT    NOT NULL,
    uploaded_at TEXT    NOT NULL    -- RFC 3339 UTC, fixed width
);

-- One row per (user, note). note_id is not a foreign key: schedules may
-- point at notes held by another service, and deleting a schedule never
-- touches the note.
CREATE TABLE IF NOT EXISTS review_schedules (
    review_id        TEXT    PRIMARY KEY,
    user_id          INTEGER NOT NULL,
    note_id          INTEGER NOT NULL,
    topic            TEXT    NOT NULL,
    difficulty_level INTEGER NOT NULL,
    ease_factor      REAL    NOT NULL,
    repetition_count INTEGER NOT NULL,
    interval_days    INTEGER NOT NULL,
    last_reviewed    TEXT    NOT NULL,
    next_review_date TEXT    NOT NULL,
    created_at       TEXT    NOT NULL,
    UNIQUE (user_id, note_id),
    CHECK  (difficulty_level BETWEEN 1 AND 5),
    CHECK  (ease_factor BETWEEN 1.3 AND 3.0),
    CHECK  (repetition_count >= 1),
    CHECK  (interval_days >= 0),
    CHECK  (next_review_date >= last_reviewed)
);

CREATE INDEX IF NOT EXISTS review_schedules_due_idx
    ON review_schedules(user_id, next_review_date);
CREATE INDEX IF NOT EXISTS notes_user_idx ON notes(user_id);

PRAGMA user_version = 1;
";
