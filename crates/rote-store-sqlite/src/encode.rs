//! Encoding and decoding helpers between Rust domain types and the plain
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microsecond
//! precision, `Z` suffix) so that lexical order in SQL matches chronological
//! order. UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use rote_core::{
  note::Note,
  review::{Difficulty, ReviewSchedule},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Integers ─────────────────────────────────────────────────────────────────

fn decode_u32(column: &str, v: i64) -> Result<u32> {
  u32::try_from(v).map_err(|_| Error::Decode(format!("{column} = {v}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawReview::from_row`].
pub const REVIEW_COLUMNS: &str = "review_id, user_id, note_id, topic, \
   difficulty_level, ease_factor, repetition_count, interval_days, \
   last_reviewed, next_review_date, created_at";

/// Raw values read directly from a `review_schedules` row.
pub struct RawReview {
  pub review_id:        String,
  pub user_id:          i64,
  pub note_id:          i64,
  pub topic:            String,
  pub difficulty_level: i64,
  pub ease_factor:      f64,
  pub repetition_count: i64,
  pub interval_days:    i64,
  pub last_reviewed:    String,
  pub next_review_date: String,
  pub created_at:       String,
}

impl RawReview {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      review_id:        row.get(0)?,
      user_id:          row.get(1)?,
      note_id:          row.get(2)?,
      topic:            row.get(3)?,
      difficulty_level: row.get(4)?,
      ease_factor:      row.get(5)?,
      repetition_count: row.get(6)?,
      interval_days:    row.get(7)?,
      last_reviewed:    row.get(8)?,
      next_review_date: row.get(9)?,
      created_at:       row.get(10)?,
    })
  }

  pub fn into_schedule(self) -> Result<ReviewSchedule> {
    Ok(ReviewSchedule {
      review_id:        decode_uuid(&self.review_id)?,
      user_id:          self.user_id,
      note_id:          self.note_id,
      topic:            self.topic,
      difficulty_level: Difficulty::try_from(self.difficulty_level)?,
      ease_factor:      self.ease_factor,
      repetition_count: decode_u32("repetition_count", self.repetition_count)?,
      interval_days:    decode_u32("interval_days", self.interval_days)?,
      last_reviewed:    decode_dt(&self.last_reviewed)?,
      next_review_date: decode_dt(&self.next_review_date)?,
      created_at:       decode_dt(&self.created_at)?,
    })
  }
}

/// Column list matching [`RawNote::from_row`].
pub const NOTE_COLUMNS: &str = "note_id, user_id, topic, content, uploaded_at";

/// Raw values read directly from a `notes` row.
pub struct RawNote {
  pub note_id:     i64,
  pub user_id:     i64,
  pub topic:       String,
  pub content:     String,
  pub uploaded_at: String,
}

impl RawNote {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      note_id:     row.get(0)?,
      user_id:     row.get(1)?,
      topic:       row.get(2)?,
      content:     row.get(3)?,
      uploaded_at: row.get(4)?,
    })
  }

  pub fn into_note(self) -> Result<Note> {
    Ok(Note {
      note_id:     self.note_id,
      user_id:     self.user_id,
      topic:       self.topic,
      content:     self.content,
      uploaded_at: decode_dt(&self.uploaded_at)?,
    })
  }
}
