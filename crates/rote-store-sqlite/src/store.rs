//! [`SqliteStore`] — the SQLite implementation of [`ReviewStore`] and
//! [`NoteStore`].

use std::{path::Path, sync::Arc};

use chrono::{DateTime, SubsecRound as _, Utc};
use rusqlite::{OptionalExtension as _, TransactionBehavior};
use uuid::Uuid;

use rote_core::{
  clock::{Clock, SystemClock},
  note::{NewNote, Note},
  review::{NewReview, NoteId, ReviewSchedule, UserId},
  scheduler::{ReviewScheduler, ReviewState},
  store::{NoteStore, ReviewStore},
};

use crate::{
  Error, Result,
  encode::{NOTE_COLUMNS, RawNote, RawReview, REVIEW_COLUMNS, encode_dt, encode_uuid},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Rote review store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection and clock are reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
  clock:     Arc<dyn Clock>,
  scheduler: ReviewScheduler,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn).await
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn).await
  }

  async fn init(conn: tokio_rusqlite::Connection) -> Result<Self> {
    conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(Self {
      conn,
      clock: Arc::new(SystemClock),
      scheduler: ReviewScheduler::default(),
    })
  }

  /// Replace the time source (defaults to the system clock).
  pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
    self.clock = clock;
    self
  }

  /// Replace the scheduler (defaults to [`ReviewScheduler::default`]).
  pub fn with_scheduler(mut self, scheduler: ReviewScheduler) -> Self {
    self.scheduler = scheduler;
    self
  }

  async fn select_reviews(
    &self,
    sql: String,
    user_id: UserId,
    as_of: Option<DateTime<Utc>>,
  ) -> Result<Vec<ReviewSchedule>> {
    let as_of_str = as_of.map(encode_dt);

    let raws: Vec<RawReview> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = match as_of_str {
          Some(at) => stmt
            .query_map(rusqlite::params![user_id, at], RawReview::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?,
          None => stmt
            .query_map(rusqlite::params![user_id], RawReview::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?,
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawReview::into_schedule).collect()
  }
}

/// Write a freshly computed schedule, inserting or updating by the
/// `(user_id, note_id)` key.
fn write_schedule(
  tx: &rusqlite::Transaction<'_>,
  s: &ReviewSchedule,
  is_new: bool,
) -> rusqlite::Result<()> {
  let difficulty = i64::from(s.difficulty_level.level());
  let repetitions = i64::from(s.repetition_count);
  let interval = i64::from(s.interval_days);
  let last_reviewed = encode_dt(s.last_reviewed);
  let next_review = encode_dt(s.next_review_date);

  if is_new {
    tx.execute(
      "INSERT INTO review_schedules (
         review_id, user_id, note_id, topic, difficulty_level, ease_factor,
         repetition_count, interval_days, last_reviewed, next_review_date,
         created_at
       ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
      rusqlite::params![
        encode_uuid(s.review_id),
        s.user_id,
        s.note_id,
        s.topic,
        difficulty,
        s.ease_factor,
        repetitions,
        interval,
        last_reviewed,
        next_review,
        encode_dt(s.created_at),
      ],
    )?;
  } else {
    tx.execute(
      "UPDATE review_schedules
          SET difficulty_level = ?3,
              ease_factor      = ?4,
              repetition_count = ?5,
              interval_days    = ?6,
              last_reviewed    = ?7,
              next_review_date = ?8
        WHERE user_id = ?1 AND note_id = ?2",
      rusqlite::params![
        s.user_id,
        s.note_id,
        difficulty,
        s.ease_factor,
        repetitions,
        interval,
        last_reviewed,
        next_review,
      ],
    )?;
  }
  Ok(())
}

// ─── ReviewStore impl ────────────────────────────────────────────────────────

impl ReviewStore for SqliteStore {
  type Error = Error;

  /// Truncated to the microsecond precision timestamps are stored with, so
  /// returned records compare equal to what is read back later.
  fn now(&self) -> DateTime<Utc> { self.clock.now().trunc_subsecs(6) }

  fn scheduler(&self) -> &ReviewScheduler { &self.scheduler }

  async fn upsert_review(&self, input: NewReview) -> Result<ReviewSchedule> {
    let now = self.now();
    let scheduler = self.scheduler;

    let schedule = self
      .conn
      .call(move |conn| {
        // IMMEDIATE takes the write lock before the read, so two submissions
        // for the same pair cannot both see the same prior state.
        let tx =
          conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let existing = tx
          .query_row(
            &format!(
              "SELECT {REVIEW_COLUMNS} FROM review_schedules
                WHERE user_id = ?1 AND note_id = ?2"
            ),
            rusqlite::params![input.user_id, input.note_id],
            RawReview::from_row,
          )
          .optional()?
          .map(RawReview::into_schedule)
          .transpose()?;

        let (schedule, is_new) = match existing {
          None => {
            let outcome = scheduler
              .schedule(input.difficulty, scheduler.initial_state(), now)
              .map_err(Error::from)?;
            let created = ReviewSchedule {
              review_id:        Uuid::new_v4(),
              user_id:          input.user_id,
              note_id:          input.note_id,
              topic:            input.topic,
              difficulty_level: input.difficulty,
              ease_factor:      outcome.ease_factor,
              repetition_count: 1,
              interval_days:    outcome.interval_days,
              last_reviewed:    now,
              next_review_date: outcome.next_review_date,
              created_at:       now,
            };
            (created, true)
          }
          Some(prev) => {
            let outcome = scheduler
              .schedule(input.difficulty, ReviewState::from(&prev), now)
              .map_err(Error::from)?;
            let repetition_count =
              prev.repetition_count.checked_add(1).ok_or_else(|| {
                Error::Decode("repetition_count overflow".to_string())
              })?;
            let updated = ReviewSchedule {
              difficulty_level: input.difficulty,
              ease_factor: outcome.ease_factor,
              repetition_count,
              interval_days: outcome.interval_days,
              last_reviewed: now,
              next_review_date: outcome.next_review_date,
              ..prev
            };
            (updated, false)
          }
        };

        write_schedule(&tx, &schedule, is_new)?;
        tx.commit()?;
        Ok(schedule)
      })
      .await?;

    tracing::debug!(
      user_id = schedule.user_id,
      note_id = schedule.note_id,
      repetition_count = schedule.repetition_count,
      interval_days = schedule.interval_days,
      ease_factor = schedule.ease_factor,
      "review recorded"
    );

    Ok(schedule)
  }

  async fn get_review(
    &self,
    user_id: UserId,
    note_id: NoteId,
  ) -> Result<Option<ReviewSchedule>> {
    let raw: Option<RawReview> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {REVIEW_COLUMNS} FROM review_schedules
                  WHERE user_id = ?1 AND note_id = ?2"
              ),
              rusqlite::params![user_id, note_id],
              RawReview::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawReview::into_schedule).transpose()
  }

  async fn list_due(&self, user_id: UserId) -> Result<Vec<ReviewSchedule>> {
    let sql = format!(
      "SELECT {REVIEW_COLUMNS} FROM review_schedules
        WHERE user_id = ?1 AND next_review_date <= ?2
        ORDER BY next_review_date ASC, note_id ASC"
    );
    self.select_reviews(sql, user_id, Some(self.now())).await
  }

  async fn list_scheduled(&self, user_id: UserId) -> Result<Vec<ReviewSchedule>> {
    let sql = format!(
      "SELECT {REVIEW_COLUMNS} FROM review_schedules
        WHERE user_id = ?1
        ORDER BY next_review_date ASC, note_id ASC"
    );
    self.select_reviews(sql, user_id, None).await
  }

  async fn delete_review(
    &self,
    user_id: UserId,
    note_id: NoteId,
  ) -> Result<Option<ReviewSchedule>> {
    let raw: Option<RawReview> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "DELETE FROM review_schedules
                  WHERE user_id = ?1 AND note_id = ?2
                  RETURNING {REVIEW_COLUMNS}"
              ),
              rusqlite::params![user_id, note_id],
              RawReview::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    if raw.is_some() {
      tracing::debug!(user_id, note_id, "review schedule deleted");
    }

    raw.map(RawReview::into_schedule).transpose()
  }
}

// ─── NoteStore impl ──────────────────────────────────────────────────────────

impl NoteStore for SqliteStore {
  type Error = Error;

  async fn add_note(&self, input: NewNote) -> Result<Note> {
    let uploaded_at = self.now();
    let at_str = encode_dt(uploaded_at);
    let NewNote { user_id, topic, content } = input;

    let (note_id, topic, content) = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO notes (user_id, topic, content, uploaded_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![user_id, topic, content, at_str],
        )?;
        Ok((conn.last_insert_rowid(), topic, content))
      })
      .await?;

    Ok(Note { note_id, user_id, topic, content, uploaded_at })
  }

  async fn list_notes(&self, user_id: UserId) -> Result<Vec<Note>> {
    let raws: Vec<RawNote> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {NOTE_COLUMNS} FROM notes
            WHERE user_id = ?1
            ORDER BY uploaded_at DESC, note_id DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![user_id], RawNote::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawNote::into_note).collect()
  }

  async fn notes_by_ids(
    &self,
    user_id: UserId,
    note_ids: &[NoteId],
  ) -> Result<Vec<Note>> {
    if note_ids.is_empty() {
      return Ok(Vec::new());
    }

    let ids = note_ids.to_vec();
    let raws: Vec<RawNote> = self
      .conn
      .call(move |conn| {
        let placeholders = vec!["?"; ids.len()].join(", ");
        let mut stmt = conn.prepare(&format!(
          "SELECT {NOTE_COLUMNS} FROM notes
            WHERE user_id = ? AND note_id IN ({placeholders})"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params_from_iter(std::iter::once(user_id).chain(ids)),
            RawNote::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawNote::into_note).collect()
  }
}
