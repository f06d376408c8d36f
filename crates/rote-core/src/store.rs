//! The `ReviewStore` and `NoteStore` traits.
//!
//! The traits are implemented by storage backends (e.g. `rote-store-sqlite`).
//! Higher layers (`rote-api`, `rote-server`) depend on this abstraction, not
//! on any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::{
  note::{NewNote, Note},
  review::{NewReview, NoteId, ReviewSchedule, UserId},
  scheduler::ReviewScheduler,
};

// ─── Reviews ─────────────────────────────────────────────────────────────────

/// Abstraction over a review-schedule backend.
///
/// Backends must enforce uniqueness of `(user_id, note_id)` themselves and
/// must run [`ReviewStore::upsert_review`] as a single atomic
/// read-compute-write, so concurrent submissions for one pair never lose a
/// repetition.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait ReviewStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// The instant this store treats as "now".
  fn now(&self) -> DateTime<Utc>;

  /// The scheduler used to compute new schedule fields.
  fn scheduler(&self) -> &ReviewScheduler;

  /// Record a review outcome for `(input.user_id, input.note_id)`.
  ///
  /// Creates the schedule on the first submission for the pair, otherwise
  /// updates it in place. Returns the full record as persisted. If the
  /// scheduler rejects the stored state nothing is written.
  fn upsert_review(
    &self,
    input: NewReview,
  ) -> impl Future<Output = Result<ReviewSchedule, Self::Error>> + Send + '_;

  /// Retrieve the schedule for a pair. Returns `None` if not found.
  fn get_review(
    &self,
    user_id: UserId,
    note_id: NoteId,
  ) -> impl Future<Output = Result<Option<ReviewSchedule>, Self::Error>> + Send + '_;

  /// Schedules for `user_id` whose `next_review_date` is at or before now,
  /// most overdue first.
  fn list_due(
    &self,
    user_id: UserId,
  ) -> impl Future<Output = Result<Vec<ReviewSchedule>, Self::Error>> + Send + '_;

  /// Every schedule for `user_id`, ascending by `next_review_date`.
  fn list_scheduled(
    &self,
    user_id: UserId,
  ) -> impl Future<Output = Result<Vec<ReviewSchedule>, Self::Error>> + Send + '_;

  /// Remove the schedule for a pair, returning its last state, or `None` if
  /// there was nothing to remove. The note itself is untouched.
  fn delete_review(
    &self,
    user_id: UserId,
    note_id: NoteId,
  ) -> impl Future<Output = Result<Option<ReviewSchedule>, Self::Error>> + Send + '_;
}

// ─── Notes ───────────────────────────────────────────────────────────────────

/// Read/write access to the notes schedules refer to.
pub trait NoteStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a note. `note_id` and `uploaded_at` are assigned by the store.
  fn add_note(
    &self,
    input: NewNote,
  ) -> impl Future<Output = Result<Note, Self::Error>> + Send + '_;

  /// All notes owned by `user_id`, newest first.
  fn list_notes(
    &self,
    user_id: UserId,
  ) -> impl Future<Output = Result<Vec<Note>, Self::Error>> + Send + '_;

  /// The subset of `note_ids` that exist and belong to `user_id`.
  fn notes_by_ids<'a>(
    &'a self,
    user_id: UserId,
    note_ids: &'a [NoteId],
  ) -> impl Future<Output = Result<Vec<Note>, Self::Error>> + Send + 'a;
}
