//! Review schedules — one per (user, note) pair.
//!
//! A schedule is created by the first review submission for a pair, updated
//! in place by every later submission, and removed only on explicit request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoStaticStr};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Identifiers ─────────────────────────────────────────────────────────────

/// Identifier of the user owning a schedule. Users live outside this crate.
pub type UserId = i64;

/// Identifier of the reviewed note. Notes are referenced, not owned.
pub type NoteId = i64;

// ─── Difficulty ──────────────────────────────────────────────────────────────

/// A self-assessed difficulty rating submitted at review time.
///
/// Serialised as its integer level (1–5). Deserialising any other integer is
/// an error, so an out-of-range rating never reaches the scheduler.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Display,
  EnumIter,
  IntoStaticStr,
  Serialize,
  Deserialize,
)]
#[serde(try_from = "i64", into = "u8")]
pub enum Difficulty {
  #[strum(serialize = "Very Easy")]
  VeryEasy = 1,
  #[strum(serialize = "Easy")]
  Easy     = 2,
  #[strum(serialize = "Medium")]
  Medium   = 3,
  #[strum(serialize = "Hard")]
  Hard     = 4,
  #[strum(serialize = "Very Hard")]
  VeryHard = 5,
}

impl Difficulty {
  /// The numeric level, 1 (very easy) through 5 (very hard).
  pub fn level(self) -> u8 { self as u8 }

  /// Human-readable label, e.g. `"Very Easy"`.
  pub fn label(self) -> &'static str { self.into() }

  /// Ratings that raise the ease factor.
  pub fn is_easy(self) -> bool { self.level() <= 2 }

  /// Ratings that lower the ease factor.
  pub fn is_hard(self) -> bool { self.level() >= 4 }

  /// Scales the base interval once a note is past its second review.
  pub fn interval_multiplier(self) -> f64 {
    match self {
      Self::VeryEasy => 2.5,
      Self::Easy => 2.0,
      Self::Medium => 1.5,
      Self::Hard => 1.0,
      Self::VeryHard => 0.5,
    }
  }
}

impl TryFrom<i64> for Difficulty {
  type Error = Error;

  fn try_from(level: i64) -> Result<Self> {
    match level {
      1 => Ok(Self::VeryEasy),
      2 => Ok(Self::Easy),
      3 => Ok(Self::Medium),
      4 => Ok(Self::Hard),
      5 => Ok(Self::VeryHard),
      other => Err(Error::InvalidDifficulty(other)),
    }
  }
}

impl From<Difficulty> for u8 {
  fn from(d: Difficulty) -> Self { d.level() }
}

// ─── ReviewSchedule ──────────────────────────────────────────────────────────

/// The persisted schedule state for one (user, note) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewSchedule {
  pub review_id:        Uuid,
  pub user_id:          UserId,
  pub note_id:          NoteId,
  /// Copied from the note when the schedule is created; never re-synced.
  pub topic:            String,
  /// The most recent rating.
  pub difficulty_level: Difficulty,
  pub ease_factor:      f64,
  /// Number of reviews so far; 1 after the first.
  pub repetition_count: u32,
  pub interval_days:    u32,
  pub last_reviewed:    DateTime<Utc>,
  pub next_review_date: DateTime<Utc>,
  pub created_at:       DateTime<Utc>,
}

impl ReviewSchedule {
  /// Whether the review has come due as of `now`.
  pub fn is_due(&self, now: DateTime<Utc>) -> bool {
    self.next_review_date <= now
  }
}

// ─── NewReview ───────────────────────────────────────────────────────────────

/// Input to [`crate::store::ReviewStore::upsert_review`].
///
/// Timestamps and computed fields are always set by the store.
#[derive(Debug, Clone)]
pub struct NewReview {
  pub user_id:    UserId,
  pub note_id:    NoteId,
  /// Only used when the schedule is created.
  pub topic:      String,
  pub difficulty: Difficulty,
}

#[cfg(test)]
mod tests {
  use strum::IntoEnumIterator;

  use super::*;

  #[test]
  fn difficulty_accepts_one_through_five() {
    let levels: Vec<u8> = Difficulty::iter().map(Difficulty::level).collect();
    assert_eq!(levels, vec![1, 2, 3, 4, 5]);
    for level in 1..=5_i64 {
      assert_eq!(Difficulty::try_from(level).unwrap().level() as i64, level);
    }
  }

  #[test]
  fn difficulty_rejects_out_of_range() {
    for level in [-1_i64, 0, 6, 42] {
      let err = Difficulty::try_from(level).unwrap_err();
      assert!(matches!(err, Error::InvalidDifficulty(l) if l == level));
    }
  }

  #[test]
  fn difficulty_serialises_as_integer() {
    assert_eq!(serde_json::to_string(&Difficulty::Hard).unwrap(), "4");
    let parsed: Difficulty = serde_json::from_str("2").unwrap();
    assert_eq!(parsed, Difficulty::Easy);
    assert!(serde_json::from_str::<Difficulty>("7").is_err());
  }

  #[test]
  fn difficulty_labels() {
    assert_eq!(Difficulty::VeryEasy.label(), "Very Easy");
    assert_eq!(Difficulty::Medium.to_string(), "Medium");
    assert_eq!(Difficulty::VeryHard.label(), "Very Hard");
  }
}
