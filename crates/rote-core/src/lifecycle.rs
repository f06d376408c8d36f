//! Review status, computed at query time.
//!
//! Nothing here is stored: whether a schedule is due depends only on its
//! `next_review_date` and the clock at the moment of the query.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::review::ReviewSchedule;

/// Where a schedule stands relative to "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
  /// `next_review_date` has passed.
  Due,
  /// Waiting for `next_review_date`.
  Scheduled,
}

impl ReviewStatus {
  pub fn of(schedule: &ReviewSchedule, now: DateTime<Utc>) -> Self {
    if schedule.is_due(now) { Self::Due } else { Self::Scheduled }
  }

  pub fn is_due(&self) -> bool { matches!(self, Self::Due) }
}

/// A schedule bundled with its status as of `as_of`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedReview {
  #[serde(flatten)]
  pub schedule: ReviewSchedule,
  pub status:   ReviewStatus,
}

impl ResolvedReview {
  pub fn resolve(schedule: ReviewSchedule, as_of: DateTime<Utc>) -> Self {
    let status = ReviewStatus::of(&schedule, as_of);
    Self { schedule, status }
  }
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, TimeZone};
  use uuid::Uuid;

  use super::*;
  use crate::review::Difficulty;

  fn schedule_due_at(next: DateTime<Utc>) -> ReviewSchedule {
    let last = next - Duration::days(1);
    ReviewSchedule {
      review_id:        Uuid::nil(),
      user_id:          1,
      note_id:          1,
      topic:            "Untitled".into(),
      difficulty_level: Difficulty::Medium,
      ease_factor:      2.5,
      repetition_count: 1,
      interval_days:    1,
      last_reviewed:    last,
      next_review_date: next,
      created_at:       last,
    }
  }

  #[test]
  fn due_at_and_after_next_review_date() {
    let next = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    let s = schedule_due_at(next);

    assert_eq!(ReviewStatus::of(&s, next - Duration::seconds(1)), ReviewStatus::Scheduled);
    assert!(ReviewStatus::of(&s, next).is_due());
    assert!(ReviewStatus::of(&s, next + Duration::days(30)).is_due());
  }

  #[test]
  fn resolved_review_serialises_flat() {
    let next = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    let resolved = ResolvedReview::resolve(schedule_due_at(next), next);
    let json = serde_json::to_value(&resolved).unwrap();
    assert_eq!(json["status"], "due");
    assert_eq!(json["note_id"], 1);
    assert_eq!(json["difficulty_level"], 3);
  }
}
