//! Interval and ease-factor computation.
//!
//! Intervals grow with the repetition count and are scaled by the latest
//! difficulty rating. The ease factor is a slow-moving multiplier that rises
//! by a small step on easy ratings and falls by a larger one on hard ratings,
//! always staying within [`MIN_EASE_FACTOR`, `MAX_EASE_FACTOR`].
//!
//! | Repetitions before review | Interval (days) |
//! |---------------------------|-----------------|
//! | 0 | 1 |
//! | 1 | 3 if difficulty ≤ 3, else 1 |
//! | 2 | round(7 × multiplier) |
//! | n ≥ 3 | round(ease^(n−2) × 7 × multiplier) |

use chrono::{DateTime, Datelike as _, Days, Utc};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::{
  Error, Result,
  review::{Difficulty, ReviewSchedule},
};

/// Ease factor assigned to a schedule on its first review.
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;
pub const MIN_EASE_FACTOR: f64 = 1.3;
pub const MAX_EASE_FACTOR: f64 = 3.0;
/// Added on ratings 1–2.
pub const EASY_EASE_STEP: f64 = 0.1;
/// Subtracted on ratings 4–5.
pub const HARD_EASE_STEP: f64 = 0.2;

pub const FIRST_INTERVAL_DAYS: u32 = 1;
pub const SECOND_INTERVAL_DAYS: u32 = 3;
pub const THIRD_INTERVAL_DAYS: u32 = 7;

/// About a century; keeps `next_review_date` representable.
pub const DEFAULT_MAX_INTERVAL_DAYS: u32 = 36_500;

/// Last year a `next_review_date` may fall in. Timestamps are stored as
/// four-digit-year RFC 3339 text, which only sorts chronologically up to here.
pub const MAX_REVIEW_YEAR: i32 = 9999;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Tunables for [`ReviewScheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
  pub initial_ease_factor: f64,
  /// Upper bound on any computed interval. `None` leaves it unbounded.
  pub max_interval_days:   Option<u32>,
}

impl Default for SchedulerConfig {
  fn default() -> Self {
    Self {
      initial_ease_factor: DEFAULT_EASE_FACTOR,
      max_interval_days:   Some(DEFAULT_MAX_INTERVAL_DAYS),
    }
  }
}

impl SchedulerConfig {
  pub fn validate(&self) -> Result<()> {
    if !ease_in_range(self.initial_ease_factor) {
      return Err(Error::InvalidConfig(format!(
        "initial_ease_factor {} is outside [{MIN_EASE_FACTOR}, {MAX_EASE_FACTOR}]",
        self.initial_ease_factor
      )));
    }
    if self.max_interval_days == Some(0) {
      return Err(Error::InvalidConfig(
        "max_interval_days must be at least 1".to_string(),
      ));
    }
    Ok(())
  }
}

// ─── Pure computation ────────────────────────────────────────────────────────

/// Days until the next review, given the repetition count *before* this
/// review and the ease factor carried into it.
pub fn next_interval(
  difficulty: Difficulty,
  repetition_count: u32,
  ease_factor: f64,
) -> u32 {
  match repetition_count {
    0 => FIRST_INTERVAL_DAYS,
    1 if difficulty.level() <= 3 => SECOND_INTERVAL_DAYS,
    1 => FIRST_INTERVAL_DAYS,
    n => {
      let base = if n == 2 {
        f64::from(THIRD_INTERVAL_DAYS)
      } else {
        let exponent = i32::try_from(n - 2).unwrap_or(i32::MAX);
        ease_factor.powi(exponent) * f64::from(THIRD_INTERVAL_DAYS)
      };
      // `as` saturates, so an unbounded base lands on u32::MAX.
      (base * difficulty.interval_multiplier()).round() as u32
    }
  }
}

/// The ease factor after a review rated `difficulty`.
pub fn next_ease_factor(difficulty: Difficulty, ease_factor: f64) -> f64 {
  if difficulty.is_easy() {
    (ease_factor + EASY_EASE_STEP).min(MAX_EASE_FACTOR)
  } else if difficulty.is_hard() {
    (ease_factor - HARD_EASE_STEP).max(MIN_EASE_FACTOR)
  } else {
    ease_factor
  }
}

fn ease_in_range(ease_factor: f64) -> bool {
  ease_factor.is_finite()
    && (MIN_EASE_FACTOR..=MAX_EASE_FACTOR).contains(&ease_factor)
}

// ─── Scheduler ───────────────────────────────────────────────────────────────

/// The schedule state a review builds on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReviewState {
  pub repetition_count: u32,
  pub ease_factor:      f64,
}

impl From<&ReviewSchedule> for ReviewState {
  fn from(s: &ReviewSchedule) -> Self {
    Self {
      repetition_count: s.repetition_count,
      ease_factor:      s.ease_factor,
    }
  }
}

/// The computed fields of a review.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduleOutcome {
  pub interval_days:    u32,
  pub ease_factor:      f64,
  pub next_review_date: DateTime<Utc>,
}

/// The interval a given rating would produce, without recording anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IntervalPreview {
  pub difficulty:    Difficulty,
  pub interval_days: u32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReviewScheduler {
  config: SchedulerConfig,
}

impl ReviewScheduler {
  pub fn new(config: SchedulerConfig) -> Result<Self> {
    config.validate()?;
    Ok(Self { config })
  }

  pub fn config(&self) -> &SchedulerConfig { &self.config }

  /// State used for a pair that has never been reviewed.
  pub fn initial_state(&self) -> ReviewState {
    ReviewState {
      repetition_count: 0,
      ease_factor:      self.config.initial_ease_factor,
    }
  }

  /// Compute the outcome of a review rated `difficulty` at `now`.
  ///
  /// Fails if `prior` carries an ease factor outside the valid range or the
  /// resulting date cannot be represented; callers must not persist anything
  /// in that case.
  pub fn schedule(
    &self,
    difficulty: Difficulty,
    prior: ReviewState,
    now: DateTime<Utc>,
  ) -> Result<ScheduleOutcome> {
    if !ease_in_range(prior.ease_factor) {
      return Err(Error::MalformedState(format!(
        "ease factor {} is outside [{MIN_EASE_FACTOR}, {MAX_EASE_FACTOR}]",
        prior.ease_factor
      )));
    }

    let interval_days = self.capped_interval(difficulty, prior);
    let next_review_date = now
      .checked_add_days(Days::new(u64::from(interval_days)))
      .filter(|date| date.year() <= MAX_REVIEW_YEAR)
      .ok_or(Error::DateOverflow(interval_days))?;

    Ok(ScheduleOutcome {
      interval_days,
      ease_factor: next_ease_factor(difficulty, prior.ease_factor),
      next_review_date,
    })
  }

  /// The interval each rating would yield from `prior`, easiest first.
  pub fn preview(&self, prior: ReviewState) -> Vec<IntervalPreview> {
    Difficulty::iter()
      .map(|difficulty| IntervalPreview {
        difficulty,
        interval_days: self.capped_interval(difficulty, prior),
      })
      .collect()
  }

  fn capped_interval(&self, difficulty: Difficulty, prior: ReviewState) -> u32 {
    let interval =
      next_interval(difficulty, prior.repetition_count, prior.ease_factor);
    match self.config.max_interval_days {
      Some(cap) => interval.min(cap),
      None => interval,
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::{Datelike, TimeZone};

  use super::*;

  fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
  }

  fn approx(a: f64, b: f64) -> bool { (a - b).abs() < 1e-9 }

  fn state(repetition_count: u32, ease_factor: f64) -> ReviewState {
    ReviewState { repetition_count, ease_factor }
  }

  // ─── Intervals ─────────────────────────────────────────────────────────────

  #[test]
  fn first_review_is_always_one_day() {
    for d in Difficulty::iter() {
      assert_eq!(next_interval(d, 0, DEFAULT_EASE_FACTOR), 1, "{d}");
    }
  }

  #[test]
  fn second_review_depends_on_difficulty() {
    for d in Difficulty::iter() {
      let expected = if d.level() <= 3 { 3 } else { 1 };
      assert_eq!(next_interval(d, 1, DEFAULT_EASE_FACTOR), expected, "{d}");
    }
  }

  #[test]
  fn third_review_scales_seven_days() {
    // Halves round away from zero: 17.5 -> 18, 10.5 -> 11, 3.5 -> 4.
    let expected = [
      (Difficulty::VeryEasy, 18),
      (Difficulty::Easy, 14),
      (Difficulty::Medium, 11),
      (Difficulty::Hard, 7),
      (Difficulty::VeryHard, 4),
    ];
    for (d, days) in expected {
      assert_eq!(next_interval(d, 2, 2.6), days, "{d}");
    }
  }

  #[test]
  fn later_reviews_grow_with_ease_factor() {
    // 2.5^1 * 7 * 1.5 = 26.25
    assert_eq!(next_interval(Difficulty::Medium, 3, 2.5), 26);
    // 2.0^2 * 7 * 2.5 = 70
    assert_eq!(next_interval(Difficulty::VeryEasy, 4, 2.0), 70);
    // 1.3^3 * 7 * 0.5 = 7.6895
    assert_eq!(next_interval(Difficulty::VeryHard, 5, 1.3), 8);
  }

  #[test]
  fn huge_repetition_counts_saturate() {
    assert_eq!(next_interval(Difficulty::VeryEasy, u32::MAX, 3.0), u32::MAX);
  }

  // ─── Ease factor ───────────────────────────────────────────────────────────

  #[test]
  fn ease_factor_adjustments() {
    assert!(approx(next_ease_factor(Difficulty::VeryEasy, 2.5), 2.6));
    assert!(approx(next_ease_factor(Difficulty::Easy, 2.5), 2.6));
    assert!(approx(next_ease_factor(Difficulty::Medium, 2.5), 2.5));
    assert!(approx(next_ease_factor(Difficulty::Hard, 2.5), 2.3));
    assert!(approx(next_ease_factor(Difficulty::VeryHard, 2.6), 2.4));
  }

  #[test]
  fn repeated_easy_ratings_climb_to_ceiling_and_hold() {
    let mut ef = DEFAULT_EASE_FACTOR;
    for _ in 0..20 {
      let next = next_ease_factor(Difficulty::VeryEasy, ef);
      assert!(next >= ef);
      assert!(next <= MAX_EASE_FACTOR);
      ef = next;
    }
    assert_eq!(ef, MAX_EASE_FACTOR);
  }

  #[test]
  fn repeated_hard_ratings_fall_to_floor_and_hold() {
    let mut ef = DEFAULT_EASE_FACTOR;
    for _ in 0..20 {
      let next = next_ease_factor(Difficulty::VeryHard, ef);
      assert!(next <= ef);
      assert!(next >= MIN_EASE_FACTOR);
      ef = next;
    }
    assert_eq!(ef, MIN_EASE_FACTOR);
  }

  // ─── Scheduler ─────────────────────────────────────────────────────────────

  #[test]
  fn scripted_three_review_sequence() {
    let scheduler = ReviewScheduler::default();
    let now = at(2024, 5, 10);

    let first = scheduler
      .schedule(Difficulty::Medium, scheduler.initial_state(), now)
      .unwrap();
    assert_eq!(first.interval_days, 1);
    assert!(approx(first.ease_factor, 2.5));

    let second = scheduler
      .schedule(Difficulty::Easy, state(1, first.ease_factor), now)
      .unwrap();
    assert_eq!(second.interval_days, 3);
    assert!(approx(second.ease_factor, 2.6));

    let third = scheduler
      .schedule(Difficulty::VeryHard, state(2, second.ease_factor), now)
      .unwrap();
    assert_eq!(third.interval_days, 4);
    assert!(approx(third.ease_factor, 2.4));
    assert_eq!(third.next_review_date, at(2024, 5, 14));
  }

  #[test]
  fn next_review_date_uses_calendar_days() {
    let scheduler = ReviewScheduler::default();
    let cases = [
      // (now, repetitions before review, expected date)
      (at(2023, 12, 31), 0, at(2024, 1, 1)),
      (at(2024, 1, 30), 1, at(2024, 2, 2)),
      (at(2024, 2, 28), 0, at(2024, 2, 29)),
    ];
    for (now, rep, expected) in cases {
      let outcome = scheduler
        .schedule(Difficulty::Medium, state(rep, 2.5), now)
        .unwrap();
      assert_eq!(outcome.next_review_date, expected, "from {now}");
      assert!(outcome.next_review_date >= now);
    }
  }

  #[test]
  fn malformed_ease_factor_is_rejected() {
    let scheduler = ReviewScheduler::default();
    for bad in [0.5, 3.5, f64::NAN, f64::INFINITY] {
      let err = scheduler
        .schedule(Difficulty::Medium, state(4, bad), at(2024, 1, 1))
        .unwrap_err();
      assert!(matches!(err, Error::MalformedState(_)));
    }
  }

  #[test]
  fn interval_cap_applies() {
    let scheduler = ReviewScheduler::new(SchedulerConfig {
      max_interval_days: Some(30),
      ..Default::default()
    })
    .unwrap();
    let outcome = scheduler
      .schedule(Difficulty::VeryEasy, state(6, 3.0), at(2024, 1, 1))
      .unwrap();
    assert_eq!(outcome.interval_days, 30);
  }

  #[test]
  fn uncapped_overflow_is_an_error() {
    let scheduler = ReviewScheduler::new(SchedulerConfig {
      max_interval_days: None,
      ..Default::default()
    })
    .unwrap();
    let err = scheduler
      .schedule(Difficulty::VeryEasy, state(200, 3.0), at(2024, 1, 1))
      .unwrap_err();
    assert!(matches!(err, Error::DateOverflow(_)));
  }

  #[test]
  fn dates_past_year_9999_are_an_error() {
    let scheduler = ReviewScheduler::new(SchedulerConfig {
      max_interval_days: None,
      ..Default::default()
    })
    .unwrap();
    // 3^12 * 7 * 2.5 days is roughly 25 000 years.
    let err = scheduler
      .schedule(Difficulty::VeryEasy, state(14, 3.0), at(2024, 1, 1))
      .unwrap_err();
    assert!(matches!(err, Error::DateOverflow(_)));

    let ok = scheduler
      .schedule(Difficulty::VeryEasy, state(2, 3.0), at(9999, 12, 1))
      .unwrap();
    assert_eq!(ok.next_review_date.year(), 9999);
  }

  #[test]
  fn invalid_config_is_rejected() {
    let err = ReviewScheduler::new(SchedulerConfig {
      initial_ease_factor: 1.0,
      ..Default::default()
    })
    .unwrap_err();
    assert!(matches!(err, Error::InvalidConfig(_)));
  }

  #[test]
  fn preview_matches_schedule() {
    let scheduler = ReviewScheduler::default();
    let prior = state(3, 2.2);
    let now = at(2024, 6, 1);

    let previews = scheduler.preview(prior);
    assert_eq!(previews.len(), 5);
    for p in previews {
      let outcome = scheduler.schedule(p.difficulty, prior, now).unwrap();
      assert_eq!(p.interval_days, outcome.interval_days);
    }
  }
}
