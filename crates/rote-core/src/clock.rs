//! Time sources.
//!
//! Everything that depends on "now" (review timestamps, due-status queries)
//! reads it through a [`Clock`] so tests can pin and advance time.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

/// A source of the current instant.
pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<Utc>;
}

/// Reads the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> { Utc::now() }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
  instant: Mutex<DateTime<Utc>>,
}

impl FixedClock {
  pub fn new(instant: DateTime<Utc>) -> Self {
    Self { instant: Mutex::new(instant) }
  }

  /// Jump to `instant`.
  pub fn set(&self, instant: DateTime<Utc>) { *self.lock() = instant; }

  /// Move forward (or backward, for negative durations) by `by`.
  pub fn advance(&self, by: Duration) {
    let mut guard = self.lock();
    *guard += by;
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
    // A poisoned lock still holds a valid timestamp.
    self.instant.lock().unwrap_or_else(|e| e.into_inner())
  }
}

impl Clock for FixedClock {
  fn now(&self) -> DateTime<Utc> { *self.lock() }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn fixed_clock_holds_until_advanced() {
    let start = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
    let clock = FixedClock::new(start);
    assert_eq!(clock.now(), start);
    assert_eq!(clock.now(), start);

    clock.advance(Duration::days(2));
    assert_eq!(clock.now(), start + Duration::days(2));

    clock.set(start);
    assert_eq!(clock.now(), start);
  }
}
