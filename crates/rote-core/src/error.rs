//! Error types for `rote-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid scheduler configuration: {0}")]
  InvalidConfig(String),

  #[error("difficulty level must be between 1 and 5, got {0}")]
  InvalidDifficulty(i64),

  /// Stored schedule state that the scheduler refuses to build on.
  #[error("malformed review state: {0}")]
  MalformedState(String),

  #[error("next review date overflows the calendar ({0} days ahead)")]
  DateOverflow(u32),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
