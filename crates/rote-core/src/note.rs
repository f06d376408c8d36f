//! Notes — the study material a schedule points at.
//!
//! Notes are produced by the upload flow and only read here, so that due
//! reviews can be shown alongside their content.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::review::{NoteId, UserId};

/// Topic assigned when the uploader does not supply one.
pub const DEFAULT_TOPIC: &str = "Untitled";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
  pub note_id:     NoteId,
  pub user_id:     UserId,
  pub topic:       String,
  pub content:     String,
  pub uploaded_at: DateTime<Utc>,
}

/// Input to [`crate::store::NoteStore::add_note`].
/// `note_id` and `uploaded_at` are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewNote {
  pub user_id: UserId,
  pub topic:   String,
  pub content: String,
}
