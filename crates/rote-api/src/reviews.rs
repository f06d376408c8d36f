//! Handlers for `/spaced-repetition` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/spaced-repetition/review` | Body: [`SubmitBody`]; returns the computed schedule fields |
//! | `GET`    | `/spaced-repetition/due/:user_id` | Due schedules joined with note content |
//! | `GET`    | `/spaced-repetition/scheduled/:user_id` | Every schedule with its status |
//! | `GET`    | `/spaced-repetition/preview/:user_id/:note_id` | Interval each rating would give |
//! | `DELETE` | `/spaced-repetition/:user_id/:note_id` | 404 if no schedule exists |

use std::{collections::HashMap, sync::Arc};

use axum::{
  Json,
  extract::{Path, State, rejection::JsonRejection},
};
use chrono::{DateTime, Utc};
use rote_core::{
  lifecycle::ResolvedReview,
  note::DEFAULT_TOPIC,
  review::{Difficulty, NewReview, NoteId, ReviewSchedule, UserId},
  scheduler::ReviewState,
  store::{NoteStore, ReviewStore},
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

// ─── Submit ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /spaced-repetition/review`.
///
/// Every field is optional at the serde level so that a missing field is
/// reported as a validation error rather than a parse failure.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitBody {
  pub user_id:          Option<UserId>,
  pub note_id:          Option<NoteId>,
  /// Only used when the schedule is created. Defaults to `"Untitled"`.
  pub topic:            Option<String>,
  pub difficulty_level: Option<i64>,
}

impl TryFrom<SubmitBody> for NewReview {
  type Error = ApiError;

  fn try_from(b: SubmitBody) -> Result<Self, ApiError> {
    let (Some(user_id), Some(note_id), Some(level)) =
      (b.user_id, b.note_id, b.difficulty_level)
    else {
      return Err(ApiError::BadRequest(
        "userId, noteId and difficultyLevel are required".to_string(),
      ));
    };

    Ok(NewReview {
      user_id,
      note_id,
      topic: b
        .topic
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_TOPIC.to_string()),
      difficulty: Difficulty::try_from(level)?,
    })
  }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
  pub message:          String,
  pub interval_days:    u32,
  pub next_review_date: DateTime<Utc>,
  pub repetition_count: u32,
  pub ease_factor:      f64,
}

impl From<ReviewSchedule> for SubmitResponse {
  fn from(s: ReviewSchedule) -> Self {
    Self {
      message:          "Review recorded".to_string(),
      interval_days:    s.interval_days,
      next_review_date: s.next_review_date,
      repetition_count: s.repetition_count,
      ease_factor:      s.ease_factor,
    }
  }
}

/// `POST /spaced-repetition/review` — validated before the store is touched.
pub async fn submit<S>(
  State(store): State<Arc<S>>,
  body: Result<Json<SubmitBody>, JsonRejection>,
) -> Result<Json<SubmitResponse>, ApiError>
where
  S: ReviewStore,
{
  let Json(body) = body?;
  let input = NewReview::try_from(body)?;

  let schedule = store.upsert_review(input).await.map_err(ApiError::store)?;

  tracing::info!(
    user_id = schedule.user_id,
    note_id = schedule.note_id,
    difficulty = schedule.difficulty_level.level(),
    interval_days = schedule.interval_days,
    "review submitted"
  );

  Ok(Json(SubmitResponse::from(schedule)))
}

// ─── Due ──────────────────────────────────────────────────────────────────────

/// A due schedule with the content of the note it refers to, when the note is
/// known to this service.
#[derive(Debug, Serialize)]
pub struct DueReview {
  #[serde(flatten)]
  pub schedule: ReviewSchedule,
  pub content:  Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DueResponse {
  pub due_reviews: Vec<DueReview>,
  pub count:       usize,
}

/// `GET /spaced-repetition/due/:user_id`
pub async fn due<S>(
  State(store): State<Arc<S>>,
  Path(user_id): Path<UserId>,
) -> Result<Json<DueResponse>, ApiError>
where
  S: ReviewStore + NoteStore,
{
  let schedules = store.list_due(user_id).await.map_err(ApiError::store)?;

  let note_ids: Vec<NoteId> = schedules.iter().map(|s| s.note_id).collect();
  let mut contents: HashMap<NoteId, String> = store
    .notes_by_ids(user_id, &note_ids)
    .await
    .map_err(ApiError::store)?
    .into_iter()
    .map(|n| (n.note_id, n.content))
    .collect();

  let due_reviews: Vec<DueReview> = schedules
    .into_iter()
    .map(|schedule| DueReview {
      content: contents.remove(&schedule.note_id),
      schedule,
    })
    .collect();

  Ok(Json(DueResponse { count: due_reviews.len(), due_reviews }))
}

// ─── Scheduled ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledResponse {
  pub scheduled_reviews: Vec<ResolvedReview>,
  pub count:             usize,
}

/// `GET /spaced-repetition/scheduled/:user_id`
pub async fn scheduled<S>(
  State(store): State<Arc<S>>,
  Path(user_id): Path<UserId>,
) -> Result<Json<ScheduledResponse>, ApiError>
where
  S: ReviewStore,
{
  let now = store.now();
  let scheduled_reviews: Vec<ResolvedReview> = store
    .list_scheduled(user_id)
    .await
    .map_err(ApiError::store)?
    .into_iter()
    .map(|s| ResolvedReview::resolve(s, now))
    .collect();

  Ok(Json(ScheduledResponse {
    count: scheduled_reviews.len(),
    scheduled_reviews,
  }))
}

// ─── Preview ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewEntry {
  pub difficulty_level: u8,
  pub label:            &'static str,
  pub interval_days:    u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResponse {
  /// Reviews recorded so far; 0 when the pair has never been reviewed.
  pub repetition_count: u32,
  pub previews:         Vec<PreviewEntry>,
}

/// `GET /spaced-repetition/preview/:user_id/:note_id` — read-only.
pub async fn preview<S>(
  State(store): State<Arc<S>>,
  Path((user_id, note_id)): Path<(UserId, NoteId)>,
) -> Result<Json<PreviewResponse>, ApiError>
where
  S: ReviewStore,
{
  let scheduler = *store.scheduler();
  let prior = store
    .get_review(user_id, note_id)
    .await
    .map_err(ApiError::store)?
    .map(|s| ReviewState::from(&s))
    .unwrap_or_else(|| scheduler.initial_state());

  let previews = scheduler
    .preview(prior)
    .into_iter()
    .map(|p| PreviewEntry {
      difficulty_level: p.difficulty.level(),
      label:            p.difficulty.label(),
      interval_days:    p.interval_days,
    })
    .collect();

  Ok(Json(PreviewResponse {
    repetition_count: prior.repetition_count,
    previews,
  }))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
  pub message: String,
  pub deleted: ReviewSchedule,
}

/// `DELETE /spaced-repetition/:user_id/:note_id`
pub async fn remove<S>(
  State(store): State<Arc<S>>,
  Path((user_id, note_id)): Path<(UserId, NoteId)>,
) -> Result<Json<DeleteResponse>, ApiError>
where
  S: ReviewStore,
{
  let deleted = store
    .delete_review(user_id, note_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| {
      ApiError::NotFound(format!(
        "no review schedule for user {user_id} and note {note_id}"
      ))
    })?;

  tracing::info!(user_id, note_id, "review schedule removed");

  Ok(Json(DeleteResponse {
    message: "Review schedule removed".to_string(),
    deleted,
  }))
}
