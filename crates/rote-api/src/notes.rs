//! Handlers for `/notes` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/notes` | Body: [`CreateBody`]; returns 201 + stored note |
//! | `GET`  | `/notes/:user_id` | Newest first |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use rote_core::{
  note::{DEFAULT_TOPIC, NewNote, Note},
  review::UserId,
  store::NoteStore,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBody {
  pub user_id: Option<UserId>,
  pub topic:   Option<String>,
  pub content: Option<String>,
}

/// `POST /notes` — body: `{"userId":1,"topic":"...","content":"..."}`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  body: Result<Json<CreateBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: NoteStore,
{
  let Json(body) = body?;
  let (Some(user_id), Some(content)) = (body.user_id, body.content) else {
    return Err(ApiError::BadRequest(
      "userId and content are required".to_string(),
    ));
  };
  let topic = body
    .topic
    .filter(|t| !t.trim().is_empty())
    .unwrap_or_else(|| DEFAULT_TOPIC.to_string());

  let note = store
    .add_note(NewNote { user_id, topic, content })
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(note)))
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ListResponse {
  pub notes: Vec<Note>,
}

/// `GET /notes/:user_id`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Path(user_id): Path<UserId>,
) -> Result<Json<ListResponse>, ApiError>
where
  S: NoteStore,
{
  let notes = store.list_notes(user_id).await.map_err(ApiError::store)?;
  Ok(Json(ListResponse { notes }))
}
