//! JSON REST API for Rote.
//!
//! Exposes an axum [`Router`] backed by any store implementing both
//! [`ReviewStore`] and [`NoteStore`]. Auth, TLS, and transport concerns are
//! the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", rote_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod notes;
pub mod reviews;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, post},
};
use rote_core::store::{NoteStore, ReviewStore};

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: ReviewStore + NoteStore + Send + Sync + 'static,
{
  Router::new()
    // Spaced repetition
    .route("/spaced-repetition/review", post(reviews::submit::<S>))
    .route("/spaced-repetition/due/{user_id}", get(reviews::due::<S>))
    .route(
      "/spaced-repetition/scheduled/{user_id}",
      get(reviews::scheduled::<S>),
    )
    .route(
      "/spaced-repetition/preview/{user_id}/{note_id}",
      get(reviews::preview::<S>),
    )
    .route(
      "/spaced-repetition/{user_id}/{note_id}",
      delete(reviews::remove::<S>),
    )
    // Notes
    .route("/notes", post(notes::create::<S>))
    .route("/notes/{user_id}", get(notes::list::<S>))
    .with_state(store)
}
