//! HTTP server assembly for Rote.
//!
//! Loads [`ServerConfig`] and builds the top-level [`Router`]: the JSON API
//! from `rote-api` mounted under `/api`, plus a health probe, wrapped in
//! request tracing.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::{Json, Router, routing::get};
use rote_core::{
  scheduler::SchedulerConfig,
  store::{NoteStore, ReviewStore},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `ROTE_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
  #[serde(default)]
  pub scheduler:  SchedulerConfig,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 5000 }

fn default_store_path() -> PathBuf { PathBuf::from("rote.sqlite3") }

impl ServerConfig {
  /// Layer the optional TOML file at `path` under the environment.
  ///
  /// Nested keys use a double underscore, e.g.
  /// `ROTE_SCHEDULER__MAX_INTERVAL_DAYS=365`.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    Self::from_sources(path, Self::environment())
  }

  fn environment() -> config::Environment {
    config::Environment::with_prefix("ROTE")
      .prefix_separator("_")
      .separator("__")
      .try_parsing(true)
  }

  fn from_sources(
    path: &Path,
    env: config::Environment,
  ) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(env)
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router for `store`.
pub fn router<S>(store: Arc<S>) -> Router
where
  S: ReviewStore + NoteStore + Send + Sync + 'static,
{
  Router::new()
    .route("/health", get(health))
    .nest("/api", rote_api::api_router(store))
    .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<Value> { Json(json!({ "status": "ok" })) }

// ─── Integration tests ────────────────────────────────────────────────────────
