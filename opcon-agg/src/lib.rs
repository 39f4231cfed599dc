//! opcon-agg library - Aggregation Service
//!
//! Owns operators, the media catalog, playback sessions and their raw
//! events, and derives stats, leaderboard and per-operator history from
//! them. Exposed as a JSON API; the binary in `main.rs` only wires
//! configuration, logging and the listener around [`build_router`].

use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod error;

pub use error::{ApiError, Result};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    /// Database label reported by the health endpoint
    pub db_name: String,
    /// History page size when the request does not name one
    pub history_limit: i64,
    pub leaderboard_limit: i64,
}

impl AppState {
    pub fn new(db: SqlitePool, db_name: impl Into<String>) -> Self {
        Self {
            db,
            db_name: db_name.into(),
            history_limit: 8,
            leaderboard_limit: 10,
        }
    }

    pub fn with_limits(mut self, history_limit: i64, leaderboard_limit: i64) -> Self {
        self.history_limit = history_limit.max(1);
        self.leaderboard_limit = leaderboard_limit.max(1);
        self
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route("/api/health", get(api::health))
        // Operators
        .route("/api/operators/register", post(api::register_operator))
        .route("/api/operators/:id/history", get(api::get_history))
        // Catalog
        .route("/api/media", get(api::list_media).post(api::add_media))
        .route("/api/import", post(api::import_media))
        // Session lifecycle
        .route("/api/sessions/start", post(api::start_session))
        .route("/api/sessions/event", post(api::record_event))
        .route("/api/sessions/end", post(api::end_session))
        // Aggregates
        .route("/api/stats", get(api::get_stats))
        .route("/api/leaderboard", get(api::get_leaderboard))
        .route("/api/seed", post(api::seed_demo))
        .fallback(api::not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        // Enable CORS for local access
        .layer(CorsLayer::permissive())
}
