//! HTTP API handlers for opcon-agg
//!
//! Every handler answers with the shared envelope: `{"ok": true, ...}` on
//! success, `{"ok": false, "error": "..."}` on failure.

pub mod aggregates;
pub mod health;
pub mod media;
pub mod operators;
pub mod seed;
pub mod sessions;

pub use aggregates::{get_history, get_leaderboard, get_stats};
pub use health::health;
pub use media::{add_media, import_media, list_media};
pub use operators::register_operator;
pub use seed::seed_demo;
pub use sessions::{end_session, record_event, start_session};

use crate::error::ApiError;

/// Fallback for unrouted paths
pub async fn not_found() -> ApiError {
    ApiError::NotFound("Route not found.".to_string())
}
