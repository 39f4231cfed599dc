//! # opcon Common Library
//!
//! Shared code for the aggregation service and the operator console:
//! - Data model (media items, operators, sessions, projections)
//! - Session event vocabulary
//! - API envelope and request/response types
//! - Configuration loading
//! - Clock formatting and timestamps

pub mod api;
pub mod config;
pub mod error;
pub mod events;
pub mod human_time;
pub mod models;
pub mod time;

pub use error::{Error, Result};
pub use events::{EventRecord, EventType, SeekTarget, SessionEvent};
pub use models::{
    HistoryEntry, LeaderboardRow, MediaItem, MediaKind, Operator, SessionId, StatsSnapshot,
};
