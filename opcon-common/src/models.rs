//! Shared data model
//!
//! Catalog items, operators, session identity and the read-only projections
//! (stats, leaderboard rows, history entries) returned by the aggregation
//! service. Field names follow the service's row format (snake_case).

use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

use crate::Error;

/// Genre used when a catalog item has none
pub const DEFAULT_GENRE: &str = "General";

/// Kind of media item; selects which transport instance plays it
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Audio,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "video" => Ok(MediaKind::Video),
            "audio" => Ok(MediaKind::Audio),
            other => Err(Error::InvalidInput(format!(
                "unknown media kind '{}' (expected audio or video)",
                other
            ))),
        }
    }
}

/// Catalog entry
///
/// Owned by the catalog; the console only ever holds a copy of the item
/// that is currently loaded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaItem {
    pub id: i64,
    pub title: String,
    pub kind: MediaKind,
    #[serde(default = "default_genre", deserialize_with = "genre_or_default")]
    pub genre: String,
    /// Declared duration in seconds (0 when unknown)
    #[serde(default)]
    pub duration_seconds: i64,
    pub source_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

fn default_genre() -> String {
    DEFAULT_GENRE.to_string()
}

fn genre_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let genre: Option<String> = Option::deserialize(deserializer)?;
    Ok(match genre {
        Some(g) if !g.trim().is_empty() => g,
        _ => default_genre(),
    })
}

/// Registered operator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Operator {
    pub operator_id: i64,
    pub name: String,
    pub dni: String,
}

/// Server-assigned session identity
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct SessionId(pub i64);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Global totals
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub media_total: i64,
    pub operators_total: i64,
    pub sessions_total: i64,
    pub events_total: i64,
}

/// One leaderboard row, in the order the service ranked it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeaderboardRow {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub dni: String,
    pub total_sessions: i64,
    pub completions: i64,
    pub avg_position: f64,
}

/// One past session of an operator, newest first
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub ended_at: Option<String>,
    pub title: String,
    pub kind: MediaKind,
    #[serde(default = "default_genre", deserialize_with = "genre_or_default")]
    pub genre: String,
    #[serde(deserialize_with = "flag_from_bool_or_int")]
    pub completed: bool,
    #[serde(default)]
    pub last_position: f64,
}

/// Accepts `true`/`false` as well as SQLite-style `0`/`1`
fn flag_from_bool_or_int<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(i) => i != 0,
    })
}
