//! Shared API request/response types
//!
//! Request bodies use camelCase field names; rows returned inside responses
//! keep the storage column names (snake_case). Request fields are optional on
//! the wire so the service can answer a missing field with a readable
//! validation message instead of a decode failure.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::events::EventRecord;
use crate::models::{HistoryEntry, LeaderboardRow, MediaItem, SessionId, StatsSnapshot};

// ========================================
// Operators
// ========================================

/// POST /api/operators/register
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterOperatorRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub dni: String,
}

// Response body is `crate::models::Operator`.

// ========================================
// Catalog
// ========================================

/// GET /api/media query string
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaQuery {
    pub kind: Option<String>,
}

/// POST /api/media
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMediaRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub source_url: String,
    #[serde(default)]
    pub duration_seconds: Option<i64>,
    #[serde(default)]
    pub genre: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMediaResponse {
    pub media_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaListResponse {
    pub items: Vec<MediaItem>,
}

/// POST /api/import
///
/// `media` holds catalog rows as exported (snake_case columns). It stays
/// untyped so rows that do not fit can be skipped one by one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportMediaRequest {
    #[serde(default)]
    pub media: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportMediaResponse {
    pub imported: usize,
}

// ========================================
// Sessions
// ========================================

/// POST /api/sessions/start
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionRequest {
    #[serde(default)]
    pub operator_id: Option<i64>,
    #[serde(default)]
    pub media_item_id: Option<i64>,
}

impl StartSessionRequest {
    pub fn new(operator_id: i64, media_item_id: i64) -> Self {
        Self {
            operator_id: Some(operator_id),
            media_item_id: Some(media_item_id),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionResponse {
    pub session_id: SessionId,
}

/// POST /api/sessions/event
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordEventRequest {
    #[serde(default)]
    pub session_id: Option<SessionId>,
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub position: Option<f64>,
    #[serde(default)]
    pub payload: Option<Value>,
}

impl RecordEventRequest {
    pub fn new(session_id: SessionId, record: &EventRecord) -> Self {
        Self {
            session_id: Some(session_id),
            event_type: Some(record.event_type.as_str().to_string()),
            position: Some(record.position),
            payload: Some(record.payload.clone()),
        }
    }
}

/// POST /api/sessions/end
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndSessionRequest {
    #[serde(default)]
    pub session_id: Option<SessionId>,
    #[serde(default)]
    pub last_position: Option<f64>,
    #[serde(default)]
    pub completed: Option<bool>,
}

impl EndSessionRequest {
    pub fn new(session_id: SessionId, last_position: f64, completed: bool) -> Self {
        Self {
            session_id: Some(session_id),
            last_position: Some(last_position),
            completed: Some(completed),
        }
    }
}

/// Body-less success (`{"ok": true}`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ack {}

// ========================================
// Aggregates
// ========================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub stats: StatsSnapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardResponse {
    pub leaders: Vec<LeaderboardRow>,
}

/// GET /api/operators/:id/history query string
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub sessions: Vec<HistoryEntry>,
}

// ========================================
// Service
// ========================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub db: String,
    pub utc: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::SessionEvent;

    #[test]
    fn test_start_request_uses_camel_case() {
        let value = serde_json::to_value(StartSessionRequest::new(7, 3)).unwrap();
        assert_eq!(value["operatorId"], 7);
        assert_eq!(value["mediaItemId"], 3);
    }

    #[test]
    fn test_event_request_from_record() {
        let record = SessionEvent::Speed { value: 1.5 }.record(12.0);
        let request = RecordEventRequest::new(SessionId(9), &record);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["sessionId"], 9);
        assert_eq!(value["eventType"], "speed");
        assert_eq!(value["position"], 12.0);
        assert_eq!(value["payload"]["value"], 1.5);
    }

    #[test]
    fn test_empty_body_decodes_to_defaults() {
        let request: EndSessionRequest = serde_json::from_str("{}").unwrap();
        assert!(request.session_id.is_none());
        assert!(request.completed.is_none());

        let request: AddMediaRequest = serde_json::from_str(r#"{"title":"x"}"#).unwrap();
        assert_eq!(request.title, "x");
        assert!(request.genre.is_none());

        let request: ImportMediaRequest = serde_json::from_str("{}").unwrap();
        assert!(request.media.is_none());
    }
}
