//! Session lifecycle endpoints: start, event, end
//!
//! Events are only accepted against an open session. Ending is one-shot:
//! the second end of the same session is a conflict.

use axum::{extract::State, Json};
use opcon_common::api::types::{
    Ack, EndSessionRequest, RecordEventRequest, StartSessionRequest, StartSessionResponse,
};
use opcon_common::events::{clamp_position, EventType};
use opcon_common::models::SessionId;
use serde_json::json;
use tracing::{debug, info};

use crate::db;
use crate::db::sessions::SessionStatus;
use crate::error::{ok, ApiError, ApiResult, Result};
use crate::AppState;

/// Unknown sessions are 404, closed ones 409
async fn require_open(state: &AppState, session_id: SessionId) -> Result<()> {
    match db::sessions::session_status(&state.db, session_id).await? {
        None => Err(ApiError::NotFound(format!("Session {} not found.", session_id))),
        Some(SessionStatus::Ended) => {
            Err(ApiError::Conflict(format!("Session {} already ended.", session_id)))
        }
        Some(SessionStatus::Open) => Ok(()),
    }
}

/// POST /api/sessions/start
pub async fn start_session(
    State(state): State<AppState>,
    body: Option<Json<StartSessionRequest>>,
) -> ApiResult<StartSessionResponse> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let (Some(operator_id), Some(media_item_id)) = (request.operator_id, request.media_item_id) else {
        return Err(ApiError::Validation(
            "operatorId and mediaItemId are required.".to_string(),
        ));
    };

    if !db::operators::operator_exists(&state.db, operator_id).await? {
        return Err(ApiError::NotFound(format!("Operator {} not found.", operator_id)));
    }
    if !db::media::media_exists(&state.db, media_item_id).await? {
        return Err(ApiError::NotFound(format!("Media item {} not found.", media_item_id)));
    }

    let session_id = db::sessions::start_session(&state.db, operator_id, media_item_id).await?;
    info!(session_id = %session_id, operator_id, media_item_id, "Session started");

    ok(StartSessionResponse { session_id })
}

/// POST /api/sessions/event
pub async fn record_event(
    State(state): State<AppState>,
    body: Option<Json<RecordEventRequest>>,
) -> ApiResult<Ack> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let (Some(session_id), Some(event_type)) = (request.session_id, request.event_type) else {
        return Err(ApiError::Validation(
            "sessionId and eventType are required.".to_string(),
        ));
    };

    let event_type = event_type
        .parse::<EventType>()
        .map_err(|_| ApiError::Validation(format!("Unknown event type: {}", event_type)))?;

    require_open(&state, session_id).await?;

    let position = clamp_position(request.position.unwrap_or(0.0));
    let payload = request.payload.unwrap_or_else(|| json!({}));
    db::sessions::insert_event(&state.db, session_id, event_type, position, &payload).await?;
    debug!(session_id = %session_id, event_type = event_type.as_str(), position, "Event recorded");

    ok(Ack {})
}

/// POST /api/sessions/end
pub async fn end_session(
    State(state): State<AppState>,
    body: Option<Json<EndSessionRequest>>,
) -> ApiResult<Ack> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let Some(session_id) = request.session_id else {
        return Err(ApiError::Validation("sessionId is required.".to_string()));
    };

    require_open(&state, session_id).await?;

    let last_position = clamp_position(request.last_position.unwrap_or(0.0));
    let completed = request.completed.unwrap_or(false);

    // A concurrent end can close the row between the check and the update
    if !db::sessions::end_session(&state.db, session_id, last_position, completed).await? {
        return Err(ApiError::Conflict(format!("Session {} already ended.", session_id)));
    }
    info!(session_id = %session_id, last_position, completed, "Session ended");

    ok(Ack {})
}
