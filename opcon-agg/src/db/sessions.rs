//! Playback session and event queries
//!
//! A session row is opened by `start_session` and closed exactly once by
//! `end_session`, which stamps `ended_at`. Events may only be attached to
//! an open session.

use opcon_common::events::EventType;
use opcon_common::models::SessionId;
use opcon_common::time::now_iso;
use serde_json::Value;
use sqlx::SqlitePool;

use crate::error::Result;

/// Lifecycle of a stored session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Open,
    Ended,
}

pub async fn start_session(db: &SqlitePool, operator_id: i64, media_item_id: i64) -> Result<SessionId> {
    let result = sqlx::query(
        "INSERT INTO playback_sessions (operator_id, media_item_id, started_at) VALUES (?, ?, ?)",
    )
    .bind(operator_id)
    .bind(media_item_id)
    .bind(now_iso())
    .execute(db)
    .await?;
    Ok(SessionId(result.last_insert_rowid()))
}

/// `None` when the session id is unknown
pub async fn session_status(db: &SqlitePool, session_id: SessionId) -> Result<Option<SessionStatus>> {
    let ended_at: Option<Option<String>> =
        sqlx::query_scalar("SELECT ended_at FROM playback_sessions WHERE id = ?")
            .bind(session_id.0)
            .fetch_optional(db)
            .await?;

    Ok(ended_at.map(|ended| match ended {
        Some(_) => SessionStatus::Ended,
        None => SessionStatus::Open,
    }))
}

pub async fn insert_event(
    db: &SqlitePool,
    session_id: SessionId,
    event_type: EventType,
    position: f64,
    payload: &Value,
) -> Result<i64> {
    let payload_json = serde_json::to_string(payload)
        .map_err(|e| crate::error::ApiError::Internal(format!("Cannot encode payload: {}", e)))?;

    let result = sqlx::query(
        r#"
        INSERT INTO playback_events (session_id, event_type, position, payload_json, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(session_id.0)
    .bind(event_type.as_str())
    .bind(position)
    .bind(payload_json)
    .bind(now_iso())
    .execute(db)
    .await?;
    Ok(result.last_insert_rowid())
}

/// Close a session. Only touches rows that are still open; returns whether
/// a row was closed.
pub async fn end_session(
    db: &SqlitePool,
    session_id: SessionId,
    last_position: f64,
    completed: bool,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE playback_sessions
        SET ended_at = ?, last_position = ?, completed = ?
        WHERE id = ? AND ended_at IS NULL
        "#,
    )
    .bind(now_iso())
    .bind(last_position)
    .bind(completed as i64)
    .bind(session_id.0)
    .execute(db)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// Event types recorded for a session, in arrival order
pub async fn event_types_for(db: &SqlitePool, session_id: SessionId) -> Result<Vec<String>> {
    let types = sqlx::query_scalar(
        "SELECT event_type FROM playback_events WHERE session_id = ? ORDER BY id",
    )
    .bind(session_id.0)
    .fetch_all(db)
    .await?;
    Ok(types)
}
