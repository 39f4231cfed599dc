//! Aggregate projections: totals, leaderboard and per-operator history

use opcon_common::models::{HistoryEntry, LeaderboardRow, MediaKind, StatsSnapshot, DEFAULT_GENRE};
use sqlx::{Row, SqlitePool};

use crate::error::{ApiError, Result};

pub async fn stats(db: &SqlitePool) -> Result<StatsSnapshot> {
    let row = sqlx::query(
        r#"
        SELECT
            (SELECT COUNT(*) FROM media_items) AS media_total,
            (SELECT COUNT(*) FROM operators) AS operators_total,
            (SELECT COUNT(*) FROM playback_sessions) AS sessions_total,
            (SELECT COUNT(*) FROM playback_events) AS events_total
        "#,
    )
    .fetch_one(db)
    .await?;

    Ok(StatsSnapshot {
        media_total: row.get("media_total"),
        operators_total: row.get("operators_total"),
        sessions_total: row.get("sessions_total"),
        events_total: row.get("events_total"),
    })
}

/// Operators ranked by session count.
///
/// Ties fall back to completions, then average last position, then
/// registration order, so the ranking is stable between calls.
pub async fn leaderboard(db: &SqlitePool, limit: i64) -> Result<Vec<LeaderboardRow>> {
    let rows = sqlx::query(
        r#"
        SELECT
            o.id,
            o.name,
            o.dni,
            COUNT(ps.id) AS total_sessions,
            COALESCE(SUM(ps.completed), 0) AS completions,
            CAST(ROUND(COALESCE(AVG(ps.last_position), 0), 2) AS REAL) AS avg_position
        FROM operators o
        LEFT JOIN playback_sessions ps ON ps.operator_id = o.id
        GROUP BY o.id, o.name, o.dni
        ORDER BY total_sessions DESC, completions DESC, avg_position DESC, o.id ASC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(db)
    .await?;

    Ok(rows
        .iter()
        .map(|row| LeaderboardRow {
            id: row.get("id"),
            name: row.get("name"),
            dni: row.get("dni"),
            total_sessions: row.get("total_sessions"),
            completions: row.get("completions"),
            avg_position: row.get("avg_position"),
        })
        .collect())
}

/// Most recent sessions of one operator, newest first
pub async fn history(db: &SqlitePool, operator_id: i64, limit: i64) -> Result<Vec<HistoryEntry>> {
    let rows = sqlx::query(
        r#"
        SELECT ps.id, ps.started_at, ps.ended_at,
               CAST(COALESCE(ps.last_position, 0) AS REAL) AS last_position,
               COALESCE(ps.completed, 0) AS completed,
               mi.title, mi.kind, mi.genre
        FROM playback_sessions ps
        JOIN media_items mi ON mi.id = ps.media_item_id
        WHERE ps.operator_id = ?
        ORDER BY ps.id DESC
        LIMIT ?
        "#,
    )
    .bind(operator_id)
    .bind(limit)
    .fetch_all(db)
    .await?;

    rows.iter()
        .map(|row| {
            let kind = row
                .get::<String, _>("kind")
                .parse::<MediaKind>()
                .map_err(|e| ApiError::Internal(e.to_string()))?;
            Ok(HistoryEntry {
                id: row.get("id"),
                started_at: row.get("started_at"),
                ended_at: row.get("ended_at"),
                title: row.get("title"),
                kind,
                genre: row
                    .get::<Option<String>, _>("genre")
                    .unwrap_or_else(|| DEFAULT_GENRE.to_string()),
                completed: row.get::<i64, _>("completed") != 0,
                last_position: row.get("last_position"),
            })
        })
        .collect()
}
