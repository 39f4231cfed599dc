//! Read-only projections: stats, leaderboard, operator history

use axum::extract::{Path, Query, State};
use opcon_common::api::types::{HistoryQuery, HistoryResponse, LeaderboardResponse, StatsResponse};

use crate::db;
use crate::error::{ok, ApiError, ApiResult};
use crate::AppState;

/// Upper bound on a single history page
pub const MAX_HISTORY_LIMIT: i64 = 100;

/// GET /api/stats
pub async fn get_stats(State(state): State<AppState>) -> ApiResult<StatsResponse> {
    let stats = db::aggregates::stats(&state.db).await?;
    ok(StatsResponse { stats })
}

/// GET /api/leaderboard
pub async fn get_leaderboard(State(state): State<AppState>) -> ApiResult<LeaderboardResponse> {
    let leaders = db::aggregates::leaderboard(&state.db, state.leaderboard_limit).await?;
    ok(LeaderboardResponse { leaders })
}

/// GET /api/operators/:id/history?limit=N
///
/// Unknown operators simply have no history.
pub async fn get_history(
    State(state): State<AppState>,
    Path(operator_id): Path<String>,
    query: Option<Query<HistoryQuery>>,
) -> ApiResult<HistoryResponse> {
    let operator_id: i64 = operator_id
        .parse()
        .map_err(|_| ApiError::Validation(format!("Invalid operator id: {}", operator_id)))?;

    let limit = query
        .and_then(|Query(q)| q.limit)
        .unwrap_or(state.history_limit)
        .clamp(1, MAX_HISTORY_LIMIT);

    let sessions = db::aggregates::history(&state.db, operator_id, limit).await?;
    ok(HistoryResponse { sessions })
}
