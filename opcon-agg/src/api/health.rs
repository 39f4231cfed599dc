//! Health check endpoint

use axum::extract::State;
use opcon_common::api::types::HealthResponse;
use opcon_common::time::now_iso;

use crate::error::{ok, ApiResult};
use crate::AppState;

/// GET /api/health
///
/// Touches the database so a broken pool shows up as a failure envelope.
pub async fn health(State(state): State<AppState>) -> ApiResult<HealthResponse> {
    sqlx::query("SELECT 1").execute(&state.db).await?;

    ok(HealthResponse {
        db: state.db_name.clone(),
        utc: now_iso(),
    })
}
