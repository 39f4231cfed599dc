//! Demo data endpoint

use axum::extract::State;
use opcon_common::api::types::SeedResponse;
use tracing::info;

use crate::db;
use crate::error::{ok, ApiResult};
use crate::AppState;

/// POST /api/seed
pub async fn seed_demo(State(state): State<AppState>) -> ApiResult<SeedResponse> {
    let created = db::demo::seed_demo(&state.db).await?;
    info!(sessions = created, "Demo data seeded");

    ok(SeedResponse {
        message: format!("Demo data created ({} sessions).", created),
    })
}
