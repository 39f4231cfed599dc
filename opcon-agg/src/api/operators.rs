//! Operator registration

use axum::{extract::State, Json};
use opcon_common::api::types::RegisterOperatorRequest;
use opcon_common::models::Operator;
use tracing::info;

use crate::db;
use crate::error::{ok, ApiError, ApiResult};
use crate::AppState;

/// POST /api/operators/register
///
/// Name and DNI are trimmed; the DNI is stored upper-cased.
pub async fn register_operator(
    State(state): State<AppState>,
    body: Option<Json<RegisterOperatorRequest>>,
) -> ApiResult<Operator> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let name = request.name.trim().to_string();
    let dni = request.dni.trim().to_uppercase();

    if name.is_empty() || dni.is_empty() {
        return Err(ApiError::Validation("Name and DNI are required.".to_string()));
    }

    let operator_id = db::operators::insert_operator(&state.db, &name, &dni).await?;
    info!(operator_id, name = %name, "Operator registered");

    ok(Operator { operator_id, name, dni })
}
