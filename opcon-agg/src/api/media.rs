//! Media catalog endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use opcon_common::api::types::{
    AddMediaRequest, AddMediaResponse, ImportMediaRequest, ImportMediaResponse, MediaListResponse,
    MediaQuery,
};
use opcon_common::models::{MediaKind, DEFAULT_GENRE};
use serde_json::Value;
use tracing::{debug, info};

use crate::db;
use crate::db::media::NewMedia;
use crate::error::{ok, ApiError, ApiResult};
use crate::AppState;

/// GET /api/media?kind=audio|video
///
/// An unrecognized kind filter is ignored and the whole catalog returned.
pub async fn list_media(
    State(state): State<AppState>,
    query: Option<Query<MediaQuery>>,
) -> ApiResult<MediaListResponse> {
    let kind = query
        .and_then(|Query(q)| q.kind)
        .and_then(|k| k.parse::<MediaKind>().ok());

    let items = db::media::list_media(&state.db, kind).await?;
    ok(MediaListResponse { items })
}

/// POST /api/media
pub async fn add_media(
    State(state): State<AppState>,
    body: Option<Json<AddMediaRequest>>,
) -> ApiResult<AddMediaResponse> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let title = request.title.trim();
    let source_url = request.source_url.trim();

    if title.is_empty() || request.kind.trim().is_empty() || source_url.is_empty() {
        return Err(ApiError::Validation("Incomplete media data.".to_string()));
    }

    let kind = request
        .kind
        .trim()
        .parse::<MediaKind>()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let genre = request
        .genre
        .as_deref()
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .unwrap_or(DEFAULT_GENRE);

    let item = NewMedia::new(
        title,
        kind,
        source_url,
        request.duration_seconds.unwrap_or(0).max(0),
        genre,
    );
    let media_id = db::media::insert_media(&state.db, &item).await?;
    info!(media_id, kind = %kind, "Media item added");

    ok(AddMediaResponse { media_id })
}

/// POST /api/import
///
/// Re-inserts catalog rows from an export. Rows missing a title, a known
/// kind or a source url are skipped; the rest go in together.
pub async fn import_media(
    State(state): State<AppState>,
    body: Option<Json<ImportMediaRequest>>,
) -> ApiResult<ImportMediaResponse> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let rows = match request.media {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(rows)) => rows,
        Some(_) => {
            return Err(ApiError::Validation(
                "Expected a list of media items.".to_string(),
            ))
        }
    };

    let items: Vec<NewMedia> = rows.iter().filter_map(NewMedia::from_export).collect();
    let skipped = rows.len() - items.len();
    if skipped > 0 {
        debug!(skipped, "Skipped incomplete rows in media import");
    }

    let imported = db::media::import_media(&state.db, &items).await?;
    info!(imported, "Media imported");

    ok(ImportMediaResponse { imported })
}
