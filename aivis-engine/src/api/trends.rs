//! Trend report endpoint

use crate::error::{ApiError, ApiResult};
use crate::services::score_engine::backlink_authority_signal;
use crate::services::trend_analyzer::{compute_trend, TrendReport};
use crate::AppState;
use aivis_common::time;
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    routing::get,
    Json, Router,
};
use chrono::Duration;
use uuid::Uuid;

/// GET /projects/{project_id}/trends
///
/// Recomputes the week-over-week trend from raw rows on every call; the
/// backlink snapshot is fetched fresh and shared by both windows.
pub async fn get_trends(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    headers: HeaderMap,
) -> ApiResult<Json<TrendReport>> {
    let account_id = super::account_id_from_headers(&headers)?;
    let project = super::owned_project(&state, account_id, project_id).await?;

    let now = time::now();
    let checks = crate::db::checks::list_for_project(
        &state.db,
        project_id,
        Some(now - Duration::days(14)),
        None,
    )
    .await?;

    let backlinks = state
        .backlinks
        .summary(&project.domain)
        .await
        .map_err(|e| ApiError::Upstream(format!("Backlink summary failed: {}", e)))?;
    let authority = backlink_authority_signal(backlinks.referring_domains);

    let report = compute_trend(&checks, now, authority, state.score_model.as_ref());
    Ok(Json(report))
}

/// Build trend routes
pub fn trend_routes() -> Router<AppState> {
    Router::new().route("/projects/:project_id/trends", get(get_trends))
}
