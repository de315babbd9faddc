//! Content gap endpoint

use crate::error::ApiResult;
use crate::services::gap_detector::{find_gaps, ContentGap};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

/// GET /projects/{project_id}/gaps
pub async fn get_gaps(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<ContentGap>>> {
    let account_id = super::account_id_from_headers(&headers)?;
    super::owned_project(&state, account_id, project_id).await?;

    // Oldest first, so gap order follows first appearance of each query
    let mut checks =
        crate::db::checks::list_for_project(&state.db, project_id, None, None).await?;
    checks.reverse();

    Ok(Json(find_gaps(&checks)))
}

/// Build gap routes
pub fn gap_routes() -> Router<AppState> {
    Router::new().route("/projects/:project_id/gaps", get(get_gaps))
}
