//! Recommendation endpoint

use crate::error::ApiResult;
use crate::services::recommendation_generator::{assemble_inputs, Recommendation};
use crate::AppState;
use aivis_common::time;
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use uuid::Uuid;

/// GET /projects/{project_id}/recommendations response body
#[derive(Debug, Serialize)]
pub struct RecommendationsResponse {
    pub recommendations: Vec<Recommendation>,
}

/// GET /projects/{project_id}/recommendations
pub async fn get_recommendations(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    headers: HeaderMap,
) -> ApiResult<Json<RecommendationsResponse>> {
    let account_id = super::account_id_from_headers(&headers)?;
    super::owned_project(&state, account_id, project_id).await?;

    // Oldest first, so gap order follows first appearance of each query
    let mut checks =
        crate::db::checks::list_for_project(&state.db, project_id, None, None).await?;
    checks.reverse();

    let crawl_issue_codes = crate::db::audits::latest_issue_codes(&state.db, project_id).await?;

    let inputs = assemble_inputs(&checks, &crawl_issue_codes, time::now());
    let recommendations = state.policy.rank(&inputs);

    Ok(Json(RecommendationsResponse { recommendations }))
}

/// Build recommendation routes
pub fn recommendation_routes() -> Router<AppState> {
    Router::new().route(
        "/projects/:project_id/recommendations",
        get(get_recommendations),
    )
}
