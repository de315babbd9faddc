//! Check batch and listing endpoints

use crate::error::ApiResult;
use crate::models::VisibilityCheck;
use crate::services::check_orchestrator::{self, CheckRequest};
use crate::types::Provider;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// POST /projects/{project_id}/checks request body
#[derive(Debug, Deserialize)]
pub struct RunCheckBody {
    pub query: String,
    pub providers: Vec<Provider>,
    /// Overrides the project's tracked competitor list when present
    #[serde(default)]
    pub competitors: Option<Vec<String>>,
    #[serde(default)]
    pub keyword_id: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

/// One row that failed to persist, reported next to the stored rows
#[derive(Debug, Serialize)]
pub struct FailedWrite {
    pub provider: Provider,
    pub code: &'static str,
    pub message: String,
}

/// Best-effort batch response: stored rows plus any write failures
#[derive(Debug, Serialize)]
pub struct CheckBatchResponse {
    pub stored: Vec<VisibilityCheck>,
    pub failed: Vec<FailedWrite>,
}

/// POST /projects/{project_id}/checks
///
/// Runs the query across the requested providers. Responds 207 when some
/// rows failed to persist; the body always distinguishes stored rows from
/// failures.
pub async fn run_check(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    headers: HeaderMap,
    Json(body): Json<RunCheckBody>,
) -> ApiResult<Response> {
    let account_id = super::account_id_from_headers(&headers)?;

    let outcome = check_orchestrator::run_check(
        &state.db,
        &state.engines,
        state.sentiment.as_ref(),
        account_id,
        project_id,
        CheckRequest {
            query: body.query,
            providers: body.providers,
            competitors: body.competitors,
            keyword_id: body.keyword_id,
            region: body.region,
            language: body.language,
        },
    )
    .await?;

    let failed: Vec<FailedWrite> = outcome
        .failed_writes
        .into_iter()
        .map(|failure| FailedWrite {
            provider: failure.provider,
            code: "PERSISTENCE_FAILURE",
            message: failure.message,
        })
        .collect();

    let status = if failed.is_empty() {
        StatusCode::OK
    } else {
        StatusCode::MULTI_STATUS
    };

    let body = CheckBatchResponse {
        stored: outcome.stored,
        failed,
    };

    Ok((status, Json(body)).into_response())
}

/// GET /projects/{project_id}/checks query parameters
#[derive(Debug, Deserialize)]
pub struct ListChecksParams {
    #[serde(default)]
    pub since: Option<DateTime<Utc>>,
    #[serde(default)]
    pub limit: Option<i64>,
}

/// GET /projects/{project_id}/checks
pub async fn list_checks(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    headers: HeaderMap,
    Query(params): Query<ListChecksParams>,
) -> ApiResult<Json<Vec<VisibilityCheck>>> {
    let account_id = super::account_id_from_headers(&headers)?;
    super::owned_project(&state, account_id, project_id).await?;

    let checks = crate::db::checks::list_for_project(
        &state.db,
        project_id,
        params.since,
        Some(params.limit.unwrap_or(100).clamp(1, 1_000)),
    )
    .await?;

    Ok(Json(checks))
}

/// Build check routes
pub fn check_routes() -> Router<AppState> {
    Router::new()
        .route("/projects/:project_id/checks", post(run_check))
        .route("/projects/:project_id/checks", get(list_checks))
}
