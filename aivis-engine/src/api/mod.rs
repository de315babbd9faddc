//! HTTP API handlers for the visibility engine
//!
//! Authentication is terminated by the external HTTP/auth layer, which
//! forwards the authenticated account id in the `x-account-id` header.
//! Every project-scoped handler re-checks ownership before touching data.

pub mod checks;
pub mod gaps;
pub mod health;
pub mod recommendations;
pub mod trends;

pub use checks::check_routes;
pub use gaps::gap_routes;
pub use health::health_routes;
pub use recommendations::recommendation_routes;
pub use trends::trend_routes;

use crate::error::ApiError;
use crate::models::Project;
use crate::AppState;
use axum::http::HeaderMap;
use uuid::Uuid;

/// Authenticated account id forwarded by the auth layer
pub fn account_id_from_headers(headers: &HeaderMap) -> Result<Uuid, ApiError> {
    let value = headers
        .get("x-account-id")
        .ok_or_else(|| ApiError::Validation("Missing x-account-id header".to_string()))?;

    let value = value
        .to_str()
        .map_err(|_| ApiError::Validation("Malformed x-account-id header".to_string()))?;

    Uuid::parse_str(value)
        .map_err(|_| ApiError::Validation("Malformed x-account-id header".to_string()))
}

/// Load a project and verify the account owns it
///
/// Unknown and unowned projects are indistinguishable to the caller; both
/// are NOT_FOUND.
pub async fn owned_project(
    state: &AppState,
    account_id: Uuid,
    project_id: Uuid,
) -> Result<Project, ApiError> {
    let project = crate::db::projects::get_project(&state.db, project_id)
        .await?
        .filter(|p| p.account_id == account_id)
        .ok_or_else(|| ApiError::NotFound(format!("Project {}", project_id)))?;

    Ok(project)
}
