//! Project and competitor models

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Project record
///
/// A project tracks one brand domain and owns its visibility checks and
/// tracked competitors.
#[derive(Debug, Clone, Serialize)]
pub struct Project {
    pub guid: Uuid,
    pub account_id: Uuid,
    pub name: String,
    /// The brand domain being tracked (e.g. "acme.com")
    pub domain: String,
    pub created_at: DateTime<Utc>,
}

/// Tracked competitor domain within a project
#[derive(Debug, Clone, Serialize)]
pub struct Competitor {
    pub guid: Uuid,
    pub project_id: Uuid,
    pub domain: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
}
