//! Account and plan tier models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Subscription plan tier
///
/// Bounds the number of visibility checks an account may run per calendar
/// month, counted across every project the account owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Free,
    Starter,
    Pro,
    Agency,
}

impl Plan {
    /// Monthly visibility-check budget for this tier
    pub fn monthly_check_limit(&self) -> u64 {
        match self {
            Plan::Free => 25,
            Plan::Starter => 250,
            Plan::Pro => 1_000,
            Plan::Agency => 5_000,
        }
    }

    /// Plan-limit predicate: can a batch of `requested` checks run when
    /// `used` checks have already been consumed this period?
    ///
    /// The batch is admitted all-or-nothing; `requested` is the full batch
    /// size, never a partial increment.
    pub fn allows(&self, used: u64, requested: u64) -> bool {
        used + requested <= self.monthly_check_limit()
    }

    /// Stable string form used in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Free => "free",
            Plan::Starter => "starter",
            Plan::Pro => "pro",
            Plan::Agency => "agency",
        }
    }

    /// Parse the stable string form
    pub fn parse(s: &str) -> Option<Plan> {
        match s {
            "free" => Some(Plan::Free),
            "starter" => Some(Plan::Starter),
            "pro" => Some(Plan::Pro),
            "agency" => Some(Plan::Agency),
            _ => None,
        }
    }
}

/// Account record
///
/// Owns zero or more projects. The monthly quota is derived from stored
/// check rows at admission time, never kept as a counter.
#[derive(Debug, Clone, Serialize)]
pub struct Account {
    pub guid: Uuid,
    pub email: String,
    pub plan: Plan,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_limits_are_ordered() {
        assert!(Plan::Free.monthly_check_limit() < Plan::Starter.monthly_check_limit());
        assert!(Plan::Starter.monthly_check_limit() < Plan::Pro.monthly_check_limit());
        assert!(Plan::Pro.monthly_check_limit() < Plan::Agency.monthly_check_limit());
    }

    #[test]
    fn test_allows_treats_batch_atomically() {
        // One check below the limit: a 3-provider batch must be denied as a
        // whole, not partially admitted.
        let used = Plan::Free.monthly_check_limit() - 1;
        assert!(!Plan::Free.allows(used, 3));
        assert!(Plan::Free.allows(used, 1));
    }

    #[test]
    fn test_allows_boundary_is_inclusive() {
        assert!(Plan::Starter.allows(0, 250));
        assert!(!Plan::Starter.allows(0, 251));
        assert!(!Plan::Starter.allows(250, 1));
    }

    #[test]
    fn test_plan_round_trip() {
        for plan in [Plan::Free, Plan::Starter, Plan::Pro, Plan::Agency] {
            assert_eq!(Plan::parse(plan.as_str()), Some(plan));
        }
        assert_eq!(Plan::parse("enterprise"), None);
    }
}
