//! Monthly check quota admission
//!
//! Usage is derived at admission time by counting stored check rows across
//! every project the account owns since the start of the current UTC
//! calendar month; there is no stored counter to drift.
//!
//! Admission is all-or-nothing for a batch: the plan predicate receives
//! the full requested provider count, and a denied batch runs no provider
//! at all.
//!
//! Known limitation: admission is read-then-decide with no reservation or
//! cross-request locking, so two concurrent batches from the same account
//! can each pass admission and jointly exceed the plan limit. The cap is
//! advisory under concurrency. Replacing this with an atomic
//! increment-and-check is confined to this module.

use crate::models::Account;
use aivis_common::time::month_start;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use thiserror::Error;

/// Quota admission errors
#[derive(Debug, Error)]
pub enum QuotaError {
    /// The batch would exceed the plan's monthly check budget
    #[error("Plan limit reached: {used} of {limit} checks used, {requested} requested")]
    LimitReached {
        used: u64,
        requested: u64,
        limit: u64,
    },

    /// Usage could not be derived
    #[error(transparent)]
    Storage(#[from] aivis_common::Error),
}

/// Admit or deny a batch of `requested` provider checks for `account`
pub async fn admit(
    pool: &SqlitePool,
    account: &Account,
    requested: usize,
    now: DateTime<Utc>,
) -> Result<(), QuotaError> {
    let period_start = month_start(now);
    let used =
        crate::db::checks::count_for_account_since(pool, account.guid, period_start).await? as u64;
    let requested = requested as u64;

    if !account.plan.allows(used, requested) {
        tracing::info!(
            account_id = %account.guid,
            plan = account.plan.as_str(),
            used,
            requested,
            "Check batch denied: plan limit reached"
        );
        return Err(QuotaError::LimitReached {
            used,
            requested,
            limit: account.plan.monthly_check_limit(),
        });
    }

    Ok(())
}
