//! Orchestrator errors.

use std::time::Duration;

use thiserror::Error;

use crate::domain::{
    entitlements::EntitlementError,
    jobs::JobsServiceError,
    tenants::records::{PlanLimits, QuotaReason, Usage},
};

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("invalid target: {0}")]
    InvalidTarget(String),

    #[error("quota exceeded: {}", reason.as_str())]
    QuotaExceeded {
        reason: QuotaReason,
        usage: Usage,
        limits: PlanLimits,
    },

    #[error("engine timed out after {}s", .0.as_secs())]
    EngineTimeout(Duration),

    #[error("engine failed: {0}")]
    EngineFailure(String),

    /// Job is absent or owned by another tenant.
    #[error("job not found")]
    NotFound,

    #[error("job id conflict")]
    StoreConflict,

    #[error("entitlement ledger error")]
    Ledger(#[source] EntitlementError),

    #[error("job storage error")]
    Jobs(#[source] JobsServiceError),
}

impl From<JobsServiceError> for OrchestratorError {
    fn from(error: JobsServiceError) -> Self {
        match error {
            JobsServiceError::NotFound => Self::NotFound,
            JobsServiceError::DuplicateId => Self::StoreConflict,
            other => Self::Jobs(other),
        }
    }
}

impl From<EntitlementError> for OrchestratorError {
    fn from(error: EntitlementError) -> Self {
        match error {
            EntitlementError::QuotaExceeded {
                reason,
                usage,
                limits,
            } => Self::QuotaExceeded {
                reason,
                usage,
                limits,
            },
            other => Self::Ledger(other),
        }
    }
}
