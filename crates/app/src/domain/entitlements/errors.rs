//! Entitlement errors.

use thiserror::Error;

use crate::domain::tenants::{
    TenantsServiceError,
    records::{PlanLimits, QuotaReason, Usage},
};

#[derive(Debug, Error)]
pub enum EntitlementError {
    /// The tenant has no room for another job. Carries the counters and
    /// limits as observed at the moment of rejection.
    #[error("quota exceeded: {}", reason.as_str())]
    QuotaExceeded {
        reason: QuotaReason,
        usage: Usage,
        limits: PlanLimits,
    },

    #[error("tenant not found")]
    TenantNotFound,

    #[error("tenant storage error")]
    Tenants(#[source] TenantsServiceError),
}

impl From<TenantsServiceError> for EntitlementError {
    fn from(error: TenantsServiceError) -> Self {
        match error {
            TenantsServiceError::NotFound => Self::TenantNotFound,
            other => Self::Tenants(other),
        }
    }
}
