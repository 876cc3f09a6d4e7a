//! Entitlement ledger backed by the tenant usage counters.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;

use crate::{
    clock::Clock,
    domain::{
        entitlements::errors::EntitlementError,
        tenants::{
            TenantsService,
            data::StartAttempt,
            records::{QuotaReason, TenantUuid, Usage, check_start},
        },
    },
};

/// Plan-based admission control for job starts.
#[automock]
#[async_trait]
pub trait EntitlementLedger: Send + Sync {
    /// Whether the tenant could start a job right now. Advisory only; use
    /// [`EntitlementLedger::record_start`] to actually claim a slot.
    async fn can_start(&self, tenant: TenantUuid) -> Result<bool, EntitlementError>;

    /// Check limits and consume one unit of monthly quota plus one running
    /// slot as a single atomic step.
    async fn record_start(&self, tenant: TenantUuid) -> Result<Usage, EntitlementError>;

    /// Free the running slot claimed by `record_start` once the job is terminal.
    async fn release(&self, tenant: TenantUuid) -> Result<(), EntitlementError>;

    /// Give back everything `record_start` consumed for a job that was never
    /// persisted.
    async fn revert_start(&self, tenant: TenantUuid) -> Result<(), EntitlementError>;

    /// Zero every running slot after interrupted jobs have been failed.
    async fn reset_running(&self) -> Result<u64, EntitlementError>;
}

#[derive(Clone)]
pub struct TenantsLedger {
    tenants: Arc<dyn TenantsService>,
    clock: Arc<dyn Clock>,
}

impl TenantsLedger {
    #[must_use]
    pub fn new(tenants: Arc<dyn TenantsService>, clock: Arc<dyn Clock>) -> Self {
        Self { tenants, clock }
    }
}

#[async_trait]
impl EntitlementLedger for TenantsLedger {
    async fn can_start(&self, tenant: TenantUuid) -> Result<bool, EntitlementError> {
        let record = self.tenants.get_tenant(tenant).await?;

        Ok(check_start(&record.usage, &record.limits).is_ok())
    }

    async fn record_start(&self, tenant: TenantUuid) -> Result<Usage, EntitlementError> {
        match self
            .tenants
            .try_record_start(tenant, self.clock.now())
            .await?
        {
            StartAttempt::Recorded(record) => Ok(record.usage),
            StartAttempt::Rejected(record) => {
                let reason = check_start(&record.usage, &record.limits)
                    .err()
                    .unwrap_or(QuotaReason::ConcurrencyLimit);

                Err(EntitlementError::QuotaExceeded {
                    reason,
                    usage: record.usage,
                    limits: record.limits,
                })
            }
        }
    }

    async fn release(&self, tenant: TenantUuid) -> Result<(), EntitlementError> {
        self.tenants
            .release_running(tenant, self.clock.now())
            .await
            .map_err(Into::into)
    }

    async fn revert_start(&self, tenant: TenantUuid) -> Result<(), EntitlementError> {
        self.tenants
            .revert_start(tenant, self.clock.now())
            .await
            .map_err(Into::into)
    }

    async fn reset_running(&self) -> Result<u64, EntitlementError> {
        self.tenants.reset_running_tests().await.map_err(Into::into)
    }
}
