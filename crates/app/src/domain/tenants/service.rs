//! Tenants service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use sqlx::PgPool;

use crate::domain::tenants::{
    data::{NewTenant, StartAttempt},
    errors::TenantsServiceError,
    records::{TenantRecord, TenantUuid},
    repository::PgTenantsRepository,
};

#[derive(Debug, Clone)]
pub struct PgTenantsService {
    repository: PgTenantsRepository,
}

impl PgTenantsService {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: PgTenantsRepository::new(pool),
        }
    }
}

#[async_trait]
impl TenantsService for PgTenantsService {
    async fn create_tenant(
        &self,
        tenant: NewTenant,
        now: Timestamp,
    ) -> Result<TenantRecord, TenantsServiceError> {
        self.repository
            .create_tenant(tenant, now)
            .await
            .map_err(Into::into)
    }

    async fn find_tenant_by_email(
        &self,
        email: &str,
    ) -> Result<Option<TenantRecord>, TenantsServiceError> {
        self.repository
            .find_tenant_by_email(email)
            .await
            .map_err(Into::into)
    }

    async fn get_tenant(&self, tenant: TenantUuid) -> Result<TenantRecord, TenantsServiceError> {
        self.repository.get_tenant(tenant).await.map_err(Into::into)
    }

    async fn try_record_start(
        &self,
        tenant: TenantUuid,
        now: Timestamp,
    ) -> Result<StartAttempt, TenantsServiceError> {
        if let Some(updated) = self.repository.record_start(tenant, now).await? {
            return Ok(StartAttempt::Recorded(updated));
        }

        let current = self.repository.get_tenant(tenant).await?;

        Ok(StartAttempt::Rejected(current))
    }

    async fn revert_start(
        &self,
        tenant: TenantUuid,
        now: Timestamp,
    ) -> Result<(), TenantsServiceError> {
        match self.repository.revert_start(tenant, now).await? {
            0 => Err(TenantsServiceError::NotFound),
            _ => Ok(()),
        }
    }

    async fn release_running(
        &self,
        tenant: TenantUuid,
        now: Timestamp,
    ) -> Result<(), TenantsServiceError> {
        match self.repository.release_running(tenant, now).await? {
            0 => Err(TenantsServiceError::NotFound),
            _ => Ok(()),
        }
    }

    async fn reset_running_tests(&self) -> Result<u64, TenantsServiceError> {
        self.repository
            .reset_running_tests()
            .await
            .map_err(Into::into)
    }

    async fn reset_monthly_usage(&self, now: Timestamp) -> Result<u64, TenantsServiceError> {
        self.repository
            .reset_monthly_usage(now)
            .await
            .map_err(Into::into)
    }
}

/// Tenant persistence operations.
#[automock]
#[async_trait]
pub trait TenantsService: Send + Sync {
    /// Creates a new tenant.
    async fn create_tenant(
        &self,
        tenant: NewTenant,
        now: Timestamp,
    ) -> Result<TenantRecord, TenantsServiceError>;

    /// Looks a tenant up by exact email.
    async fn find_tenant_by_email(
        &self,
        email: &str,
    ) -> Result<Option<TenantRecord>, TenantsServiceError>;

    /// Retrieves a single tenant.
    async fn get_tenant(&self, tenant: TenantUuid) -> Result<TenantRecord, TenantsServiceError>;

    /// Atomically checks the tenant's limits and, if a job fits, increments
    /// the monthly, total and running counters in the same step.
    async fn try_record_start(
        &self,
        tenant: TenantUuid,
        now: Timestamp,
    ) -> Result<StartAttempt, TenantsServiceError>;

    /// Undoes one successful `try_record_start`.
    async fn revert_start(
        &self,
        tenant: TenantUuid,
        now: Timestamp,
    ) -> Result<(), TenantsServiceError>;

    /// Frees one running slot.
    async fn release_running(
        &self,
        tenant: TenantUuid,
        now: Timestamp,
    ) -> Result<(), TenantsServiceError>;

    /// Zeroes every running counter. Only valid while no jobs are running.
    async fn reset_running_tests(&self) -> Result<u64, TenantsServiceError>;

    /// Zeroes every tenant's monthly counter.
    async fn reset_monthly_usage(&self, now: Timestamp) -> Result<u64, TenantsServiceError>;
}
