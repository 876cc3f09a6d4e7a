//! In-process tenants store.

use std::collections::HashMap;

use async_trait::async_trait;
use jiff::Timestamp;
use tokio::sync::Mutex;

use crate::domain::tenants::{
    TenantsService,
    data::{NewTenant, StartAttempt},
    errors::TenantsServiceError,
    records::{TenantRecord, TenantUuid, check_start},
};

/// Tenants held in memory behind a single lock, so the check-and-increment in
/// [`TenantsService::try_record_start`] is one critical section.
#[derive(Debug, Default)]
pub struct MemoryTenantsService {
    tenants: Mutex<HashMap<TenantUuid, TenantRecord>>,
}

impl MemoryTenantsService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TenantsService for MemoryTenantsService {
    async fn create_tenant(
        &self,
        tenant: NewTenant,
        now: Timestamp,
    ) -> Result<TenantRecord, TenantsServiceError> {
        let mut tenants = self.tenants.lock().await;

        if tenants.contains_key(&tenant.uuid)
            || tenants.values().any(|existing| existing.email == tenant.email)
        {
            return Err(TenantsServiceError::AlreadyExists);
        }

        let record = TenantRecord {
            uuid: tenant.uuid,
            email: tenant.email,
            password_hash: tenant.password_hash,
            company_name: tenant.company_name,
            full_name: tenant.full_name,
            phone: tenant.phone,
            plan: tenant.plan,
            limits: tenant.limits,
            usage: tenant.usage,
            is_active: tenant.is_active,
            email_verified: tenant.email_verified,
            created_at: now,
            updated_at: now,
        };

        tenants.insert(record.uuid, record.clone());

        Ok(record)
    }

    async fn find_tenant_by_email(
        &self,
        email: &str,
    ) -> Result<Option<TenantRecord>, TenantsServiceError> {
        let tenants = self.tenants.lock().await;

        Ok(tenants
            .values()
            .find(|tenant| tenant.email == email)
            .cloned())
    }

    async fn get_tenant(&self, tenant: TenantUuid) -> Result<TenantRecord, TenantsServiceError> {
        self.tenants
            .lock()
            .await
            .get(&tenant)
            .cloned()
            .ok_or(TenantsServiceError::NotFound)
    }

    async fn try_record_start(
        &self,
        tenant: TenantUuid,
        now: Timestamp,
    ) -> Result<StartAttempt, TenantsServiceError> {
        let mut tenants = self.tenants.lock().await;

        let record = tenants
            .get_mut(&tenant)
            .ok_or(TenantsServiceError::NotFound)?;

        if check_start(&record.usage, &record.limits).is_err() {
            return Ok(StartAttempt::Rejected(record.clone()));
        }

        record.usage.tests_this_month += 1;
        record.usage.total_tests += 1;
        record.usage.running_tests += 1;
        record.usage.last_test_at = Some(now);
        record.updated_at = now;

        Ok(StartAttempt::Recorded(record.clone()))
    }

    async fn revert_start(
        &self,
        tenant: TenantUuid,
        now: Timestamp,
    ) -> Result<(), TenantsServiceError> {
        let mut tenants = self.tenants.lock().await;

        let record = tenants
            .get_mut(&tenant)
            .ok_or(TenantsServiceError::NotFound)?;

        record.usage.tests_this_month = record.usage.tests_this_month.saturating_sub(1);
        record.usage.total_tests = record.usage.total_tests.saturating_sub(1);
        record.usage.running_tests = record.usage.running_tests.saturating_sub(1);
        record.updated_at = now;

        Ok(())
    }

    async fn release_running(
        &self,
        tenant: TenantUuid,
        now: Timestamp,
    ) -> Result<(), TenantsServiceError> {
        let mut tenants = self.tenants.lock().await;

        let record = tenants
            .get_mut(&tenant)
            .ok_or(TenantsServiceError::NotFound)?;

        record.usage.running_tests = record.usage.running_tests.saturating_sub(1);
        record.updated_at = now;

        Ok(())
    }

    async fn reset_running_tests(&self) -> Result<u64, TenantsServiceError> {
        let mut tenants = self.tenants.lock().await;
        let mut reset = 0;

        for record in tenants.values_mut().filter(|r| r.usage.running_tests != 0) {
            record.usage.running_tests = 0;
            reset += 1;
        }

        Ok(reset)
    }

    async fn reset_monthly_usage(&self, now: Timestamp) -> Result<u64, TenantsServiceError> {
        let mut tenants = self.tenants.lock().await;
        let mut reset = 0;

        for record in tenants
            .values_mut()
            .filter(|r| r.usage.tests_this_month != 0)
        {
            record.usage.tests_this_month = 0;
            record.updated_at = now;
            reset += 1;
        }

        Ok(reset)
    }
}
