//! In-memory test context for orchestration tests.

use std::{sync::Arc, time::Duration};

use crate::{
    clock::Clock,
    domain::{
        entitlements::TenantsLedger,
        jobs::MemoryJobsService,
        orchestrator::{EngineJobOrchestrator, engine::AssessmentEngine, models::OrchestratorSettings},
        tenants::{
            MemoryTenantsService, TenantsService, TenantsServiceError,
            data::NewTenant,
            records::{Plan, TenantUuid},
        },
    },
};

use super::{clock::ManualClock, fixtures::new_tenant};

pub(crate) const ENGINE_TIMEOUT: Duration = Duration::from_secs(30);
pub(crate) const EXPECTED_DURATION: Duration = Duration::from_secs(5);

pub(crate) struct TestContext {
    pub(crate) clock: Arc<ManualClock>,
    pub(crate) tenants: Arc<MemoryTenantsService>,
    pub(crate) jobs: Arc<MemoryJobsService>,
    pub(crate) orchestrator: EngineJobOrchestrator,
}

impl TestContext {
    pub(crate) fn with_engine(engine: Arc<dyn AssessmentEngine>) -> Self {
        let clock = Arc::new(ManualClock::default());
        let tenants = Arc::new(MemoryTenantsService::new());
        let jobs = Arc::new(MemoryJobsService::new());

        let ledger = TenantsLedger::new(tenants.clone(), clock.clone() as Arc<dyn Clock>);

        let orchestrator = EngineJobOrchestrator::new(
            jobs.clone(),
            Arc::new(ledger),
            engine,
            clock.clone(),
            OrchestratorSettings {
                engine_timeout: ENGINE_TIMEOUT,
                expected_duration: EXPECTED_DURATION,
                terminal_write_attempts: 3,
                terminal_write_max_backoff: Duration::from_secs(5),
            },
        );

        Self {
            clock,
            tenants,
            jobs,
            orchestrator,
        }
    }

    pub(crate) async fn tenant(&self, email: &str, plan: Plan) -> Result<TenantUuid, TenantsServiceError> {
        self.tenant_with(new_tenant(email, plan)).await
    }

    pub(crate) async fn tenant_with(&self, tenant: NewTenant) -> Result<TenantUuid, TenantsServiceError> {
        Ok(self
            .tenants
            .create_tenant(tenant, self.clock.now())
            .await?
            .uuid)
    }
}
