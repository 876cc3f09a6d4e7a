//! App Context

use std::{sync::Arc, time::Duration};

use jiff::SignedDuration;
use sqlx::PgPool;
use thiserror::Error;

use crate::{
    auth::{AuthService, DEFAULT_SESSION_TTL, PasswordHasher, SigningKey, TokenAuthService},
    clock::{Clock, SystemClock},
    domain::{
        entitlements::TenantsLedger,
        jobs::{JobsService, MemoryJobsService, PgJobsService},
        orchestrator::{
            EngineJobOrchestrator, JobOrchestrator, OrchestratorError,
            engine::{AssessmentEngine, DemoEngine},
            models::OrchestratorSettings,
        },
        tenants::{MemoryTenantsService, PgTenantsService, TenantsService},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to recover interrupted jobs")]
    Recovery(#[source] OrchestratorError),
}

/// Runtime settings shared by every storage backend.
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub signing_key: SigningKey,
    pub session_ttl: SignedDuration,

    /// Delay of the built-in demo engine.
    pub engine_delay: Duration,

    pub orchestrator: OrchestratorSettings,
}

impl AppSettings {
    #[must_use]
    pub fn new(signing_key: SigningKey) -> Self {
        Self {
            signing_key,
            session_ttl: DEFAULT_SESSION_TTL,
            engine_delay: Duration::from_secs(5),
            orchestrator: OrchestratorSettings::default(),
        }
    }
}

#[derive(Clone)]
pub struct AppContext {
    pub tenants: Arc<dyn TenantsService>,
    pub auth: Arc<dyn AuthService>,
    pub jobs: Arc<dyn JobOrchestrator>,
}

impl AppContext {
    #[must_use]
    pub fn from_pool(pool: PgPool, settings: AppSettings) -> Self {
        let engine = Arc::new(DemoEngine::new(settings.engine_delay));

        Self::assemble(
            Arc::new(PgTenantsService::new(pool.clone())),
            Arc::new(PgJobsService::new(pool)),
            engine,
            settings,
        )
    }

    /// Context whose state lives only in this process.
    #[must_use]
    pub fn in_memory(settings: AppSettings) -> Self {
        let engine = Arc::new(DemoEngine::new(settings.engine_delay));

        Self::assemble(
            Arc::new(MemoryTenantsService::new()),
            Arc::new(MemoryJobsService::new()),
            engine,
            settings,
        )
    }

    /// Wire services over the given stores and engine.
    #[must_use]
    pub fn assemble(
        tenants: Arc<dyn TenantsService>,
        jobs: Arc<dyn JobsService>,
        engine: Arc<dyn AssessmentEngine>,
        settings: AppSettings,
    ) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let ledger = TenantsLedger::new(Arc::clone(&tenants), Arc::clone(&clock));

        let orchestrator = EngineJobOrchestrator::new(
            jobs,
            Arc::new(ledger),
            engine,
            Arc::clone(&clock),
            settings.orchestrator,
        );

        let auth = TokenAuthService::new(
            Arc::clone(&tenants),
            PasswordHasher::new(),
            settings.signing_key,
            settings.session_ttl,
            clock,
        );

        Self {
            tenants,
            auth: Arc::new(auth),
            jobs: Arc::new(orchestrator),
        }
    }

    /// Close out jobs left running by a previous process.
    ///
    /// # Errors
    ///
    /// Returns an error if the stores cannot be updated.
    pub async fn recover(&self) -> Result<u64, AppInitError> {
        self.jobs
            .recover_interrupted()
            .await
            .map_err(AppInitError::Recovery)
    }
}
