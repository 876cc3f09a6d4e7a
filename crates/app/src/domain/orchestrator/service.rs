//! Job orchestration: admission, dispatch and the terminal transition.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

use crate::{
    clock::Clock,
    domain::{
        entitlements::EntitlementLedger,
        jobs::{
            JobsService, JobsServiceError,
            data::{JobOutcome, JobPage, JobStats, NewJob, Page, TerminalUpdate},
            records::{Finding, JobRecord, JobUuid},
            summary::summarize,
        },
        orchestrator::{
            engine::{AssessmentEngine, AssessmentRequest},
            errors::OrchestratorError,
            models::{JobRequest, JobView, OrchestratorSettings},
        },
        tenants::records::TenantUuid,
    },
};

/// Failure reason recorded for jobs found running at startup.
pub const INTERRUPTED_REASON: &str = "interrupted";

const TERMINAL_WRITE_BACKOFF: Duration = Duration::from_millis(200);

/// The job state machine.
#[automock]
#[async_trait]
pub trait JobOrchestrator: Send + Sync {
    /// Validate, claim quota, persist a `running` job and dispatch the engine.
    /// Returns as soon as the job is persisted.
    async fn start_job(
        &self,
        tenant: TenantUuid,
        request: JobRequest,
    ) -> Result<JobUuid, OrchestratorError>;

    /// Current state of one of the tenant's jobs.
    async fn get_status(
        &self,
        tenant: TenantUuid,
        job: JobUuid,
    ) -> Result<JobView, OrchestratorError>;

    /// The tenant's job history, newest first.
    async fn list_jobs(&self, tenant: TenantUuid, page: Page)
    -> Result<JobPage, OrchestratorError>;

    async fn job_stats(&self, tenant: TenantUuid) -> Result<JobStats, OrchestratorError>;

    /// Whether the tenant could start a job right now.
    async fn can_start(&self, tenant: TenantUuid) -> Result<bool, OrchestratorError>;

    /// Fail jobs left running by a previous process and free their slots.
    async fn recover_interrupted(&self) -> Result<u64, OrchestratorError>;
}

/// Orchestrator that runs each job as an independent task against an
/// [`AssessmentEngine`].
#[derive(Clone)]
pub struct EngineJobOrchestrator {
    jobs: Arc<dyn JobsService>,
    ledger: Arc<dyn EntitlementLedger>,
    engine: Arc<dyn AssessmentEngine>,
    clock: Arc<dyn Clock>,
    settings: OrchestratorSettings,
}

impl EngineJobOrchestrator {
    #[must_use]
    pub fn new(
        jobs: Arc<dyn JobsService>,
        ledger: Arc<dyn EntitlementLedger>,
        engine: Arc<dyn AssessmentEngine>,
        clock: Arc<dyn Clock>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            jobs,
            ledger,
            engine,
            clock,
            settings,
        }
    }

    /// Elapsed-time progress estimate. Capped at 99 until the job is
    /// terminal so 100 is only ever reported after the terminal write.
    fn progress(&self, record: &JobRecord, now: Timestamp) -> u8 {
        if record.status.is_terminal() {
            return 100;
        }

        let Some(started_at) = record.started_at else {
            return 0;
        };

        let elapsed = u128::try_from(now.duration_since(started_at).as_millis()).unwrap_or(0);
        let expected = self.settings.expected_duration.as_millis().max(1);

        u8::try_from((elapsed * 100 / expected).min(99)).unwrap_or(99)
    }

    async fn invoke_engine(
        &self,
        request: AssessmentRequest,
    ) -> Result<Vec<Finding>, OrchestratorError> {
        let engine = Arc::clone(&self.engine);
        let mut handle = tokio::spawn(async move { engine.run(request).await });

        match timeout(self.settings.engine_timeout, &mut handle).await {
            Ok(Ok(Ok(findings))) => Ok(findings),
            Ok(Ok(Err(error))) => Err(OrchestratorError::EngineFailure(error.to_string())),
            Ok(Err(join_error)) => Err(OrchestratorError::EngineFailure(if join_error.is_panic() {
                "engine panicked".to_string()
            } else {
                "engine task cancelled".to_string()
            })),
            Err(_elapsed) => {
                handle.abort();

                Err(OrchestratorError::EngineTimeout(self.settings.engine_timeout))
            }
        }
    }

    /// Runs detached from the request that started the job.
    async fn execute(self, record: JobRecord, request: AssessmentRequest) {
        let job = record.uuid;
        let tenant = record.owner;
        let started_at = record.started_at.unwrap_or(record.created_at);

        let outcome = match self.invoke_engine(request).await {
            Ok(findings) => JobOutcome::Completed(summarize(findings, record.depth)),
            Err(error) => {
                warn!(job = %job, tenant = %tenant, reason = %error, "job failed");

                JobOutcome::Failed {
                    reason: error.to_string(),
                }
            }
        };

        let completed_at = self.clock.now();
        let update = TerminalUpdate {
            outcome,
            completed_at,
            duration_seconds: completed_at.duration_since(started_at).as_secs().max(0),
        };

        let status = update.outcome.status();

        match self.write_terminal(job, update).await {
            Ok(true) => info!(job = %job, tenant = %tenant, status = %status, "job finished"),
            Ok(false) => {
                debug!(job = %job, "job already terminal");
                return;
            }
            Err(error) => {
                // Nothing is left running under this job.
                error!(
                    job = %job,
                    tenant = %tenant,
                    error = %error,
                    "job vanished before its terminal write"
                );
            }
        }

        if let Err(error) = self.ledger.release(tenant).await {
            error!(tenant = %tenant, error = %error, "failed to release running slot");
        }
    }

    /// Retries until the store accepts the write or reports the job gone.
    /// The running slot stays claimed meanwhile, so a job is never left
    /// `running` with its slot freed.
    async fn write_terminal(
        &self,
        job: JobUuid,
        update: TerminalUpdate,
    ) -> Result<bool, JobsServiceError> {
        let mut attempt: u32 = 1;
        let mut backoff = TERMINAL_WRITE_BACKOFF;

        loop {
            match self.jobs.update_terminal(job, update.clone()).await {
                Ok(applied) => return Ok(applied),
                Err(JobsServiceError::NotFound) => return Err(JobsServiceError::NotFound),
                Err(error) => {
                    if attempt < self.settings.terminal_write_attempts {
                        warn!(job = %job, attempt, error = %error, "retrying terminal write");
                    } else {
                        error!(job = %job, attempt, error = %error, "terminal write still failing");
                    }

                    sleep(backoff).await;

                    backoff = backoff
                        .saturating_mul(2)
                        .min(self.settings.terminal_write_max_backoff);
                    attempt = attempt.saturating_add(1);
                }
            }
        }
    }
}

#[async_trait]
impl JobOrchestrator for EngineJobOrchestrator {
    async fn start_job(
        &self,
        tenant: TenantUuid,
        request: JobRequest,
    ) -> Result<JobUuid, OrchestratorError> {
        let target = request.parse_target()?;

        let usage = match self.ledger.record_start(tenant).await {
            Ok(usage) => usage,
            Err(error) => {
                let error = OrchestratorError::from(error);

                if let OrchestratorError::QuotaExceeded { reason, .. } = &error {
                    info!(tenant = %tenant, reason = reason.as_str(), "job rejected by quota");
                }

                return Err(error);
            }
        };

        let new_job = NewJob {
            uuid: JobUuid::new(),
            owner: tenant,
            target: request.target.trim().to_string(),
            profile: request.profile,
            depth: request.depth,
            headers: request.headers,
            started_at: self.clock.now(),
        };

        let record = match self.jobs.create_job(new_job).await {
            Ok(record) => record,
            Err(error) => {
                error!(tenant = %tenant, error = %error, "failed to persist job");

                if let Err(revert) = self.ledger.revert_start(tenant).await {
                    error!(tenant = %tenant, error = %revert, "failed to revert quota");
                }

                return Err(error.into());
            }
        };

        info!(
            job = %record.uuid,
            tenant = %tenant,
            target = %record.target,
            profile = %record.profile,
            tests_this_month = usage.tests_this_month,
            "job started"
        );

        let job = record.uuid;
        let assessment = AssessmentRequest {
            job,
            target,
            profile: record.profile,
            depth: record.depth,
            headers: record.headers.clone(),
        };

        tokio::spawn(self.clone().execute(record, assessment));

        Ok(job)
    }

    async fn get_status(
        &self,
        tenant: TenantUuid,
        job: JobUuid,
    ) -> Result<JobView, OrchestratorError> {
        let record = self.jobs.get_job(job, tenant).await?;
        let progress = self.progress(&record, self.clock.now());

        Ok(JobView::from_record(record, progress))
    }

    async fn list_jobs(
        &self,
        tenant: TenantUuid,
        page: Page,
    ) -> Result<JobPage, OrchestratorError> {
        self.jobs.list_jobs(tenant, page).await.map_err(Into::into)
    }

    async fn job_stats(&self, tenant: TenantUuid) -> Result<JobStats, OrchestratorError> {
        self.jobs.job_stats(tenant).await.map_err(Into::into)
    }

    async fn can_start(&self, tenant: TenantUuid) -> Result<bool, OrchestratorError> {
        self.ledger.can_start(tenant).await.map_err(Into::into)
    }

    async fn recover_interrupted(&self) -> Result<u64, OrchestratorError> {
        let failed = self
            .jobs
            .fail_running(INTERRUPTED_REASON, self.clock.now())
            .await?;

        let reset = self.ledger.reset_running().await?;

        if failed > 0 || reset > 0 {
            warn!(failed, reset, "recovered interrupted jobs");
        }

        Ok(failed)
    }
}
