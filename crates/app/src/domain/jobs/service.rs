//! Jobs service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use sqlx::PgPool;

use crate::domain::{
    jobs::{
        data::{JobPage, JobStats, JobSummary, NewJob, Page, TerminalUpdate},
        errors::JobsServiceError,
        records::{JobRecord, JobUuid},
        repository::PgJobsRepository,
    },
    tenants::records::TenantUuid,
};

#[derive(Debug, Clone)]
pub struct PgJobsService {
    repository: PgJobsRepository,
}

impl PgJobsService {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: PgJobsRepository::new(pool),
        }
    }
}

#[async_trait]
impl JobsService for PgJobsService {
    async fn create_job(&self, job: NewJob) -> Result<JobRecord, JobsServiceError> {
        self.repository.create_job(job).await.map_err(Into::into)
    }

    async fn get_job(
        &self,
        job: JobUuid,
        owner: TenantUuid,
    ) -> Result<JobRecord, JobsServiceError> {
        self.repository
            .get_job(job, owner)
            .await
            .map_err(Into::into)
    }

    async fn update_terminal(
        &self,
        job: JobUuid,
        update: TerminalUpdate,
    ) -> Result<bool, JobsServiceError> {
        if self.repository.update_terminal(job, update).await? {
            return Ok(true);
        }

        if self.repository.job_exists(job).await? {
            Ok(false)
        } else {
            Err(JobsServiceError::NotFound)
        }
    }

    async fn list_jobs(&self, owner: TenantUuid, page: Page) -> Result<JobPage, JobsServiceError> {
        let (jobs, total) = self.repository.list_jobs(owner, page).await?;

        Ok(JobPage {
            jobs: jobs.into_iter().map(JobSummary::from).collect(),
            total: u64::try_from(total).unwrap_or_default(),
        })
    }

    async fn job_stats(&self, owner: TenantUuid) -> Result<JobStats, JobsServiceError> {
        self.repository.job_stats(owner).await.map_err(Into::into)
    }

    async fn fail_running(&self, reason: &str, at: Timestamp) -> Result<u64, JobsServiceError> {
        self.repository
            .fail_running(reason, at)
            .await
            .map_err(Into::into)
    }
}

/// Durable keyed storage for job state.
#[automock]
#[async_trait]
pub trait JobsService: Send + Sync {
    /// Persist a new job in the `running` state.
    async fn create_job(&self, job: NewJob) -> Result<JobRecord, JobsServiceError>;

    /// Fetch a job owned by `owner`. A job owned by someone else is
    /// reported exactly like a missing one.
    async fn get_job(&self, job: JobUuid, owner: TenantUuid)
    -> Result<JobRecord, JobsServiceError>;

    /// Apply the terminal transition. Returns `false` without touching the
    /// record when the job is already terminal.
    async fn update_terminal(
        &self,
        job: JobUuid,
        update: TerminalUpdate,
    ) -> Result<bool, JobsServiceError>;

    /// Owner's jobs, newest first.
    async fn list_jobs(&self, owner: TenantUuid, page: Page) -> Result<JobPage, JobsServiceError>;

    /// Aggregate counters over the owner's jobs.
    async fn job_stats(&self, owner: TenantUuid) -> Result<JobStats, JobsServiceError>;

    /// Fail every non-terminal job with `reason`. Used at startup to close
    /// out jobs whose process went away.
    async fn fail_running(&self, reason: &str, at: Timestamp) -> Result<u64, JobsServiceError>;
}
