//! In-process job store.

use std::{cmp::Reverse, collections::HashMap};

use async_trait::async_trait;
use jiff::Timestamp;
use tokio::sync::RwLock;

use crate::domain::{
    jobs::{
        JobsService,
        data::{JobOutcome, JobPage, JobStats, JobSummary, NewJob, Page, TerminalUpdate},
        errors::JobsServiceError,
        records::{JobRecord, JobResult, JobStatus, JobUuid},
    },
    tenants::records::TenantUuid,
};

/// Jobs held in memory. Reads take a shared lock, so a reader sees a job
/// either before or after its terminal write, never halfway.
#[derive(Debug, Default)]
pub struct MemoryJobsService {
    jobs: RwLock<HashMap<JobUuid, JobRecord>>,
}

impl MemoryJobsService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn apply(record: &mut JobRecord, update: TerminalUpdate) {
    record.status = update.outcome.status();
    record.progress = 100;
    record.completed_at = Some(update.completed_at);
    record.duration_seconds = Some(update.duration_seconds);

    match update.outcome {
        JobOutcome::Completed(result) => record.result = Some(result),
        JobOutcome::Failed { reason } => {
            record.failure = Some(reason);
            record.result = Some(JobResult::empty());
        }
    }
}

#[async_trait]
impl JobsService for MemoryJobsService {
    async fn create_job(&self, job: NewJob) -> Result<JobRecord, JobsServiceError> {
        let mut jobs = self.jobs.write().await;

        if jobs.contains_key(&job.uuid) {
            return Err(JobsServiceError::DuplicateId);
        }

        let record = JobRecord {
            uuid: job.uuid,
            owner: job.owner,
            target: job.target,
            profile: job.profile,
            depth: job.depth,
            headers: job.headers,
            status: JobStatus::Running,
            progress: 0,
            created_at: job.started_at,
            started_at: Some(job.started_at),
            completed_at: None,
            duration_seconds: None,
            failure: None,
            result: None,
        };

        jobs.insert(record.uuid, record.clone());

        Ok(record)
    }

    async fn get_job(
        &self,
        job: JobUuid,
        owner: TenantUuid,
    ) -> Result<JobRecord, JobsServiceError> {
        self.jobs
            .read()
            .await
            .get(&job)
            .filter(|record| record.owner == owner)
            .cloned()
            .ok_or(JobsServiceError::NotFound)
    }

    async fn update_terminal(
        &self,
        job: JobUuid,
        update: TerminalUpdate,
    ) -> Result<bool, JobsServiceError> {
        let mut jobs = self.jobs.write().await;

        let record = jobs.get_mut(&job).ok_or(JobsServiceError::NotFound)?;

        if record.status.is_terminal() {
            return Ok(false);
        }

        apply(record, update);

        Ok(true)
    }

    async fn list_jobs(&self, owner: TenantUuid, page: Page) -> Result<JobPage, JobsServiceError> {
        let jobs = self.jobs.read().await;

        let mut owned: Vec<&JobRecord> = jobs.values().filter(|job| job.owner == owner).collect();

        owned.sort_by_key(|job| Reverse((job.created_at, job.uuid)));

        let total = owned.len() as u64;

        let jobs = owned
            .into_iter()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .cloned()
            .map(JobSummary::from)
            .collect();

        Ok(JobPage { jobs, total })
    }

    async fn job_stats(&self, owner: TenantUuid) -> Result<JobStats, JobsServiceError> {
        let jobs = self.jobs.read().await;

        Ok(jobs
            .values()
            .filter(|job| job.owner == owner)
            .fold(JobStats::default(), |mut stats, job| {
                stats.total += 1;

                match job.status {
                    JobStatus::Completed => stats.completed += 1,
                    JobStatus::Failed => stats.failed += 1,
                    JobStatus::Pending | JobStatus::Running => stats.running += 1,
                }

                if let Some(result) = &job.result {
                    stats.vulnerabilities += u64::from(result.vulnerabilities);
                }

                stats
            }))
    }

    async fn fail_running(&self, reason: &str, at: Timestamp) -> Result<u64, JobsServiceError> {
        let mut jobs = self.jobs.write().await;
        let mut failed = 0;

        for record in jobs.values_mut().filter(|job| !job.status.is_terminal()) {
            let started = record.started_at.unwrap_or(record.created_at);

            apply(
                record,
                TerminalUpdate {
                    outcome: JobOutcome::Failed {
                        reason: reason.to_string(),
                    },
                    completed_at: at,
                    duration_seconds: at.duration_since(started).as_secs().max(0),
                },
            );

            failed += 1;
        }

        Ok(failed)
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::BTreeMap, sync::Arc};

    use testresult::TestResult;

    use crate::domain::jobs::{
        records::{ScanDepth, TestProfile},
        summary::summarize,
    };

    use super::*;

    fn new_job(owner: TenantUuid, started_at: Timestamp) -> NewJob {
        NewJob {
            uuid: JobUuid::new(),
            owner,
            target: "https://example.com".to_string(),
            profile: TestProfile::Security,
            depth: ScanDepth::Standard,
            headers: BTreeMap::new(),
            started_at,
        }
    }

    fn completed(at: Timestamp) -> TerminalUpdate {
        TerminalUpdate {
            outcome: JobOutcome::Completed(summarize(Vec::new(), ScanDepth::Standard)),
            completed_at: at,
            duration_seconds: 0,
        }
    }

    #[tokio::test]
    async fn foreign_job_looks_missing() -> TestResult {
        let store = MemoryJobsService::new();
        let alice = TenantUuid::new();
        let bob = TenantUuid::new();

        let job = store.create_job(new_job(alice, Timestamp::UNIX_EPOCH)).await?;

        let foreign = store.get_job(job.uuid, bob).await;
        let missing = store.get_job(JobUuid::new(), bob).await;

        assert_eq!(
            foreign.map_err(|e| e.to_string()),
            missing.map_err(|e| e.to_string())
        );

        Ok(())
    }

    #[tokio::test]
    async fn duplicate_id_is_a_conflict() -> TestResult {
        let store = MemoryJobsService::new();
        let job = new_job(TenantUuid::new(), Timestamp::UNIX_EPOCH);

        store.create_job(job.clone()).await?;

        assert!(matches!(
            store.create_job(job).await,
            Err(JobsServiceError::DuplicateId)
        ));

        Ok(())
    }

    #[tokio::test]
    async fn second_terminal_update_is_a_no_op() -> TestResult {
        let store = MemoryJobsService::new();
        let owner = TenantUuid::new();
        let job = store.create_job(new_job(owner, Timestamp::UNIX_EPOCH)).await?;

        assert!(store.update_terminal(job.uuid, completed(Timestamp::UNIX_EPOCH)).await?);

        let first = store.get_job(job.uuid, owner).await?;

        let failed = TerminalUpdate {
            outcome: JobOutcome::Failed {
                reason: "late".to_string(),
            },
            completed_at: Timestamp::from_second(90)?,
            duration_seconds: 90,
        };

        assert!(!store.update_terminal(job.uuid, failed).await?);
        assert_eq!(store.get_job(job.uuid, owner).await?, first);
        assert_eq!(first.status, JobStatus::Completed);

        Ok(())
    }

    #[tokio::test]
    async fn terminal_update_of_unknown_job_is_not_found() {
        let store = MemoryJobsService::new();

        let result = store
            .update_terminal(JobUuid::new(), completed(Timestamp::UNIX_EPOCH))
            .await;

        assert!(matches!(result, Err(JobsServiceError::NotFound)));
    }

    #[tokio::test]
    async fn concurrent_terminal_updates_apply_once() -> TestResult {
        let store = Arc::new(MemoryJobsService::new());
        let job = store
            .create_job(new_job(TenantUuid::new(), Timestamp::UNIX_EPOCH))
            .await?;

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store
                        .update_terminal(job.uuid, completed(Timestamp::UNIX_EPOCH))
                        .await
                })
            })
            .collect();

        let mut applied = 0;

        for handle in handles {
            if handle.await?? {
                applied += 1;
            }
        }

        assert_eq!(applied, 1);

        Ok(())
    }

    #[tokio::test]
    async fn history_pages_newest_first() -> TestResult {
        let store = MemoryJobsService::new();
        let owner = TenantUuid::new();

        let mut created = Vec::new();

        for second in 0..5 {
            created.push(
                store
                    .create_job(new_job(owner, Timestamp::from_second(second)?))
                    .await?
                    .uuid,
            );
        }

        store
            .create_job(new_job(TenantUuid::new(), Timestamp::UNIX_EPOCH))
            .await?;

        let page = store.list_jobs(owner, Page::new(Some(2), Some(1))).await?;

        assert_eq!(page.total, 5);
        assert_eq!(
            page.jobs.iter().map(|job| job.uuid).collect::<Vec<_>>(),
            vec![created[3], created[2]]
        );

        Ok(())
    }

    #[tokio::test]
    async fn fail_running_closes_open_jobs() -> TestResult {
        let store = MemoryJobsService::new();
        let owner = TenantUuid::new();

        let open = store.create_job(new_job(owner, Timestamp::UNIX_EPOCH)).await?;
        let done = store.create_job(new_job(owner, Timestamp::UNIX_EPOCH)).await?;

        store
            .update_terminal(done.uuid, completed(Timestamp::UNIX_EPOCH))
            .await?;

        let failed = store
            .fail_running("interrupted", Timestamp::from_second(30)?)
            .await?;

        assert_eq!(failed, 1);

        let open = store.get_job(open.uuid, owner).await?;

        assert_eq!(open.status, JobStatus::Failed);
        assert_eq!(open.failure.as_deref(), Some("interrupted"));
        assert_eq!(open.duration_seconds, Some(30));
        assert_eq!(open.result, Some(JobResult::empty()));

        let stats = store.job_stats(owner).await?;

        assert_eq!(stats.completed, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.running, 0);

        Ok(())
    }
}
