//! Job Data

use std::collections::BTreeMap;

use jiff::Timestamp;

use crate::domain::{
    jobs::records::{JobRecord, JobResult, JobStatus, JobUuid, ScanDepth, Score, TestProfile},
    tenants::records::TenantUuid,
};

/// New Job Data. Jobs are persisted directly in the `running` state.
#[derive(Debug, Clone, PartialEq)]
pub struct NewJob {
    pub uuid: JobUuid,
    pub owner: TenantUuid,
    pub target: String,
    pub profile: TestProfile,
    pub depth: ScanDepth,
    pub headers: BTreeMap<String, String>,
    pub started_at: Timestamp,
}

/// How a job ended.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Completed(JobResult),
    Failed { reason: String },
}

impl JobOutcome {
    #[must_use]
    pub const fn status(&self) -> JobStatus {
        match self {
            Self::Completed(_) => JobStatus::Completed,
            Self::Failed { .. } => JobStatus::Failed,
        }
    }
}

/// The single terminal write applied to a job.
#[derive(Debug, Clone, PartialEq)]
pub struct TerminalUpdate {
    pub outcome: JobOutcome,
    pub completed_at: Timestamp,
    pub duration_seconds: i64,
}

/// Pagination window for job history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}

impl Page {
    pub const DEFAULT_LIMIT: u32 = 10;
    pub const MAX_LIMIT: u32 = 100;

    /// Build a page, clamping `limit` into `1..=100`.
    #[must_use]
    pub fn new(limit: Option<u32>, offset: Option<u32>) -> Self {
        Self {
            limit: limit
                .unwrap_or(Self::DEFAULT_LIMIT)
                .clamp(1, Self::MAX_LIMIT),
            offset: offset.unwrap_or(0),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One row of a tenant's job history.
#[derive(Debug, Clone, PartialEq)]
pub struct JobSummary {
    pub uuid: JobUuid,
    pub target: String,
    pub profile: TestProfile,
    pub status: JobStatus,
    pub created_at: Timestamp,
    pub completed_at: Option<Timestamp>,
    pub vulnerabilities: Option<u32>,
    pub score: Option<Score>,
}

impl From<JobRecord> for JobSummary {
    fn from(record: JobRecord) -> Self {
        // Failed jobs carry an empty result; history shows them unscored.
        let result = match record.status {
            JobStatus::Completed => record.result.as_ref(),
            JobStatus::Pending | JobStatus::Running | JobStatus::Failed => None,
        };

        Self {
            uuid: record.uuid,
            target: record.target,
            profile: record.profile,
            status: record.status,
            created_at: record.created_at,
            completed_at: record.completed_at,
            vulnerabilities: result.map(|result| result.vulnerabilities),
            score: result.map(|result| result.score),
        }
    }
}

/// A page of job history plus the tenant's total job count.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JobPage {
    pub jobs: Vec<JobSummary>,
    pub total: u64,
}

/// Aggregate counters over a tenant's jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JobStats {
    pub total: u64,
    pub completed: u64,
    pub failed: u64,
    pub running: u64,
    pub vulnerabilities: u64,
}
