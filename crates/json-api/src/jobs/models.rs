//! Job response models.

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use testgenium_app::domain::{
    jobs::{
        data::{JobPage, JobSummary},
        records::{Finding, JobResult, SeverityCounts},
    },
    orchestrator::models::JobView,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub(crate) struct FindingResponse {
    /// Weakness category, e.g. `SQL Injection`
    #[serde(rename = "type")]
    pub kind: String,

    /// `low`, `medium`, `high` or `critical`
    pub severity: String,

    pub payload: String,
    pub description: String,
    pub recommendation: String,
    pub url: String,
}

impl From<Finding> for FindingResponse {
    fn from(finding: Finding) -> Self {
        Self {
            kind: finding.kind,
            severity: finding.severity.to_string(),
            payload: finding.payload,
            description: finding.description,
            recommendation: finding.recommendation,
            url: finding.url,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub(crate) struct SeverityCountsResponse {
    pub critical: u32,
    pub high: u32,
    pub medium: u32,
    pub low: u32,
}

impl From<SeverityCounts> for SeverityCountsResponse {
    fn from(counts: SeverityCounts) -> Self {
        Self {
            critical: counts.critical,
            high: counts.high,
            medium: counts.medium,
            low: counts.low,
        }
    }
}

/// Result summary of a terminal job; zeroed for failed jobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub(crate) struct ResultResponse {
    pub vulnerabilities: u32,

    /// Percentage of the target surface exercised
    pub coverage: u8,

    /// Letter grade, `A+` to `F`
    pub score: String,

    pub summary: SeverityCountsResponse,
}

impl From<&JobResult> for ResultResponse {
    fn from(result: &JobResult) -> Self {
        Self {
            vulnerabilities: result.vulnerabilities,
            coverage: result.coverage,
            score: result.score.to_string(),
            summary: result.summary.into(),
        }
    }
}

/// Job Response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JobResponse {
    pub job_id: Uuid,

    /// `pending`, `running`, `completed` or `failed`
    pub status: String,

    /// 0 to 100; exactly 100 once the job is terminal
    pub progress: u8,

    pub target: String,
    pub profile: String,
    pub depth: String,
    pub created_at: String,
    pub started_at: Option<String>,
    pub completed_at: Option<String>,

    /// Whole seconds between start and completion
    pub duration: Option<i64>,

    /// Why the job failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ResultResponse>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub findings: Option<Vec<FindingResponse>>,
}

impl From<JobView> for JobResponse {
    fn from(view: JobView) -> Self {
        let result = view.result.as_ref().map(ResultResponse::from);
        let findings = view
            .result
            .map(|result| result.findings.into_iter().map(Into::into).collect());

        Self {
            job_id: view.uuid.into_uuid(),
            status: view.status.to_string(),
            progress: view.progress,
            target: view.target,
            profile: view.profile.to_string(),
            depth: view.depth.to_string(),
            created_at: view.created_at.to_string(),
            started_at: view.started_at.map(|at| at.to_string()),
            completed_at: view.completed_at.map(|at| at.to_string()),
            duration: view.duration_seconds,
            failure: view.failure,
            result,
            findings,
        }
    }
}

/// One row of job history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JobSummaryResponse {
    pub job_id: Uuid,
    pub target: String,
    pub profile: String,
    pub status: String,
    pub created_at: String,
    pub completed_at: Option<String>,

    /// 0 until the job has completed
    pub vulnerabilities: u32,

    /// `N/A` until the job has completed
    pub score: String,
}

impl From<JobSummary> for JobSummaryResponse {
    fn from(summary: JobSummary) -> Self {
        Self {
            job_id: summary.uuid.into_uuid(),
            target: summary.target,
            profile: summary.profile.to_string(),
            status: summary.status.to_string(),
            created_at: summary.created_at.to_string(),
            completed_at: summary.completed_at.map(|at| at.to_string()),
            vulnerabilities: summary.vulnerabilities.unwrap_or(0),
            score: summary
                .score
                .map_or_else(|| "N/A".to_string(), |score| score.to_string()),
        }
    }
}

/// Job History Response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub(crate) struct JobsResponse {
    pub jobs: Vec<JobSummaryResponse>,

    /// Every job the tenant owns, regardless of the page
    pub total: u64,
}

impl From<JobPage> for JobsResponse {
    fn from(page: JobPage) -> Self {
        Self {
            jobs: page.jobs.into_iter().map(Into::into).collect(),
            total: page.total,
        }
    }
}
