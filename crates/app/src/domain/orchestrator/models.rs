//! Orchestrator request and view models.

use std::{collections::BTreeMap, time::Duration};

use jiff::Timestamp;
use url::Url;

use crate::domain::{
    jobs::records::{JobRecord, JobResult, JobStatus, JobUuid, ScanDepth, TestProfile},
    orchestrator::errors::OrchestratorError,
};

/// A tenant's request to assess a target.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobRequest {
    pub target: String,
    pub profile: TestProfile,
    pub depth: ScanDepth,
    pub headers: BTreeMap<String, String>,
}

impl JobRequest {
    /// Parse the target as an absolute `http`/`https` URL with a host.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::InvalidTarget`] otherwise.
    pub fn parse_target(&self) -> Result<Url, OrchestratorError> {
        let target = self.target.trim();

        if target.is_empty() {
            return Err(OrchestratorError::InvalidTarget("target is required".to_string()));
        }

        let url = Url::parse(target)
            .map_err(|error| OrchestratorError::InvalidTarget(error.to_string()))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(OrchestratorError::InvalidTarget(format!(
                "unsupported scheme `{}`",
                url.scheme()
            )));
        }

        if url.host_str().is_none_or(str::is_empty) {
            return Err(OrchestratorError::InvalidTarget("target has no host".to_string()));
        }

        Ok(url)
    }
}

/// Externally visible state of one job.
#[derive(Debug, Clone, PartialEq)]
pub struct JobView {
    pub uuid: JobUuid,
    pub target: String,
    pub profile: TestProfile,
    pub depth: ScanDepth,
    pub status: JobStatus,

    /// Elapsed-time estimate while running; exactly 100 once terminal.
    pub progress: u8,

    pub created_at: Timestamp,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub duration_seconds: Option<i64>,
    pub failure: Option<String>,

    /// Present once the job is terminal; empty for failed jobs.
    pub result: Option<JobResult>,
}

impl JobView {
    pub(crate) fn from_record(record: JobRecord, progress: u8) -> Self {
        let result = match record.status {
            JobStatus::Completed | JobStatus::Failed => record.result,
            JobStatus::Pending | JobStatus::Running => None,
        };

        Self {
            uuid: record.uuid,
            target: record.target,
            profile: record.profile,
            depth: record.depth,
            status: record.status,
            progress,
            created_at: record.created_at,
            started_at: record.started_at,
            completed_at: record.completed_at,
            duration_seconds: record.duration_seconds,
            failure: record.failure,
            result,
        }
    }
}

/// Orchestrator tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorSettings {
    /// Upper bound on a single engine invocation.
    pub engine_timeout: Duration,

    /// Horizon of the elapsed-time progress estimate.
    pub expected_duration: Duration,

    /// Terminal write failures logged as warnings before they escalate to
    /// errors. The write itself is retried until it lands.
    pub terminal_write_attempts: u32,

    /// Ceiling for the doubling delay between terminal write retries.
    pub terminal_write_max_backoff: Duration,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            engine_timeout: Duration::from_secs(30),
            expected_duration: Duration::from_secs(5),
            terminal_write_attempts: 3,
            terminal_write_max_backoff: Duration::from_secs(5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(target: &str) -> JobRequest {
        JobRequest {
            target: target.to_string(),
            ..JobRequest::default()
        }
    }

    #[test]
    fn accepts_http_and_https() {
        assert!(request("https://example.com").parse_target().is_ok());
        assert!(request("  http://example.com/path?q=1 ").parse_target().is_ok());
    }

    #[test]
    fn rejects_empty_relative_and_foreign_schemes() {
        for target in ["", "   ", "example.com", "/login", "ftp://example.com", "mailto:a@b.c"] {
            assert!(
                matches!(
                    request(target).parse_target(),
                    Err(OrchestratorError::InvalidTarget(_))
                ),
                "{target:?} should be rejected"
            );
        }
    }
}
