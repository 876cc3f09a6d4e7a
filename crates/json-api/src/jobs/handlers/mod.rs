//! Job Handlers

pub(crate) mod create;
pub(crate) mod get;
pub(crate) mod index;

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use testgenium_app::domain::{
        jobs::records::{
            Finding, JobResult, JobStatus, JobUuid, ScanDepth, Score, Severity, SeverityCounts,
            TestProfile,
        },
        orchestrator::models::JobView,
    };

    pub(super) fn make_running_view(uuid: JobUuid) -> JobView {
        JobView {
            uuid,
            target: "https://example.com".to_string(),
            profile: TestProfile::Security,
            depth: ScanDepth::Standard,
            status: JobStatus::Running,
            progress: 0,
            created_at: Timestamp::UNIX_EPOCH,
            started_at: Some(Timestamp::UNIX_EPOCH),
            completed_at: None,
            duration_seconds: None,
            failure: None,
            result: None,
        }
    }

    pub(super) fn make_completed_view(uuid: JobUuid) -> JobView {
        let finding = Finding {
            kind: "SQL Injection".to_string(),
            severity: Severity::High,
            payload: "' OR '1'='1".to_string(),
            description: "Login form is vulnerable to SQL injection".to_string(),
            recommendation: "Use parameterized queries".to_string(),
            url: "https://example.com/login".to_string(),
        };

        JobView {
            status: JobStatus::Completed,
            progress: 100,
            completed_at: Some(Timestamp::UNIX_EPOCH),
            duration_seconds: Some(5),
            result: Some(JobResult {
                vulnerabilities: 1,
                coverage: 85,
                score: Score::C,
                summary: SeverityCounts {
                    high: 1,
                    ..SeverityCounts::default()
                },
                findings: vec![finding],
            }),
            ..make_running_view(uuid)
        }
    }

    pub(super) fn make_failed_view(uuid: JobUuid) -> JobView {
        JobView {
            status: JobStatus::Failed,
            progress: 100,
            completed_at: Some(Timestamp::UNIX_EPOCH),
            duration_seconds: Some(30),
            failure: Some("engine timed out after 30s".to_string()),
            result: Some(JobResult::empty()),
            ..make_running_view(uuid)
        }
    }
}
