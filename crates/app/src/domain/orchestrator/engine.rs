//! Assessment engine seam.

use std::{collections::BTreeMap, time::Duration};

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::domain::jobs::records::{Finding, JobUuid, ScanDepth, Severity, TestProfile};

/// Everything an engine needs to assess one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssessmentRequest {
    pub job: JobUuid,
    pub target: Url,
    pub profile: TestProfile,
    pub depth: ScanDepth,
    pub headers: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("target unreachable: {0}")]
    Unreachable(String),

    #[error("{0}")]
    Failed(String),
}

/// Opaque producer of findings. Invoked once per job.
#[automock]
#[async_trait]
pub trait AssessmentEngine: Send + Sync {
    async fn run(&self, request: AssessmentRequest) -> Result<Vec<Finding>, EngineError>;
}

/// Stand-in engine: waits, then reports one fixed SQL injection finding
/// against the target. Performs no real probing.
#[derive(Debug, Clone)]
pub struct DemoEngine {
    delay: Duration,
}

impl DemoEngine {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl AssessmentEngine for DemoEngine {
    async fn run(&self, request: AssessmentRequest) -> Result<Vec<Finding>, EngineError> {
        debug!(job = %request.job, target = %request.target, "demo engine running");

        tokio::time::sleep(self.delay).await;

        Ok(vec![Finding {
            kind: "SQL Injection".to_string(),
            severity: Severity::High,
            payload: "' OR '1'='1".to_string(),
            description: "Possible SQL injection vulnerability detected".to_string(),
            recommendation: "Use prepared statements and validate input".to_string(),
            url: request.target.to_string(),
        }])
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn demo_engine_reports_fixed_finding_after_delay() -> TestResult {
        let engine = DemoEngine::new(Duration::from_secs(5));
        let started = tokio::time::Instant::now();

        let findings = engine
            .run(AssessmentRequest {
                job: JobUuid::new(),
                target: Url::parse("https://example.com/login")?,
                profile: TestProfile::Security,
                depth: ScanDepth::Standard,
                headers: BTreeMap::new(),
            })
            .await?;

        assert!(started.elapsed() >= Duration::from_secs(5));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::High);
        assert_eq!(findings[0].payload, "' OR '1'='1");
        assert_eq!(findings[0].url, "https://example.com/login");

        Ok(())
    }
}
