//! Wire models as seen by API consumers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::jobs::records::{Finding, JobStatus, ScanDepth, Score, SeverityCounts, TestProfile};

#[derive(Debug, Clone, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartJob {
    pub target: String,
    pub profile: TestProfile,
    pub depth: ScanDepth,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StartJobResponse {
    pub job_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResultSummary {
    pub vulnerabilities: u32,
    pub coverage: u8,
    pub score: Score,
    pub summary: SeverityCounts,
}

/// Job state as returned by the status endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobReport {
    pub job_id: Uuid,
    pub status: JobStatus,
    pub progress: u8,
    pub target: String,
    #[serde(default)]
    pub failure: Option<String>,
    #[serde(default)]
    pub result: Option<ResultSummary>,
    #[serde(default)]
    pub findings: Option<Vec<Finding>>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    pub kind: String,
    pub message: String,
}
