//! Start Job Handler

use std::{collections::BTreeMap, str::FromStr, sync::Arc};

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use testgenium_app::domain::{
    jobs::records::{ScanDepth, TestProfile},
    orchestrator::{OrchestratorError, models::JobRequest},
};

use crate::{
    errors::ApiError,
    extensions::*,
    observability::{record_job_rejected, record_job_started},
    state::State,
};

/// Start Job Request
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub(crate) struct CreateJobRequest {
    /// Absolute `http` or `https` URL to assess
    pub target: Option<String>,

    /// `complete` (default), `security`, `performance` or `functional`
    pub profile: Option<String>,

    /// `basic`, `standard` (default) or `deep`
    pub depth: Option<String>,

    /// Extra request headers sent to the target
    pub headers: Option<BTreeMap<String, String>>,
}

impl TryFrom<CreateJobRequest> for JobRequest {
    type Error = ApiError;

    fn try_from(request: CreateJobRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            target: request.target.unwrap_or_default(),
            profile: parse_or_default::<TestProfile>(request.profile)?,
            depth: parse_or_default::<ScanDepth>(request.depth)?,
            headers: request.headers.unwrap_or_default(),
        })
    }
}

fn parse_or_default<T>(value: Option<String>) -> Result<T, ApiError>
where
    T: FromStr + Default,
    T::Err: std::fmt::Display,
{
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(T::default()),
        Some(value) => value
            .parse()
            .map_err(|error: T::Err| ApiError::validation(error.to_string())),
    }
}

/// Job Started Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JobStartedResponse {
    pub job_id: Uuid,

    /// Always `running`; jobs are dispatched before this response is sent
    pub status: String,
}

/// Start Job Handler
///
/// Claims one unit of quota and dispatches an assessment of `target`.
/// Returns as soon as the job is persisted.
#[endpoint(
    tags("jobs"),
    summary = "Start Job",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Job started"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<CreateJobRequest>,
    depot: &mut Depot,
) -> Result<Json<JobStartedResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let tenant = depot.tenant_uuid_or_401()?;
    let request = JobRequest::try_from(json.into_inner())?;

    let job = match state.app.jobs.start_job(tenant, request).await {
        Ok(job) => job,
        Err(error) => {
            if let OrchestratorError::QuotaExceeded { reason, .. } = &error {
                info!(tenant = %tenant, reason = reason.as_str(), "job start refused");
                record_job_rejected(reason.as_str());
            }

            return Err(error.into());
        }
    };

    record_job_started();

    Ok(Json(JobStartedResponse {
        job_id: job.into_uuid(),
        status: "running".to_string(),
    }))
}
