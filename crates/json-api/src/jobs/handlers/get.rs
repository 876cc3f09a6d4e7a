//! Get Job Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};

use testgenium_app::domain::jobs::records::JobUuid;

use crate::{errors::ApiError, extensions::*, jobs::models::JobResponse, state::State};

/// Get Job Handler
///
/// Returns the status of one of the caller's jobs. The result and findings
/// are included once the job is terminal; a failed job reports none.
#[endpoint(
    tags("jobs"),
    summary = "Get Job",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(
    job: PathParam<String>,
    depot: &mut Depot,
) -> Result<Json<JobResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let tenant = depot.tenant_uuid_or_401()?;

    // Malformed ids are indistinguishable from missing ones.
    let job: JobUuid = job
        .into_inner()
        .parse()
        .map_err(|_malformed| ApiError::not_found())?;

    let view = state.app.jobs.get_status(tenant, job).await?;

    Ok(Json(view.into()))
}
