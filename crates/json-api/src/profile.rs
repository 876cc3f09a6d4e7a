//! Profile Handler

use std::sync::Arc;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};

use testgenium_app::domain::jobs::data::JobStats;

use crate::{
    errors::ApiError,
    extensions::*,
    plans::{PlanLimitsResponse, TenantResponse},
    state::State,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StatsResponse {
    pub total_tests: u64,
    pub completed_tests: u64,
    pub failed_tests: u64,
    pub running_tests: u64,

    /// Findings across all completed jobs
    pub total_vulnerabilities: u64,
}

impl From<JobStats> for StatsResponse {
    fn from(stats: JobStats) -> Self {
        Self {
            total_tests: stats.total,
            completed_tests: stats.completed,
            failed_tests: stats.failed,
            running_tests: stats.running,
            total_vulnerabilities: stats.vulnerabilities,
        }
    }
}

/// Profile Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProfileResponse {
    pub tenant: TenantResponse,
    pub stats: StatsResponse,
    pub plan_limits: PlanLimitsResponse,

    /// Whether a job could be started right now
    pub can_start_test: bool,
}

/// Profile Handler
///
/// The caller's account, job statistics and remaining entitlement.
#[endpoint(
    tags("profile"),
    summary = "Get Profile",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<ProfileResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let tenant = depot.tenant_uuid_or_401()?;

    let record = state.app.tenants.get_tenant(tenant).await?;
    let stats = state.app.jobs.job_stats(tenant).await?;
    let can_start_test = state.app.jobs.can_start(tenant).await?;

    let plan_limits = record.limits.into();

    Ok(Json(ProfileResponse {
        tenant: record.into(),
        stats: stats.into(),
        plan_limits,
        can_start_test,
    }))
}
