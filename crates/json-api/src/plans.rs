//! Tenant, plan and usage response models shared by auth, profile and errors.

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use testgenium_app::domain::tenants::records::{PlanLimits, TenantRecord, Usage};

/// Plan entitlements. `testsPerMonth` is `-1` when unlimited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlanLimitsResponse {
    pub tests_per_month: i64,
    pub max_concurrent_tests: u32,
    pub api_access: bool,
    pub custom_reports: bool,
}

impl From<PlanLimits> for PlanLimitsResponse {
    fn from(limits: PlanLimits) -> Self {
        Self {
            tests_per_month: limits.tests_per_month.as_i64(),
            max_concurrent_tests: limits.max_concurrent_tests,
            api_access: limits.api_access,
            custom_reports: limits.custom_reports,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UsageResponse {
    pub tests_this_month: u32,
    pub total_tests: u32,
    pub running_tests: u32,

    /// RFC 3339 time of the most recent start
    pub last_test_at: Option<String>,
}

impl From<Usage> for UsageResponse {
    fn from(usage: Usage) -> Self {
        Self {
            tests_this_month: usage.tests_this_month,
            total_tests: usage.total_tests,
            running_tests: usage.running_tests,
            last_test_at: usage.last_test_at.map(|at| at.to_string()),
        }
    }
}

/// Public view of a tenant. Never includes the credential hash.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TenantResponse {
    pub id: Uuid,
    pub email: String,
    pub company_name: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub plan: String,
    pub plan_limits: PlanLimitsResponse,
    pub usage: UsageResponse,
    pub email_verified: bool,
    pub created_at: String,
}

impl From<TenantRecord> for TenantResponse {
    fn from(tenant: TenantRecord) -> Self {
        Self {
            id: tenant.uuid.into_uuid(),
            email: tenant.email,
            company_name: tenant.company_name,
            full_name: tenant.full_name,
            phone: tenant.phone,
            plan: tenant.plan.to_string(),
            plan_limits: tenant.limits.into(),
            usage: tenant.usage.into(),
            email_verified: tenant.email_verified,
            created_at: tenant.created_at.to_string(),
        }
    }
}
