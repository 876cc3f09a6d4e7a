//! Tenant Data

use crate::domain::tenants::records::{
    PasswordHash, Plan, PlanLimits, TenantRecord, TenantUuid, Usage,
};

/// New Tenant Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewTenant {
    /// UUID to assign to the tenant row.
    pub uuid: TenantUuid,

    pub email: String,

    pub password_hash: PasswordHash,

    pub company_name: String,

    pub full_name: String,

    pub phone: Option<String>,

    pub plan: Plan,

    pub limits: PlanLimits,

    /// Starting counters; zeroed for registrations, preset by seed data.
    pub usage: Usage,

    pub is_active: bool,

    pub email_verified: bool,
}

/// Result of an atomic check-and-increment on a tenant's usage counters.
#[derive(Debug, Clone)]
pub enum StartAttempt {
    /// Counters were incremented; carries the updated tenant.
    Recorded(TenantRecord),

    /// A limit was already reached; carries the unchanged tenant.
    Rejected(TenantRecord),
}
