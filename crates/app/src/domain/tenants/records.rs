//! Tenant Records

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use thiserror::Error;

use crate::uuids::TypedUuid;

/// Tenant UUID
pub type TenantUuid = TypedUuid<TenantRecord>;

/// Subscription tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Plan {
    #[default]
    Basic,
    Professional,
    Enterprise,
}

#[derive(Debug, Error)]
#[error("unknown plan `{0}`")]
pub struct UnknownPlan(pub String);

impl Plan {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Professional => "professional",
            Self::Enterprise => "enterprise",
        }
    }

    /// Limits granted to a freshly registered tenant on this plan.
    #[must_use]
    pub const fn default_limits(self) -> PlanLimits {
        match self {
            Self::Basic => PlanLimits {
                tests_per_month: MonthlyAllowance::Limited(10),
                max_concurrent_tests: 1,
                api_access: false,
                custom_reports: false,
            },
            Self::Professional => PlanLimits {
                tests_per_month: MonthlyAllowance::Limited(50),
                max_concurrent_tests: 3,
                api_access: true,
                custom_reports: false,
            },
            Self::Enterprise => PlanLimits {
                tests_per_month: MonthlyAllowance::Unlimited,
                max_concurrent_tests: 10,
                api_access: true,
                custom_reports: true,
            },
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Plan {
    type Err = UnknownPlan;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "basic" => Ok(Self::Basic),
            "professional" => Ok(Self::Professional),
            "enterprise" => Ok(Self::Enterprise),
            other => Err(UnknownPlan(other.to_string())),
        }
    }
}

/// Monthly job allowance. Stored and rendered as an integer where any
/// negative value means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MonthlyAllowance {
    Limited(u32),
    Unlimited,
}

impl MonthlyAllowance {
    pub const UNLIMITED_SENTINEL: i64 = -1;

    #[must_use]
    pub fn from_i64(value: i64) -> Self {
        u32::try_from(value).map_or(Self::Unlimited, Self::Limited)
    }

    #[must_use]
    pub fn as_i64(self) -> i64 {
        match self {
            Self::Limited(limit) => i64::from(limit),
            Self::Unlimited => Self::UNLIMITED_SENTINEL,
        }
    }

    /// Whether one more job fits after `used` jobs this month.
    #[must_use]
    pub const fn permits(self, used: u32) -> bool {
        match self {
            Self::Limited(limit) => used < limit,
            Self::Unlimited => true,
        }
    }
}

/// Plan entitlements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlanLimits {
    pub tests_per_month: MonthlyAllowance,
    pub max_concurrent_tests: u32,
    pub api_access: bool,
    pub custom_reports: bool,
}

/// Usage counters maintained by the entitlement ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Usage {
    pub tests_this_month: u32,
    pub total_tests: u32,
    pub last_test_at: Option<Timestamp>,

    /// Jobs currently in the `running` state.
    pub running_tests: u32,
}

/// Why a tenant may not start another job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaReason {
    MonthlyLimit,
    ConcurrencyLimit,
}

impl QuotaReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MonthlyLimit => "monthly_limit",
            Self::ConcurrencyLimit => "concurrency_limit",
        }
    }
}

/// Check whether `usage` leaves room for one more job under `limits`.
///
/// # Errors
///
/// Returns the first limit that would be exceeded.
pub const fn check_start(usage: &Usage, limits: &PlanLimits) -> Result<(), QuotaReason> {
    if !limits.tests_per_month.permits(usage.tests_this_month) {
        return Err(QuotaReason::MonthlyLimit);
    }

    if usage.running_tests >= limits.max_concurrent_tests {
        return Err(QuotaReason::ConcurrencyLimit);
    }

    Ok(())
}

/// One-way salted credential hash in PHC string format.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    #[must_use]
    pub fn new(phc: String) -> Self {
        Self(phc)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(**redacted**)")
    }
}

/// Tenant Record
#[derive(Debug, Clone)]
pub struct TenantRecord {
    /// Unique tenant identifier.
    pub uuid: TenantUuid,

    /// Login email, unique and matched exactly.
    pub email: String,

    pub password_hash: PasswordHash,

    pub company_name: String,

    pub full_name: String,

    pub phone: Option<String>,

    pub plan: Plan,

    pub limits: PlanLimits,

    pub usage: Usage,

    /// Cleared to soft-delete the tenant.
    pub is_active: bool,

    pub email_verified: bool,

    pub created_at: Timestamp,

    pub updated_at: Timestamp,
}
