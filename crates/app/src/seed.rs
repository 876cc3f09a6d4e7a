//! Demo tenants for local development.

use jiff::Timestamp;
use thiserror::Error;
use tracing::info;

use crate::{
    auth::{AuthError, PasswordHasher},
    domain::tenants::{
        TenantsService, TenantsServiceError,
        data::NewTenant,
        records::{Plan, TenantRecord, TenantUuid, Usage},
    },
};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to hash seed password")]
    Hashing(#[source] AuthError),

    #[error("failed to store seed tenant")]
    Tenants(#[source] TenantsServiceError),
}

struct DemoTenant {
    email: &'static str,
    secret: &'static str,
    company_name: &'static str,
    full_name: &'static str,
    plan: Plan,
    tests_this_month: u32,
    total_tests: u32,
}

const DEMO_TENANTS: [DemoTenant; 2] = [
    DemoTenant {
        email: "admin@testgenium.com",
        secret: "admin123",
        company_name: "TestGenium",
        full_name: "System Administrator",
        plan: Plan::Enterprise,
        tests_this_month: 0,
        total_tests: 0,
    },
    DemoTenant {
        email: "demo@empresa.com",
        secret: "demo123",
        company_name: "Demo Company Ltd",
        full_name: "Demo User",
        plan: Plan::Professional,
        tests_this_month: 15,
        total_tests: 45,
    },
];

/// Create the demo tenants that do not exist yet. Returns the ones created.
///
/// # Errors
///
/// Returns an error if hashing or storage fails.
pub async fn seed_demo_tenants(
    tenants: &dyn TenantsService,
    hasher: &PasswordHasher,
    now: Timestamp,
) -> Result<Vec<TenantRecord>, SeedError> {
    let mut created = Vec::new();

    for demo in &DEMO_TENANTS {
        if tenants
            .find_tenant_by_email(demo.email)
            .await
            .map_err(SeedError::Tenants)?
            .is_some()
        {
            continue;
        }

        let password_hash = hasher
            .hash(demo.secret.to_string())
            .await
            .map_err(SeedError::Hashing)?;

        let last_test_at = (demo.total_tests > 0).then_some(now);

        let tenant = tenants
            .create_tenant(
                NewTenant {
                    uuid: TenantUuid::new(),
                    email: demo.email.to_string(),
                    password_hash,
                    company_name: demo.company_name.to_string(),
                    full_name: demo.full_name.to_string(),
                    phone: None,
                    plan: demo.plan,
                    limits: demo.plan.default_limits(),
                    usage: Usage {
                        tests_this_month: demo.tests_this_month,
                        total_tests: demo.total_tests,
                        last_test_at,
                        running_tests: 0,
                    },
                    is_active: true,
                    email_verified: true,
                },
                now,
            )
            .await
            .map_err(SeedError::Tenants)?;

        info!(tenant = %tenant.uuid, email = %tenant.email, "seeded demo tenant");

        created.push(tenant);
    }

    Ok(created)
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::domain::tenants::{MemoryTenantsService, records::MonthlyAllowance};

    use super::*;

    #[tokio::test]
    async fn seeding_is_idempotent() -> TestResult {
        let tenants = MemoryTenantsService::new();
        let hasher = PasswordHasher::with_params(1024, 1, 1)?;

        let first = seed_demo_tenants(&tenants, &hasher, Timestamp::UNIX_EPOCH).await?;
        let second = seed_demo_tenants(&tenants, &hasher, Timestamp::UNIX_EPOCH).await?;

        assert_eq!(first.len(), 2);
        assert!(second.is_empty());

        let admin = tenants
            .find_tenant_by_email("admin@testgenium.com")
            .await?
            .ok_or("admin seeded")?;

        assert_eq!(admin.limits.tests_per_month, MonthlyAllowance::Unlimited);

        let demo = tenants
            .find_tenant_by_email("demo@empresa.com")
            .await?
            .ok_or("demo seeded")?;

        assert_eq!(demo.usage.tests_this_month, 15);
        assert_eq!(demo.usage.total_tests, 45);

        Ok(())
    }
}
