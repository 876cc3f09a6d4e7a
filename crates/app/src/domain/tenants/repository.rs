//! Tenants Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, PgPool, Postgres, Row, postgres::PgRow, query, query_as};

use crate::domain::tenants::{
    data::NewTenant,
    records::{MonthlyAllowance, PasswordHash, PlanLimits, TenantRecord, TenantUuid, Usage},
};

const CREATE_TENANT_SQL: &str = include_str!("sql/create_tenant.sql");
const FIND_TENANT_BY_EMAIL_SQL: &str = include_str!("sql/find_tenant_by_email.sql");
const GET_TENANT_SQL: &str = include_str!("sql/get_tenant.sql");
const RECORD_START_SQL: &str = include_str!("sql/record_start.sql");
const REVERT_START_SQL: &str = include_str!("sql/revert_start.sql");
const RELEASE_RUNNING_SQL: &str = include_str!("sql/release_running.sql");
const RESET_RUNNING_TESTS_SQL: &str = include_str!("sql/reset_running_tests.sql");
const RESET_MONTHLY_USAGE_SQL: &str = include_str!("sql/reset_monthly_usage.sql");

/// PostgreSQL-backed tenants repository.
#[derive(Debug, Clone)]
pub(crate) struct PgTenantsRepository {
    pool: PgPool,
}

impl PgTenantsRepository {
    #[must_use]
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub(crate) async fn create_tenant(
        &self,
        tenant: NewTenant,
        now: Timestamp,
    ) -> Result<TenantRecord, sqlx::Error> {
        let tests_per_month = i32::try_from(tenant.limits.tests_per_month.as_i64())
            .map_err(|e| encode_error("tests_per_month", e))?;

        query_as::<Postgres, TenantRecord>(CREATE_TENANT_SQL)
            .bind(tenant.uuid.into_uuid())
            .bind(tenant.email)
            .bind(tenant.password_hash.as_str().to_string())
            .bind(tenant.company_name)
            .bind(tenant.full_name)
            .bind(tenant.phone)
            .bind(tenant.plan.as_str())
            .bind(tests_per_month)
            .bind(to_i32("max_concurrent_tests", tenant.limits.max_concurrent_tests)?)
            .bind(tenant.limits.api_access)
            .bind(tenant.limits.custom_reports)
            .bind(to_i32("tests_this_month", tenant.usage.tests_this_month)?)
            .bind(to_i32("total_tests", tenant.usage.total_tests)?)
            .bind(tenant.usage.last_test_at.map(SqlxTimestamp::from))
            .bind(tenant.is_active)
            .bind(tenant.email_verified)
            .bind(SqlxTimestamp::from(now))
            .fetch_one(&self.pool)
            .await
    }

    pub(crate) async fn find_tenant_by_email(
        &self,
        email: &str,
    ) -> Result<Option<TenantRecord>, sqlx::Error> {
        query_as::<Postgres, TenantRecord>(FIND_TENANT_BY_EMAIL_SQL)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
    }

    pub(crate) async fn get_tenant(&self, tenant: TenantUuid) -> Result<TenantRecord, sqlx::Error> {
        query_as::<Postgres, TenantRecord>(GET_TENANT_SQL)
            .bind(tenant.into_uuid())
            .fetch_one(&self.pool)
            .await
    }

    /// Conditionally increment usage. Row locking on `UPDATE` makes a
    /// concurrent second attempt re-evaluate the guard against the committed
    /// counters, so only as many starts succeed as there is quota for.
    pub(crate) async fn record_start(
        &self,
        tenant: TenantUuid,
        now: Timestamp,
    ) -> Result<Option<TenantRecord>, sqlx::Error> {
        query_as::<Postgres, TenantRecord>(RECORD_START_SQL)
            .bind(tenant.into_uuid())
            .bind(SqlxTimestamp::from(now))
            .fetch_optional(&self.pool)
            .await
    }

    pub(crate) async fn revert_start(
        &self,
        tenant: TenantUuid,
        now: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        Ok(query(REVERT_START_SQL)
            .bind(tenant.into_uuid())
            .bind(SqlxTimestamp::from(now))
            .execute(&self.pool)
            .await?
            .rows_affected())
    }

    pub(crate) async fn release_running(
        &self,
        tenant: TenantUuid,
        now: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        Ok(query(RELEASE_RUNNING_SQL)
            .bind(tenant.into_uuid())
            .bind(SqlxTimestamp::from(now))
            .execute(&self.pool)
            .await?
            .rows_affected())
    }

    pub(crate) async fn reset_running_tests(&self) -> Result<u64, sqlx::Error> {
        Ok(query(RESET_RUNNING_TESTS_SQL)
            .execute(&self.pool)
            .await?
            .rows_affected())
    }

    pub(crate) async fn reset_monthly_usage(&self, now: Timestamp) -> Result<u64, sqlx::Error> {
        Ok(query(RESET_MONTHLY_USAGE_SQL)
            .bind(SqlxTimestamp::from(now))
            .execute(&self.pool)
            .await?
            .rows_affected())
    }
}

fn to_i32(column: &str, value: u32) -> Result<i32, sqlx::Error> {
    i32::try_from(value).map_err(|e| encode_error(column, e))
}

fn encode_error(
    column: &str,
    source: impl std::error::Error + Send + Sync + 'static,
) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(source),
    }
}

fn get_u32(row: &PgRow, column: &str) -> sqlx::Result<u32> {
    let value: i32 = row.try_get(column)?;

    u32::try_from(value).map_err(|e| encode_error(column, e))
}

impl<'r> FromRow<'r, PgRow> for TenantRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let plan = row
            .try_get::<String, _>("plan")?
            .parse()
            .map_err(|e| encode_error("plan", e))?;

        Ok(Self {
            uuid: TenantUuid::from_uuid(row.try_get("uuid")?),
            email: row.try_get("email")?,
            password_hash: PasswordHash::new(row.try_get("password_hash")?),
            company_name: row.try_get("company_name")?,
            full_name: row.try_get("full_name")?,
            phone: row.try_get("phone")?,
            plan,
            limits: PlanLimits {
                tests_per_month: MonthlyAllowance::from_i64(i64::from(
                    row.try_get::<i32, _>("tests_per_month")?,
                )),
                max_concurrent_tests: get_u32(row, "max_concurrent_tests")?,
                api_access: row.try_get("api_access")?,
                custom_reports: row.try_get("custom_reports")?,
            },
            usage: Usage {
                tests_this_month: get_u32(row, "tests_this_month")?,
                total_tests: get_u32(row, "total_tests")?,
                last_test_at: row
                    .try_get::<Option<SqlxTimestamp>, _>("last_test_at")?
                    .map(SqlxTimestamp::to_jiff),
                running_tests: get_u32(row, "running_tests")?,
            },
            is_active: row.try_get("is_active")?,
            email_verified: row.try_get("email_verified")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
