//! Jobs Repository

use std::collections::BTreeMap;

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, PgPool, Postgres, Row, postgres::PgRow, query, query_as, query_scalar, types::Json};

use crate::domain::{
    jobs::{
        data::{JobOutcome, JobStats, NewJob, Page, TerminalUpdate},
        records::{JobRecord, JobResult, JobUuid},
    },
    tenants::records::TenantUuid,
};

const CREATE_JOB_SQL: &str = include_str!("sql/create_job.sql");
const GET_JOB_SQL: &str = include_str!("sql/get_job.sql");
const JOB_EXISTS_SQL: &str = include_str!("sql/job_exists.sql");
const UPDATE_TERMINAL_SQL: &str = include_str!("sql/update_terminal.sql");
const LIST_JOBS_SQL: &str = include_str!("sql/list_jobs.sql");
const COUNT_JOBS_SQL: &str = include_str!("sql/count_jobs.sql");
const JOB_STATS_SQL: &str = include_str!("sql/job_stats.sql");
const FAIL_RUNNING_SQL: &str = include_str!("sql/fail_running.sql");

#[derive(Debug, Clone)]
pub(crate) struct PgJobsRepository {
    pool: PgPool,
}

impl PgJobsRepository {
    #[must_use]
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub(crate) async fn create_job(&self, job: NewJob) -> Result<JobRecord, sqlx::Error> {
        query_as::<Postgres, JobRecord>(CREATE_JOB_SQL)
            .bind(job.uuid.into_uuid())
            .bind(job.owner.into_uuid())
            .bind(job.target)
            .bind(job.profile.as_str())
            .bind(job.depth.as_str())
            .bind(Json(job.headers))
            .bind(SqlxTimestamp::from(job.started_at))
            .fetch_one(&self.pool)
            .await
    }

    pub(crate) async fn get_job(
        &self,
        job: JobUuid,
        owner: TenantUuid,
    ) -> Result<JobRecord, sqlx::Error> {
        query_as::<Postgres, JobRecord>(GET_JOB_SQL)
            .bind(job.into_uuid())
            .bind(owner.into_uuid())
            .fetch_one(&self.pool)
            .await
    }

    pub(crate) async fn job_exists(&self, job: JobUuid) -> Result<bool, sqlx::Error> {
        query_scalar::<Postgres, bool>(JOB_EXISTS_SQL)
            .bind(job.into_uuid())
            .fetch_one(&self.pool)
            .await
    }

    /// Returns `true` when the update was applied, `false` when the job was
    /// already terminal (or absent).
    pub(crate) async fn update_terminal(
        &self,
        job: JobUuid,
        update: TerminalUpdate,
    ) -> Result<bool, sqlx::Error> {
        let status = update.outcome.status();

        let (failure, result) = match update.outcome {
            JobOutcome::Completed(result) => (None, Json(result)),
            JobOutcome::Failed { reason } => (Some(reason), Json(JobResult::empty())),
        };

        let rows = query(UPDATE_TERMINAL_SQL)
            .bind(job.into_uuid())
            .bind(status.as_str())
            .bind(SqlxTimestamp::from(update.completed_at))
            .bind(update.duration_seconds)
            .bind(failure)
            .bind(result)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows == 1)
    }

    pub(crate) async fn list_jobs(
        &self,
        owner: TenantUuid,
        page: Page,
    ) -> Result<(Vec<JobRecord>, i64), sqlx::Error> {
        let jobs = query_as::<Postgres, JobRecord>(LIST_JOBS_SQL)
            .bind(owner.into_uuid())
            .bind(i64::from(page.limit))
            .bind(i64::from(page.offset))
            .fetch_all(&self.pool)
            .await?;

        let total = query_scalar::<Postgres, i64>(COUNT_JOBS_SQL)
            .bind(owner.into_uuid())
            .fetch_one(&self.pool)
            .await?;

        Ok((jobs, total))
    }

    pub(crate) async fn job_stats(&self, owner: TenantUuid) -> Result<JobStats, sqlx::Error> {
        let row = query(JOB_STATS_SQL)
            .bind(owner.into_uuid())
            .fetch_one(&self.pool)
            .await?;

        Ok(JobStats {
            total: get_u64(&row, "total")?,
            completed: get_u64(&row, "completed")?,
            failed: get_u64(&row, "failed")?,
            running: get_u64(&row, "running")?,
            vulnerabilities: get_u64(&row, "vulnerabilities")?,
        })
    }

    pub(crate) async fn fail_running(
        &self,
        reason: &str,
        at: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        Ok(query(FAIL_RUNNING_SQL)
            .bind(reason)
            .bind(SqlxTimestamp::from(at))
            .bind(Json(JobResult::empty()))
            .execute(&self.pool)
            .await?
            .rows_affected())
    }
}

fn decode_error(
    column: &str,
    source: impl std::error::Error + Send + Sync + 'static,
) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(source),
    }
}

fn get_u64(row: &PgRow, column: &str) -> sqlx::Result<u64> {
    let value: i64 = row.try_get(column)?;

    u64::try_from(value).map_err(|e| decode_error(column, e))
}

impl<'r> FromRow<'r, PgRow> for JobRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let profile = row
            .try_get::<String, _>("profile")?
            .parse()
            .map_err(|e| decode_error("profile", e))?;

        let depth = row
            .try_get::<String, _>("depth")?
            .parse()
            .map_err(|e| decode_error("depth", e))?;

        let status = row
            .try_get::<String, _>("status")?
            .parse()
            .map_err(|e| decode_error("status", e))?;

        let progress = u8::try_from(row.try_get::<i16, _>("progress")?)
            .map_err(|e| decode_error("progress", e))?;

        Ok(Self {
            uuid: JobUuid::from_uuid(row.try_get("uuid")?),
            owner: TenantUuid::from_uuid(row.try_get("tenant_uuid")?),
            target: row.try_get("target")?,
            profile,
            depth,
            headers: row
                .try_get::<Json<BTreeMap<String, String>>, _>("headers")?
                .0,
            status,
            progress,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            started_at: row
                .try_get::<Option<SqlxTimestamp>, _>("started_at")?
                .map(SqlxTimestamp::to_jiff),
            completed_at: row
                .try_get::<Option<SqlxTimestamp>, _>("completed_at")?
                .map(SqlxTimestamp::to_jiff),
            duration_seconds: row.try_get("duration_seconds")?,
            failure: row.try_get("failure")?,
            result: row
                .try_get::<Option<Json<JobResult>>, _>("result")?
                .map(|json| json.0),
        })
    }
}
