//! Job History Handler

use std::sync::Arc;

use salvo::{oapi::extract::QueryParam, prelude::*};

use testgenium_app::domain::jobs::data::Page;

use crate::{errors::ApiError, extensions::*, jobs::models::JobsResponse, state::State};

/// Job History Handler
///
/// Lists the caller's jobs, newest first. `limit` defaults to 10 and is
/// clamped to 100.
#[endpoint(
    tags("jobs"),
    summary = "List Jobs",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(
    limit: QueryParam<u32, false>,
    offset: QueryParam<u32, false>,
    depot: &mut Depot,
) -> Result<Json<JobsResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let tenant = depot.tenant_uuid_or_401()?;
    let page = Page::new(limit.into_inner(), offset.into_inner());

    let jobs = state.app.jobs.list_jobs(tenant, page).await?;

    Ok(Json(jobs.into()))
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use salvo::test::{ResponseExt, TestClient};
    use testgenium_app::domain::jobs::{
        data::{JobPage, JobSummary},
        records::{JobStatus, JobUuid, Score, TestProfile},
    };
    use testresult::TestResult;

    use crate::test_helpers::{Mocks, TEST_TENANT_UUID, tenant_service};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        tenant_service(mocks, Router::with_path("jobs").get(handler))
    }

    fn make_summary(status: JobStatus, score: Option<Score>) -> JobSummary {
        JobSummary {
            uuid: JobUuid::new(),
            target: "https://example.com".to_string(),
            profile: TestProfile::Complete,
            status,
            created_at: Timestamp::UNIX_EPOCH,
            completed_at: None,
            vulnerabilities: score.map(|_| 1),
            score,
        }
    }

    #[tokio::test]
    async fn test_index_uses_default_page() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .jobs
            .expect_list_jobs()
            .once()
            .withf(|tenant, page| *tenant == TEST_TENANT_UUID && *page == Page::default())
            .return_once(|_, _| Ok(JobPage::default()));

        let body: JobsResponse = TestClient::get("http://example.com/jobs")
            .send(&make_service(mocks))
            .await
            .take_json()
            .await?;

        assert!(body.jobs.is_empty());
        assert_eq!(body.total, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_index_clamps_limit_and_passes_offset() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .jobs
            .expect_list_jobs()
            .once()
            .withf(|_, page| page.limit == 100 && page.offset == 20)
            .return_once(|_, _| Ok(JobPage::default()));

        let res = TestClient::get("http://example.com/jobs?limit=500&offset=20")
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }

    #[tokio::test]
    async fn test_unfinished_jobs_render_placeholders() -> TestResult {
        let mut mocks = Mocks::default();

        mocks.jobs.expect_list_jobs().once().return_once(|_, _| {
            Ok(JobPage {
                jobs: vec![
                    make_summary(JobStatus::Running, None),
                    make_summary(JobStatus::Completed, Some(Score::C)),
                ],
                total: 7,
            })
        });

        let body: JobsResponse = TestClient::get("http://example.com/jobs")
            .send(&make_service(mocks))
            .await
            .take_json()
            .await?;

        assert_eq!(body.total, 7);
        assert_eq!(body.jobs[0].status, "running");
        assert_eq!(body.jobs[0].score, "N/A");
        assert_eq!(body.jobs[0].vulnerabilities, 0);
        assert_eq!(body.jobs[1].score, "C");
        assert_eq!(body.jobs[1].vulnerabilities, 1);

        Ok(())
    }
}
