//! Register Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use testgenium_app::auth::Registration;

use crate::{auth::SessionResponse, errors::ApiError, extensions::*, state::State};

/// Sign-up details. Missing fields are reported as validation errors.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct RegisterRequest {
    pub email: String,

    #[serde(alias = "secret")]
    pub password: String,

    pub company_name: String,

    pub full_name: String,

    pub phone: Option<String>,

    /// basic (default), professional or enterprise
    pub plan: Option<String>,
}

impl From<RegisterRequest> for Registration {
    fn from(request: RegisterRequest) -> Self {
        Registration {
            email: request.email,
            secret: request.password,
            company_name: request.company_name,
            full_name: request.full_name,
            phone: request.phone,
            plan: request.plan,
        }
    }
}

/// Register Handler
///
/// Creates a tenant with its plan's default limits and signs it in.
#[endpoint(
    tags("auth"),
    summary = "Register",
    responses(
        (status_code = StatusCode::CREATED, description = "Tenant created"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<RegisterRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<SessionResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let session = state.app.auth.register(json.into_inner().into()).await?;

    res.status_code(StatusCode::CREATED);

    Ok(Json(session.into()))
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testgenium_app::{
        auth::{AuthError, Session},
        domain::tenants::records::Plan,
    };
    use testresult::TestResult;

    use crate::test_helpers::{Mocks, TEST_TENANT_UUID, make_tenant, public_service};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        public_service(mocks, Router::with_path("auth/register").post(handler))
    }

    #[tokio::test]
    async fn test_register_returns_201() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .auth
            .expect_register()
            .once()
            .withf(|registration| {
                *registration
                    == Registration {
                        email: "new@example.com".to_string(),
                        secret: "hunter22".to_string(),
                        company_name: "Acme".to_string(),
                        full_name: "Ada Admin".to_string(),
                        phone: None,
                        plan: Some("professional".to_string()),
                    }
            })
            .return_once(|_| {
                Ok(Session {
                    tenant: make_tenant(TEST_TENANT_UUID, Plan::Professional),
                    token: "tg_v1_token".to_string(),
                    expires_at: Timestamp::UNIX_EPOCH,
                })
            });

        let mut res = TestClient::post("http://example.com/auth/register")
            .json(&json!({
                "email": "new@example.com",
                "secret": "hunter22",
                "companyName": "Acme",
                "fullName": "Ada Admin",
                "plan": "professional",
            }))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CREATED));

        let body: SessionResponse = res.take_json().await?;

        assert_eq!(body.tenant.plan_limits.tests_per_month, 50);

        Ok(())
    }

    #[tokio::test]
    async fn test_taken_email_returns_400() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .auth
            .expect_register()
            .once()
            .return_once(|_| Err(AuthError::EmailTaken));

        let mut res = TestClient::post("http://example.com/auth/register")
            .json(&json!({
                "email": "demo@example.com",
                "password": "demo123",
                "companyName": "Acme",
                "fullName": "Ada Admin",
            }))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        let body: serde_json::Value = res.take_json().await?;

        assert_eq!(body["error"]["kind"], "email_taken");

        Ok(())
    }

    #[tokio::test]
    async fn test_missing_fields_reach_validation() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .auth
            .expect_register()
            .once()
            .withf(|registration| registration.company_name.is_empty())
            .return_once(|_| {
                Err(AuthError::ValidationError(
                    "company name is required".to_string(),
                ))
            });

        let mut res = TestClient::post("http://example.com/auth/register")
            .json(&json!({"email": "new@example.com", "password": "hunter22"}))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        let body: serde_json::Value = res.take_json().await?;

        assert_eq!(body["error"]["kind"], "validation_error");
        assert_eq!(body["error"]["message"], "company name is required");

        Ok(())
    }
}
