//! Login Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::{auth::SessionResponse, errors::ApiError, extensions::*, state::State};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct LoginRequest {
    pub email: String,

    #[serde(alias = "secret")]
    pub password: String,
}

/// Login Handler
///
/// Exchanges email and password for a session token.
#[endpoint(tags("auth"), summary = "Log In")]
pub(crate) async fn handler(
    json: JsonBody<LoginRequest>,
    depot: &mut Depot,
) -> Result<Json<SessionResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let request = json.into_inner();

    let session = state
        .app
        .auth
        .authenticate(&request.email, &request.password)
        .await?;

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
        public_service(mocks, Router::with_path("auth/login").post(handler))
    }

    #[tokio::test]
    async fn test_login_returns_session() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .auth
            .expect_authenticate()
            .once()
            .withf(|email, secret| email == "demo@example.com" && secret == "demo123")
            .return_once(|_, _| {
                Ok(Session {
                    tenant: make_tenant(TEST_TENANT_UUID, Plan::Professional),
                    token: "tg_v1_token".to_string(),
                    expires_at: Timestamp::UNIX_EPOCH,
                })
            });

        let mut res = TestClient::post("http://example.com/auth/login")
            .json(&json!({"email": "demo@example.com", "password": "demo123"}))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        let body: SessionResponse = res.take_json().await?;

        assert_eq!(body.token, "tg_v1_token");
        assert_eq!(body.tenant.id, TEST_TENANT_UUID.into_uuid());
        assert_eq!(body.tenant.plan, "professional");

        Ok(())
    }

    #[tokio::test]
    async fn test_login_accepts_secret_field() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .auth
            .expect_authenticate()
            .once()
            .withf(|_, secret| secret == "demo123")
            .return_once(|_, _| Err(AuthError::InvalidCredentials));

        let res = TestClient::post("http://example.com/auth/login")
            .json(&json!({"email": "demo@example.com", "secret": "demo123"}))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }

    #[tokio::test]
    async fn test_bad_credentials_return_401_with_kind() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .auth
            .expect_authenticate()
            .once()
            .return_once(|_, _| Err(AuthError::InvalidCredentials));

        let mut res = TestClient::post("http://example.com/auth/login")
            .json(&json!({"email": "demo@example.com", "password": "wrong"}))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        let body: serde_json::Value = res.take_json().await?;

        assert_eq!(body["error"]["kind"], "invalid_credentials");

        Ok(())
    }
}
