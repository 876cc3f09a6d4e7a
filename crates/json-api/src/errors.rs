//! API Errors
//!
//! Every failure leaves the API as `{"error": {"kind", "message", ...}}`.

use salvo::{
    Scribe,
    http::StatusCode,
    oapi::{self, Components, EndpointOutRegister, Operation, ToSchema},
    prelude::{Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::error;

use testgenium_app::{
    auth::AuthError,
    domain::{orchestrator::OrchestratorError, tenants::TenantsServiceError},
};

use crate::plans::{PlanLimitsResponse, UsageResponse};

/// Error envelope.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ErrorResponse {
    pub error: ErrorBody,
}

/// Machine-readable kind plus a human-readable message.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ErrorBody {
    /// Snake case error kind, e.g. `quota_exceeded`
    pub kind: String,

    pub message: String,

    /// Which limit was hit, for `quota_exceeded`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageResponse>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits: Option<PlanLimitsResponse>,
}

#[derive(Debug)]
pub(crate) struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    pub(crate) fn new(status: StatusCode, kind: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                kind: kind.to_string(),
                message: message.into(),
                reason: None,
                usage: None,
                limits: None,
            },
        }
    }

    pub(crate) fn token_missing() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "token_missing",
            "authorization token is missing",
        )
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "validation_error", message)
    }

    pub(crate) fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", "not found")
    }

    pub(crate) fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal",
            "internal server error",
        )
    }

    #[cfg(test)]
    pub(crate) fn status(&self) -> StatusCode {
        self.status
    }

    #[cfg(test)]
    pub(crate) fn kind(&self) -> &str {
        &self.body.kind
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        let message = error.to_string();

        match error {
            AuthError::TokenMissing => Self::token_missing(),
            AuthError::TokenExpired => Self::new(StatusCode::UNAUTHORIZED, "token_expired", message),
            AuthError::TokenInvalid => Self::new(StatusCode::FORBIDDEN, "token_invalid", message),
            AuthError::InvalidCredentials => {
                Self::new(StatusCode::UNAUTHORIZED, "invalid_credentials", message)
            }
            AuthError::EmailTaken => Self::new(StatusCode::BAD_REQUEST, "email_taken", message),
            AuthError::ValidationError(_) => Self::validation(message),
            AuthError::Hashing | AuthError::Signing(_) | AuthError::Tenants(_) => {
                error!("auth failure: {error:?}");

                Self::internal()
            }
        }
    }
}

impl From<OrchestratorError> for ApiError {
    fn from(error: OrchestratorError) -> Self {
        let message = error.to_string();

        match error {
            OrchestratorError::InvalidTarget(_) => {
                Self::new(StatusCode::BAD_REQUEST, "invalid_target", message)
            }
            OrchestratorError::QuotaExceeded {
                reason,
                usage,
                limits,
            } => {
                let mut quota = Self::new(StatusCode::FORBIDDEN, "quota_exceeded", message);

                quota.body.reason = Some(reason.as_str().to_string());
                quota.body.usage = Some(usage.into());
                quota.body.limits = Some(limits.into());

                quota
            }
            OrchestratorError::NotFound => Self::new(StatusCode::NOT_FOUND, "not_found", message),
            OrchestratorError::EngineTimeout(_) => {
                Self::new(StatusCode::GATEWAY_TIMEOUT, "engine_timeout", message)
            }
            OrchestratorError::EngineFailure(_) => {
                Self::new(StatusCode::BAD_GATEWAY, "engine_failure", message)
            }
            OrchestratorError::StoreConflict => {
                error!("job id conflict on create");

                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "store_conflict", message)
            }
            OrchestratorError::Ledger(_) | OrchestratorError::Jobs(_) => {
                error!("orchestrator failure: {error:?}");

                Self::internal()
            }
        }
    }
}

impl From<TenantsServiceError> for ApiError {
    fn from(error: TenantsServiceError) -> Self {
        match error {
            TenantsServiceError::NotFound => Self::not_found(),
            other => {
                error!("tenant storage failure: {other:?}");

                Self::internal()
            }
        }
    }
}

impl Scribe for ApiError {
    fn render(self, res: &mut Response) {
        res.status_code(self.status);
        res.render(Json(ErrorResponse { error: self.body }));
    }
}

impl EndpointOutRegister for ApiError {
    fn register(components: &mut Components, operation: &mut Operation) {
        for (status, description) in [
            (StatusCode::BAD_REQUEST, "Invalid request"),
            (StatusCode::UNAUTHORIZED, "Missing or expired token"),
            (StatusCode::FORBIDDEN, "Invalid token or quota exceeded"),
            (StatusCode::NOT_FOUND, "Not found"),
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        ] {
            operation.responses.insert(
                status.as_str(),
                oapi::Response::new(description).add_content(
                    "application/json",
                    oapi::Content::new(ErrorResponse::to_schema(components)),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use salvo::{
        prelude::*,
        test::{ResponseExt, TestClient},
    };
    use testgenium_app::domain::tenants::records::{Plan, QuotaReason, Usage};
    use testresult::TestResult;

    use super::*;

    #[handler]
    async fn quota() -> Result<&'static str, ApiError> {
        Err(OrchestratorError::QuotaExceeded {
            reason: QuotaReason::MonthlyLimit,
            usage: Usage {
                tests_this_month: 50,
                total_tests: 120,
                last_test_at: None,
                running_tests: 0,
            },
            limits: Plan::Professional.default_limits(),
        }
        .into())
    }

    #[tokio::test]
    async fn quota_error_carries_usage_and_limits() -> TestResult {
        let mut res = TestClient::get("http://example.com/quota")
            .send(&Service::new(Router::with_path("quota").get(quota)))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        let body: serde_json::Value = res.take_json().await?;

        assert_eq!(body["error"]["kind"], "quota_exceeded");
        assert_eq!(body["error"]["reason"], "monthly_limit");
        assert_eq!(body["error"]["usage"]["testsThisMonth"], 50);
        assert_eq!(body["error"]["limits"]["testsPerMonth"], 50);

        Ok(())
    }

    #[test]
    fn token_failures_split_between_401_and_403() {
        let expired = ApiError::from(AuthError::TokenExpired);
        let invalid = ApiError::from(AuthError::TokenInvalid);

        assert_eq!(
            (expired.status(), expired.kind()),
            (StatusCode::UNAUTHORIZED, "token_expired")
        );
        assert_eq!(
            (invalid.status(), invalid.kind()),
            (StatusCode::FORBIDDEN, "token_invalid")
        );
    }

    #[test]
    fn conflicts_and_storage_failures_are_500() {
        assert_eq!(
            ApiError::from(OrchestratorError::StoreConflict).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(TenantsServiceError::InvalidData).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(TenantsServiceError::NotFound).status(),
            StatusCode::NOT_FOUND
        );
    }
}
