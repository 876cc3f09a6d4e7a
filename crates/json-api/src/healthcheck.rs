//! Healthcheck Handler

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{errors::ApiError, extensions::*, state::State};

/// Healthcheck response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct HealthResponse {
    /// Service status
    pub status: String,

    /// Current server time, RFC 3339
    pub timestamp: String,

    /// Seconds since the server started
    pub uptime: u64,

    /// Server build version
    pub version: String,
}

/// Healthcheck handler
///
/// Liveness probe. Does not require authentication.
#[endpoint(tags("health"), summary = "Health check endpoint")]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<HealthResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Timestamp::now().to_string(),
        uptime: state.started.elapsed().as_secs(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use crate::test_helpers::{Mocks, public_service};

    use super::*;

    #[tokio::test]
    async fn test_healthcheck() -> TestResult {
        let service = public_service(
            Mocks::default(),
            Router::with_path("health").get(handler),
        );

        let response: HealthResponse = TestClient::get("http://example.com/health")
            .send(&service)
            .await
            .take_json()
            .await?;

        assert_eq!(response.status, "ok");
        assert_eq!(response.version, env!("CARGO_PKG_VERSION"));
        assert!(response.timestamp.parse::<Timestamp>().is_ok());

        Ok(())
    }
}
