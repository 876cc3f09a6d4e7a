//! Auth Handlers

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};

use testgenium_app::auth::Session;

use crate::plans::TenantResponse;

pub(crate) mod login;
pub(crate) mod register;

/// Issued session.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SessionResponse {
    pub tenant: TenantResponse,

    /// Bearer token for the `Authorization` header
    pub token: String,

    /// RFC 3339 expiry of `token`
    pub expires_at: String,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        Self {
            tenant: session.tenant.into(),
            token: session.token,
            expires_at: session.expires_at.to_string(),
        }
    }
}
