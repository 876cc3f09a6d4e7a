//! Auth errors.

use thiserror::Error;

use crate::{auth::SessionTokenError, domain::tenants::TenantsServiceError};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("authorization token is missing")]
    TokenMissing,

    #[error("authorization token is invalid")]
    TokenInvalid,

    #[error("authorization token has expired")]
    TokenExpired,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("email is already registered")]
    EmailTaken,

    #[error("{0}")]
    ValidationError(String),

    #[error("password hashing failed")]
    Hashing,

    #[error("session signing failed")]
    Signing(#[source] SessionTokenError),

    #[error("tenant storage error")]
    Tenants(#[source] TenantsServiceError),
}

impl From<TenantsServiceError> for AuthError {
    fn from(error: TenantsServiceError) -> Self {
        match error {
            TenantsServiceError::AlreadyExists => Self::EmailTaken,
            other => Self::Tenants(other),
        }
    }
}

impl From<SessionTokenError> for AuthError {
    fn from(error: SessionTokenError) -> Self {
        match error {
            SessionTokenError::Expired => Self::TokenExpired,
            SessionTokenError::InvalidKey => Self::Signing(error),
            SessionTokenError::InvalidFormat
            | SessionTokenError::UnsupportedVersion
            | SessionTokenError::InvalidSignature => Self::TokenInvalid,
        }
    }
}
