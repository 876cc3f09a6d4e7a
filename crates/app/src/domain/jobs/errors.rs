//! Jobs service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JobsServiceError {
    /// A job with the same id already exists.
    #[error("job already exists")]
    DuplicateId,

    /// The job does not exist or belongs to another tenant.
    #[error("job not found")]
    NotFound,

    /// The owning tenant does not exist.
    #[error("invalid owner")]
    InvalidOwner,

    /// Underlying SQL/storage error.
    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for JobsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::DuplicateId,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidOwner,
            Some(_) | None => Self::Sql(error),
        }
    }
}
