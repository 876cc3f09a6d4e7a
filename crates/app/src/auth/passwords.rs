//! Argon2id password hashing.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash as PhcHash, PasswordHasher as _, PasswordVerifier, SaltString,
        rand_core::OsRng,
    },
};
use tokio::task::spawn_blocking;
use tracing::error;

use crate::{auth::AuthError, domain::tenants::records::PasswordHash};

/// Hashes and verifies secrets off the async runtime.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    /// Hasher with argon2's default (OWASP minimum) cost parameters.
    #[must_use]
    pub fn new() -> Self {
        Self {
            params: Params::default(),
        }
    }

    /// Hasher with explicit costs. Cheap settings are useful in tests.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Hashing`] if argon2 rejects the parameters.
    pub fn with_params(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, AuthError> {
        let params = Params::new(memory_kib, iterations, parallelism, None).map_err(|e| {
            error!(error = %e, "invalid argon2 parameters");
            AuthError::Hashing
        })?;

        Ok(Self { params })
    }

    pub async fn hash(&self, secret: String) -> Result<PasswordHash, AuthError> {
        let params = self.params.clone();

        spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);

            Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
                .hash_password(secret.as_bytes(), &salt)
                .map(|hash| PasswordHash::new(hash.to_string()))
        })
        .await
        .map_err(|e| {
            error!(error = %e, "password hash task failed");
            AuthError::Hashing
        })?
        .map_err(|e| {
            error!(error = %e, "failed to hash password");
            AuthError::Hashing
        })
    }

    /// Whether `secret` matches `hash`. A malformed stored hash never matches.
    pub async fn verify(&self, secret: String, hash: PasswordHash) -> Result<bool, AuthError> {
        spawn_blocking(move || {
            PhcHash::new(hash.as_str()).is_ok_and(|parsed| {
                Argon2::default()
                    .verify_password(secret.as_bytes(), &parsed)
                    .is_ok()
            })
        })
        .await
        .map_err(|e| {
            error!(error = %e, "password verify task failed");
            AuthError::Hashing
        })
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
