//! Auth service.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};
use mockall::automock;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::{
    auth::{AuthError, PasswordHasher, SigningKey, issue_session_token, verify_session_token},
    clock::Clock,
    domain::tenants::{
        TenantsService, TenantsServiceError,
        data::NewTenant,
        records::{PasswordHash, Plan, TenantRecord, TenantUuid, Usage},
    },
};

/// Default session lifetime.
pub const DEFAULT_SESSION_TTL: SignedDuration = SignedDuration::from_hours(24);

/// A signed-in tenant and its bearer token.
#[derive(Debug, Clone)]
pub struct Session {
    pub tenant: TenantRecord,
    pub token: String,
    pub expires_at: Timestamp,
}

/// Self-service sign-up details.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Registration {
    pub email: String,
    pub secret: String,
    pub company_name: String,
    pub full_name: String,
    pub phone: Option<String>,

    /// Plan name; `basic` when absent.
    pub plan: Option<String>,
}

#[automock]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Check credentials and issue a session.
    async fn authenticate(&self, email: &str, secret: &str) -> Result<Session, AuthError>;

    /// Resolve a bearer token to an active tenant.
    async fn verify(&self, token: &str) -> Result<TenantUuid, AuthError>;

    /// Create a tenant with its plan's default limits and issue a session.
    async fn register(&self, registration: Registration) -> Result<Session, AuthError>;
}

/// Credential verifier issuing stateless signed session tokens.
pub struct TokenAuthService {
    tenants: Arc<dyn TenantsService>,
    hasher: PasswordHasher,
    key: SigningKey,
    ttl: SignedDuration,
    clock: Arc<dyn Clock>,

    /// Hash compared against when the email is unknown, so a miss costs as
    /// much as a wrong password.
    decoy: OnceCell<PasswordHash>,
}

impl TokenAuthService {
    #[must_use]
    pub fn new(
        tenants: Arc<dyn TenantsService>,
        hasher: PasswordHasher,
        key: SigningKey,
        ttl: SignedDuration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            tenants,
            hasher,
            key,
            ttl,
            clock,
            decoy: OnceCell::new(),
        }
    }

    fn issue(&self, tenant: TenantRecord) -> Result<Session, AuthError> {
        let expires_at = self.clock.now() + self.ttl;
        let token = issue_session_token(&self.key, tenant.uuid, expires_at)?;

        Ok(Session {
            tenant,
            token,
            expires_at,
        })
    }

    async fn decoy_hash(&self) -> Result<PasswordHash, AuthError> {
        self.decoy
            .get_or_try_init(|| self.hasher.hash(SigningKey::generate().to_hex()))
            .await
            .cloned()
    }
}

fn required(field: &str, value: &str) -> Result<String, AuthError> {
    let value = value.trim();

    if value.is_empty() {
        return Err(AuthError::ValidationError(format!("{field} is required")));
    }

    Ok(value.to_string())
}

#[async_trait]
impl AuthService for TokenAuthService {
    async fn authenticate(&self, email: &str, secret: &str) -> Result<Session, AuthError> {
        // Registration stores the trimmed address; the match is otherwise exact.
        let tenant = self.tenants.find_tenant_by_email(email.trim()).await?;

        let hash = match &tenant {
            Some(tenant) => tenant.password_hash.clone(),
            None => self.decoy_hash().await?,
        };

        let matched = self.hasher.verify(secret.to_string(), hash).await?;

        match tenant {
            Some(tenant) if matched && tenant.is_active => {
                info!(tenant = %tenant.uuid, "tenant signed in");
                self.issue(tenant)
            }
            _ => {
                warn!("rejected sign-in attempt");
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    async fn verify(&self, token: &str) -> Result<TenantUuid, AuthError> {
        let token = token.trim();

        if token.is_empty() {
            return Err(AuthError::TokenMissing);
        }

        let claims = verify_session_token(&self.key, token, self.clock.now())?;

        match self.tenants.get_tenant(claims.tenant).await {
            Ok(tenant) if tenant.is_active => Ok(tenant.uuid),
            Ok(_) | Err(TenantsServiceError::NotFound) => Err(AuthError::TokenInvalid),
            Err(error) => Err(error.into()),
        }
    }

    async fn register(&self, registration: Registration) -> Result<Session, AuthError> {
        let email = required("email", &registration.email)?;
        let company_name = required("company name", &registration.company_name)?;
        let full_name = required("full name", &registration.full_name)?;

        if registration.secret.trim().is_empty() {
            return Err(AuthError::ValidationError("password is required".to_string()));
        }

        let plan = match registration.plan.as_deref().map(str::trim) {
            None | Some("") => Plan::default(),
            Some(name) => name
                .parse::<Plan>()
                .map_err(|e| AuthError::ValidationError(e.to_string()))?,
        };

        let password_hash = self.hasher.hash(registration.secret).await?;

        let tenant = self
            .tenants
            .create_tenant(
                NewTenant {
                    uuid: TenantUuid::new(),
                    email,
                    password_hash,
                    company_name,
                    full_name,
                    phone: registration
                        .phone
                        .map(|phone| phone.trim().to_string())
                        .filter(|phone| !phone.is_empty()),
                    plan,
                    limits: plan.default_limits(),
                    usage: Usage::default(),
                    is_active: true,
                    email_verified: false,
                },
                self.clock.now(),
            )
            .await?;

        info!(tenant = %tenant.uuid, plan = %tenant.plan, "tenant registered");

        self.issue(tenant)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        domain::tenants::{MemoryTenantsService, records::MonthlyAllowance},
        test::{clock::ManualClock, fixtures::new_tenant},
    };

    use super::*;

    struct Fixture {
        auth: TokenAuthService,
        tenants: Arc<MemoryTenantsService>,
        clock: Arc<ManualClock>,
        hasher: PasswordHasher,
    }

    fn fixture() -> Result<Fixture, AuthError> {
        let tenants = Arc::new(MemoryTenantsService::new());
        let clock = Arc::new(ManualClock::default());
        let hasher = PasswordHasher::with_params(1024, 1, 1)?;
        let key = SigningKey::from_bytes(vec![7; 32])?;

        Ok(Fixture {
            auth: TokenAuthService::new(
                tenants.clone(),
                hasher.clone(),
                key,
                DEFAULT_SESSION_TTL,
                clock.clone(),
            ),
            tenants,
            clock,
            hasher,
        })
    }

    fn registration(email: &str) -> Registration {
        Registration {
            email: email.to_string(),
            secret: "s3cret".to_string(),
            company_name: "Acme".to_string(),
            full_name: "Ada Admin".to_string(),
            phone: None,
            plan: Some("professional".to_string()),
        }
    }

    #[tokio::test]
    async fn register_then_login() -> TestResult {
        let f = fixture()?;

        let registered = f.auth.register(registration("ada@acme.test")).await?;

        assert_eq!(registered.tenant.plan, Plan::Professional);
        assert_eq!(
            registered.tenant.limits.tests_per_month,
            MonthlyAllowance::Limited(50)
        );
        assert_eq!(registered.tenant.usage, Usage::default());
        assert!(!registered.tenant.email_verified);
        assert_ne!(registered.tenant.password_hash.as_str(), "s3cret");

        let session = f.auth.authenticate("ada@acme.test", "s3cret").await?;

        assert_eq!(session.tenant.uuid, registered.tenant.uuid);
        assert_eq!(f.auth.verify(&session.token).await?, registered.tenant.uuid);

        Ok(())
    }

    #[tokio::test]
    async fn plan_defaults_to_basic() -> TestResult {
        let f = fixture()?;

        let session = f
            .auth
            .register(Registration {
                plan: None,
                ..registration("basic@acme.test")
            })
            .await?;

        assert_eq!(session.tenant.plan, Plan::Basic);

        Ok(())
    }

    #[tokio::test]
    async fn register_rejects_blank_fields_and_unknown_plans() -> TestResult {
        let f = fixture()?;

        for invalid in [
            Registration {
                email: "  ".to_string(),
                ..registration("x@acme.test")
            },
            Registration {
                secret: String::new(),
                ..registration("x@acme.test")
            },
            Registration {
                company_name: String::new(),
                ..registration("x@acme.test")
            },
            Registration {
                full_name: String::new(),
                ..registration("x@acme.test")
            },
            Registration {
                plan: Some("platinum".to_string()),
                ..registration("x@acme.test")
            },
        ] {
            let result = f.auth.register(invalid).await;

            assert!(
                matches!(result, Err(AuthError::ValidationError(_))),
                "expected ValidationError, got {result:?}"
            );
        }

        assert!(f.tenants.find_tenant_by_email("x@acme.test").await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn duplicate_email_is_taken() -> TestResult {
        let f = fixture()?;

        f.auth.register(registration("dup@acme.test")).await?;

        let result = f.auth.register(registration("dup@acme.test")).await;

        assert!(matches!(result, Err(AuthError::EmailTaken)));

        Ok(())
    }

    #[tokio::test]
    async fn wrong_secret_unknown_email_and_other_case_are_invalid_credentials() -> TestResult {
        let f = fixture()?;

        f.auth.register(registration("case@acme.test")).await?;

        for (email, secret) in [
            ("case@acme.test", "wrong"),
            ("nobody@acme.test", "s3cret"),
            ("CASE@acme.test", "s3cret"),
        ] {
            let result = f.auth.authenticate(email, secret).await;

            assert!(
                matches!(result, Err(AuthError::InvalidCredentials)),
                "{email}/{secret} should be rejected, got {result:?}"
            );
        }

        Ok(())
    }

    #[tokio::test]
    async fn email_whitespace_is_trimmed_like_registration() -> TestResult {
        let f = fixture()?;

        let registered = f.auth.register(registration("  pad@acme.test ")).await?;

        assert_eq!(registered.tenant.email, "pad@acme.test");

        let session = f.auth.authenticate(" pad@acme.test\t", "s3cret").await?;

        assert_eq!(session.tenant.uuid, registered.tenant.uuid);

        Ok(())
    }

    #[tokio::test]
    async fn inactive_tenant_cannot_sign_in() -> TestResult {
        let f = fixture()?;

        let mut tenant = new_tenant("gone@acme.test", Plan::Basic);
        tenant.password_hash = f.hasher.hash("s3cret".to_string()).await?;
        tenant.is_active = false;

        f.tenants.create_tenant(tenant, f.clock.now()).await?;

        let result = f.auth.authenticate("gone@acme.test", "s3cret").await;

        assert!(matches!(result, Err(AuthError::InvalidCredentials)));

        Ok(())
    }

    #[tokio::test]
    async fn token_lifetime_is_24_hours() -> TestResult {
        let f = fixture()?;
        let session = f.auth.register(registration("ttl@acme.test")).await?;

        f.clock.advance(SignedDuration::from_hours(1));

        assert_eq!(f.auth.verify(&session.token).await?, session.tenant.uuid);

        f.clock.advance(SignedDuration::from_hours(24));

        assert!(matches!(
            f.auth.verify(&session.token).await,
            Err(AuthError::TokenExpired)
        ));

        Ok(())
    }

    #[tokio::test]
    async fn verify_classifies_failures() -> TestResult {
        let f = fixture()?;

        assert!(matches!(f.auth.verify("").await, Err(AuthError::TokenMissing)));
        assert!(matches!(
            f.auth.verify("tg_v1_bogus").await,
            Err(AuthError::TokenInvalid)
        ));

        // Well-signed token for a tenant that does not exist.
        let orphan = issue_session_token(
            &SigningKey::from_bytes(vec![7; 32])?,
            TenantUuid::new(),
            f.clock.now() + DEFAULT_SESSION_TTL,
        )?;

        assert!(matches!(
            f.auth.verify(&orphan).await,
            Err(AuthError::TokenInvalid)
        ));

        Ok(())
    }

    #[tokio::test]
    async fn token_of_deactivated_tenant_is_invalid() -> TestResult {
        let f = fixture()?;

        let mut tenant = new_tenant("off@acme.test", Plan::Basic);
        tenant.is_active = false;

        let tenant = f.tenants.create_tenant(tenant, f.clock.now()).await?;

        let token = issue_session_token(
            &SigningKey::from_bytes(vec![7; 32])?,
            tenant.uuid,
            f.clock.now() + DEFAULT_SESSION_TTL,
        )?;

        assert!(matches!(
            f.auth.verify(&token).await,
            Err(AuthError::TokenInvalid)
        ));

        Ok(())
    }
}
