use std::sync::Arc;

use clap::Args;
use testgenium_app::{
    auth::{AuthService, PasswordHasher, Registration, SigningKey, TokenAuthService},
    clock::SystemClock,
    database,
    domain::tenants::PgTenantsService,
};

#[derive(Debug, Args)]
pub(crate) struct CreateTenantArgs {
    /// Login email
    #[arg(long)]
    email: String,

    /// Login password
    #[arg(long, env = "TENANT_PASSWORD", hide_env_values = true)]
    password: String,

    /// Company name
    #[arg(long)]
    company: String,

    /// Contact's full name
    #[arg(long)]
    name: String,

    /// Optional phone number
    #[arg(long)]
    phone: Option<String>,

    /// Plan: basic, professional or enterprise
    #[arg(long, default_value = "basic")]
    plan: String,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

pub(crate) async fn run(args: CreateTenantArgs) -> Result<(), String> {
    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    // Registration goes through the auth service for validation and hashing;
    // the session it issues is discarded, so a throwaway key is fine.
    let auth = TokenAuthService::new(
        Arc::new(PgTenantsService::new(pool)),
        PasswordHasher::new(),
        SigningKey::generate(),
        testgenium_app::auth::DEFAULT_SESSION_TTL,
        Arc::new(SystemClock),
    );

    let session = auth
        .register(Registration {
            email: args.email,
            secret: args.password,
            company_name: args.company,
            full_name: args.name,
            phone: args.phone,
            plan: Some(args.plan),
        })
        .await
        .map_err(|error| format!("failed to create tenant: {error}"))?;

    println!("tenant_uuid: {}", session.tenant.uuid);
    println!("tenant_email: {}", session.tenant.email);
    println!("tenant_plan: {}", session.tenant.plan);

    Ok(())
}
