use clap::Args;
use jiff::Timestamp;
use testgenium_app::{auth::PasswordHasher, database, domain::tenants::PgTenantsService, seed};

#[derive(Debug, Args)]
pub(crate) struct SeedArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

pub(crate) async fn run(args: SeedArgs) -> Result<(), String> {
    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let created = seed::seed_demo_tenants(
        &PgTenantsService::new(pool),
        &PasswordHasher::new(),
        Timestamp::now(),
    )
    .await
    .map_err(|error| format!("failed to seed tenants: {error}"))?;

    for tenant in &created {
        println!("seeded: {} ({})", tenant.email, tenant.plan);
    }

    if created.is_empty() {
        println!("demo tenants already present");
    }

    Ok(())
}
