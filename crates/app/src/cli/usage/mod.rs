use clap::{Args, Subcommand};
use jiff::Timestamp;
use testgenium_app::{
    database,
    domain::tenants::{PgTenantsService, TenantsService},
};

#[derive(Debug, Args)]
pub(crate) struct UsageCommand {
    #[command(subcommand)]
    command: UsageSubcommand,
}

#[derive(Debug, Subcommand)]
enum UsageSubcommand {
    /// Zero every tenant's monthly job counter. Meant for a monthly scheduler.
    ResetMonthly(ResetMonthlyArgs),
}

#[derive(Debug, Args)]
pub(crate) struct ResetMonthlyArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

pub(crate) async fn run(command: UsageCommand) -> Result<(), String> {
    match command.command {
        UsageSubcommand::ResetMonthly(args) => reset_monthly(args).await,
    }
}

async fn reset_monthly(args: ResetMonthlyArgs) -> Result<(), String> {
    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let reset = PgTenantsService::new(pool)
        .reset_monthly_usage(Timestamp::now())
        .await
        .map_err(|error| format!("failed to reset usage: {error}"))?;

    println!("tenants reset: {reset}");

    Ok(())
}
