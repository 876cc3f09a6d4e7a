use clap::{Args, Subcommand};

mod create;
mod seed;

#[derive(Debug, Args)]
pub(crate) struct TenantCommand {
    #[command(subcommand)]
    command: TenantSubcommand,
}

#[derive(Debug, Subcommand)]
enum TenantSubcommand {
    /// Create a tenant with its plan's default limits
    Create(create::CreateTenantArgs),

    /// Create the demo tenants if missing
    Seed(seed::SeedArgs),
}

pub(crate) async fn run(command: TenantCommand) -> Result<(), String> {
    match command.command {
        TenantSubcommand::Create(args) => create::run(args).await,
        TenantSubcommand::Seed(args) => seed::run(args).await,
    }
}
