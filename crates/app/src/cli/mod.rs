use clap::{Parser, Subcommand};

mod auth;
mod db;
mod scan;
mod tenant;
mod usage;

#[derive(Debug, Parser)]
#[command(name = "testgenium-app", about = "Testgenium CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Db(db::DbCommand),
    Tenant(tenant::TenantCommand),
    Usage(usage::UsageCommand),
    Auth(auth::AuthCommand),
    Scan(scan::ScanArgs),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Db(command) => db::run(command).await,
            Commands::Tenant(command) => tenant::run(command).await,
            Commands::Usage(command) => usage::run(command).await,
            Commands::Auth(command) => auth::run(command),
            Commands::Scan(args) => scan::run(args).await,
        }
    }
}
