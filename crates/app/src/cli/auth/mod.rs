use clap::{Args, Subcommand};
use testgenium_app::auth::SigningKey;

#[derive(Debug, Args)]
pub(crate) struct AuthCommand {
    #[command(subcommand)]
    command: AuthSubcommand,
}

#[derive(Debug, Subcommand)]
enum AuthSubcommand {
    /// Print a fresh random session signing key (hex)
    GenerateKey,
}

pub(crate) fn run(command: AuthCommand) -> Result<(), String> {
    match command.command {
        AuthSubcommand::GenerateKey => {
            println!("{}", SigningKey::generate().to_hex());
            Ok(())
        }
    }
}
