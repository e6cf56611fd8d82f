//! Customer Registry CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run registry database migrations
//! registry-cli migrate
//!
//! # Create a login identity (secret from REGISTRY_IDENTITY_SECRET or stdin)
//! registry-cli identity register --handle operator
//!
//! # Check a national identifier offline
//! registry-cli customer check-identifier 52998224725
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "registry-cli")]
#[command(author, version, about = "Customer registry CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage login identities
    Identity {
        #[command(subcommand)]
        action: IdentityAction,
    },
    /// Customer record helpers
    Customer {
        #[command(subcommand)]
        action: CustomerAction,
    },
}

#[derive(Subcommand)]
enum IdentityAction {
    /// Register a new identity
    Register {
        /// Login handle
        #[arg(short = 'u', long)]
        handle: String,
    },
}

#[derive(Subcommand)]
enum CustomerAction {
    /// Check an 11-digit national identifier
    CheckIdentifier {
        /// Identifier to check
        identifier: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Identity { action } => match action {
            IdentityAction::Register { handle } => commands::identity::register(&handle).await?,
        },
        Commands::Customer { action } => match action {
            CustomerAction::CheckIdentifier { identifier } => {
                let id = commands::customer::check_identifier(&identifier)?;
                #[allow(clippy::print_stdout)]
                {
                    println!("{} is valid", id.as_str());
                }
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_register() {
        let cli = Cli::try_parse_from(["registry-cli", "identity", "register", "--handle", "operator"])
            .unwrap_or_else(|e| panic!("{e}"));
        assert!(matches!(
            cli.command,
            Commands::Identity { action: IdentityAction::Register { ref handle } } if handle == "operator"
        ));
    }
}
