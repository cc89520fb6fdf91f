//! CLI module for Rumbo
//!
//! - `serve`: start the HTTP server
//! - `doctor`: check configuration and secrets without starting anything

use clap::{Parser, Subcommand};

pub mod doctor;

/// Rumbo travel assistant
#[derive(Parser, Debug)]
#[command(name = "rumbo")]
#[command(about = "Conversational travel assistant backend")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the server
    Serve,
    /// Check configuration and secrets
    Doctor,
}

/// Run the CLI command
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Some(Commands::Serve) => crate::server::run().await,
        Some(Commands::Doctor) => doctor::run().await,
        None => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            cmd.print_help()?;
            println!();
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::try_parse_from(["rumbo", "serve"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Serve)));

        let cli = Cli::try_parse_from(["rumbo"]).unwrap();
        assert!(cli.command.is_none());

        assert!(Cli::try_parse_from(["rumbo", "deploy"]).is_err());
    }
}
