//! PureSkin CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply gateway database migrations
//! ps-cli migrate
//!
//! # Check migration status without applying anything
//! ps-cli migrate --dry-run
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run gateway database migrations

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "ps-cli")]
#[command(author, version, about = "PureSkin gateway CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run gateway database migrations
    Migrate {
        /// List pending migrations without applying them
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate { dry_run } => {
            if dry_run {
                commands::migrate::status().await?;
            } else {
                commands::migrate::apply().await?;
            }
        }
    }
    Ok(())
}
