// ABOUTME: Promptdesk CLI - operator tool for sessions and the template catalogue
// ABOUTME: Issues session tokens for external identities and lists active templates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//!
//! Usage:
//! ```bash
//! # Sign in an identity (owner rule applies) and print a session token
//! promptdesk-cli issue-token --open-id github|42 --name "Ada" --email ada@example.com
//!
//! # Show the active template catalogue
//! promptdesk-cli list-templates
//! ```

mod commands;

use clap::{Parser, Subcommand};
use promptdesk_server::{
    auth::AuthService, config::environment::ServerConfig, database_plugins::factory::open_database,
    errors::AppResult,
};
use tracing::info;

#[derive(Parser)]
#[command(
    name = "promptdesk-cli",
    about = "Promptdesk management CLI",
    long_about = "Operator tool for issuing session tokens and inspecting the prompt template catalogue."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Database URL override
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Upsert a user by external identity and print a session token
    IssueToken {
        /// External identity key
        #[arg(long)]
        open_id: String,

        /// Display name
        #[arg(long)]
        name: Option<String>,

        /// Email
        #[arg(long)]
        email: Option<String>,
    },

    /// List active prompt templates
    ListTemplates,
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .init();

    let mut config = ServerConfig::from_env()?;
    if let Some(database_url) = cli.database_url {
        config.database_url = database_url;
    }

    info!("Connecting to database: {}", config.database_url);
    let database = open_database(&config.database_url).await?;

    match cli.command {
        Command::IssueToken {
            open_id,
            name,
            email,
        } => {
            let auth = AuthService::new(database, &config.auth);
            commands::token::issue(&auth, open_id, name, email).await?;
        }
        Command::ListTemplates => {
            commands::templates::list(database.as_ref()).await;
        }
    }

    Ok(())
}
