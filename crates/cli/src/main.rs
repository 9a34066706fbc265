//! Bridgia CLI - database migrations and admin tools.
//!
//! # Usage
//!
//! ```bash
//! # Run site database migrations
//! bridgia migrate
//!
//! # Set the admin password for the first time
//! bridgia admin init --password 'long-random-secret'
//! BRIDGIA_ADMIN_PASSWORD='long-random-secret' bridgia admin init
//!
//! # Change the admin password
//! bridgia admin set-password --current 'old-secret' --new 'new-secret'
//!
//! # Show the latest submissions
//! bridgia inbox --limit 20
//! ```
//!
//! # Environment Variables
//!
//! - `SITE_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "bridgia")]
#[command(author, version, about = "Bridgia site CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage the admin password
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Print the most recent contact submissions
    Inbox {
        /// Number of submissions to show
        #[arg(short, long, default_value_t = 20)]
        limit: u32,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Set the admin password (only works once)
    Init {
        /// New admin password (at least 6 characters)
        #[arg(short, long, env = "BRIDGIA_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Change the admin password
    SetPassword {
        /// Current admin password
        #[arg(long)]
        current: String,

        /// New admin password (at least 6 characters)
        #[arg(long)]
        new: String,
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
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Init { password } => commands::admin::init(&password).await?,
            AdminAction::SetPassword { current, new } => {
                commands::admin::set_password(&current, &new).await?;
            }
        },
        Commands::Inbox { limit } => commands::inbox::show(limit).await?,
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
    fn test_parse_inbox_default_limit() {
        let cli = Cli::try_parse_from(["bridgia", "inbox"]).unwrap_or_else(|e| panic!("{e}"));
        assert!(matches!(cli.command, Commands::Inbox { limit: 20 }));
    }

    #[test]
    fn test_parse_set_password() {
        let cli = Cli::try_parse_from([
            "bridgia",
            "admin",
            "set-password",
            "--current",
            "old-secret",
            "--new",
            "new-secret",
        ])
        .unwrap_or_else(|e| panic!("{e}"));

        let Commands::Admin {
            action: AdminAction::SetPassword { current, new },
        } = cli.command
        else {
            panic!("expected admin set-password");
        };
        assert_eq!(current, "old-secret");
        assert_eq!(new, "new-secret");
    }
}
