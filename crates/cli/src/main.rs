//! Speaker Lab CLI - account management against the service's data files.
//!
//! # Usage
//!
//! ```bash
//! # Create an account (free tier unless -t is given)
//! sl-cli user create -e ana@example.com -n "Ana" -p secret123 -t coach
//!
//! # Change an account's tier
//! sl-cli user set-tier -e ana@example.com -t curator
//!
//! # List accounts
//! sl-cli user list
//! ```
//!
//! The data directory comes from `--data-dir`, then `SPEAKERLAB_DATA_DIR`,
//! then `data`. Run it while the server is stopped: the server serialises its
//! own writes but does not see changes made by another process mid-update.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "sl-cli")]
#[command(author, version, about = "Speaker Lab CLI tools")]
struct Cli {
    /// Directory holding users.json and history.json
    #[arg(long, env = "SPEAKERLAB_DATA_DIR", default_value = "data", global = true)]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new account
    Create {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Password (at least 6 characters)
        #[arg(short, long)]
        password: String,

        /// Tier (`free`, `speaker`, `coach`, `curator`)
        #[arg(short, long, default_value = "free")]
        tier: String,
    },
    /// Change an account's tier
    SetTier {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// New tier (`free`, `speaker`, `coach`, `curator`)
        #[arg(short, long)]
        tier: String,
    },
    /// List all accounts
    List,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

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
        Commands::User { action } => match action {
            UserAction::Create {
                email,
                name,
                password,
                tier,
            } => {
                commands::user::create(&cli.data_dir, &email, &name, &password, &tier).await?;
            }
            UserAction::SetTier { email, tier } => {
                commands::user::set_tier(&cli.data_dir, &email, &tier).await?;
            }
            UserAction::List => {
                let accounts = commands::user::list(&cli.data_dir).await?;
                commands::user::print_table(&accounts);
            }
        },
    }
    Ok(())
}
