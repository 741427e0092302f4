//! Account management commands.
//!
//! These open the same flat files the server uses, through the same
//! repositories, so validation and hashing match what the site does.

use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

use speakerlab_core::{Email, EmailError, Tier, UnknownTier};
use speakerlab_web::db::{Database, RepositoryError};
use speakerlab_web::models::user::UserAccount;
use speakerlab_web::services::auth::{AuthError, AuthService};

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum UserCommandError {
    /// The tier is not one of the known ids.
    #[error("{0}. Valid tiers: free, speaker, coach, curator")]
    InvalidTier(#[from] UnknownTier),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// No account with this email.
    #[error("No account with email: {0}")]
    NotFound(String),

    /// Account creation failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The data files could not be read or written.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Create an account.
///
/// # Errors
///
/// Returns `UserCommandError` if the tier, email or password is invalid, the
/// account exists, or the store fails.
pub async fn create(
    data_dir: &Path,
    email: &str,
    name: &str,
    password: &str,
    tier: &str,
) -> Result<UserAccount, UserCommandError> {
    let tier = Tier::from_str(tier)?;
    let db = Database::open(data_dir).await?;

    tracing::info!("Creating account: {} ({})", email, tier);
    let account = AuthService::new(db.users())
        .create_account(email, name, password, tier)
        .await?;
    tracing::info!("Account created: {}", account.email);

    Ok(account)
}

/// Change an account's tier.
///
/// # Errors
///
/// Returns `UserCommandError::NotFound` if there is no such account.
pub async fn set_tier(data_dir: &Path, email: &str, tier: &str) -> Result<(), UserCommandError> {
    let tier = Tier::from_str(tier)?;
    let email = Email::parse(email)?;
    let db = Database::open(data_dir).await?;

    db.users().set_tier(&email, tier).await.map_err(|e| match e {
        RepositoryError::NotFound => UserCommandError::NotFound(email.to_string()),
        other => other.into(),
    })?;

    tracing::info!("Tier of {} set to {}", email, tier);
    Ok(())
}

/// All accounts, sorted by email.
///
/// # Errors
///
/// Returns `UserCommandError::Repository` if the store cannot be read.
pub async fn list(data_dir: &Path) -> Result<Vec<UserAccount>, UserCommandError> {
    let db = Database::open(data_dir).await?;
    Ok(db.users().list_all().await?)
}

/// Print accounts as an aligned table.
#[allow(clippy::print_stdout)]
pub fn print_table(accounts: &[UserAccount]) {
    let width = accounts
        .iter()
        .map(|a| a.email.as_str().len())
        .max()
        .unwrap_or(5)
        .max(5);

    println!("{:<width$}  {:<9}  {:<10}  NAME", "EMAIL", "TIER", "CREATED");
    for account in accounts {
        println!(
            "{:<width$}  {:<9}  {:<10}  {}",
            account.email.as_str(),
            account.tier.display_name(),
            account.created_at.format("%Y-%m-%d"),
            account.name,
        );
    }
}
