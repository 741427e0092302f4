//! User repository over `users.json`.

use chrono::Utc;

use speakerlab_core::{Email, Tier};

use super::{JsonFile, RepositoryError};
use crate::models::user::{UserAccount, UserRecord, UserTable};

/// Repository for account operations.
pub struct UserRepository<'a> {
    file: &'a JsonFile<UserTable>,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(file: &'a JsonFile<UserTable>) -> Self {
        Self { file }
    }

    /// Get an account by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store cannot be read.
    pub async fn get(&self, email: &Email) -> Result<Option<UserAccount>, RepositoryError> {
        let users = self.file.read().await?;
        Ok(users
            .get(email.as_str())
            .map(|record| UserAccount::from_record(email.clone(), record)))
    }

    /// Get an account together with its password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store cannot be read.
    pub async fn get_with_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(UserAccount, String)>, RepositoryError> {
        let users = self.file.read().await?;
        Ok(users.get(email.as_str()).map(|record| {
            (
                UserAccount::from_record(email.clone(), record),
                record.password_hash.clone(),
            )
        }))
    }

    /// Whether an account exists for `email`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store cannot be read.
    pub async fn exists(&self, email: &Email) -> Result<bool, RepositoryError> {
        Ok(self.file.read().await?.contains_key(email.as_str()))
    }

    /// Create an account.
    ///
    /// The existence check and the insert happen under the same lock.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already registered.
    pub async fn create(
        &self,
        email: &Email,
        name: &str,
        password_hash: &str,
        tier: Tier,
    ) -> Result<UserAccount, RepositoryError> {
        let record = UserRecord {
            password_hash: password_hash.to_string(),
            name: name.trim().to_string(),
            tier,
            created_at: Utc::now(),
        };
        let account = UserAccount::from_record(email.clone(), &record);

        self.file
            .update(|users| {
                if users.contains_key(email.as_str()) {
                    return Err(RepositoryError::Conflict(format!(
                        "email already registered: {email}"
                    )));
                }
                users.insert(email.as_str().to_string(), record);
                Ok(())
            })
            .await?;

        tracing::info!(email = %email, tier = %tier, "Account created");
        Ok(account)
    }

    /// Change an account's tier.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no account has this email.
    pub async fn set_tier(&self, email: &Email, tier: Tier) -> Result<(), RepositoryError> {
        self.file
            .update(|users| {
                let record = users
                    .get_mut(email.as_str())
                    .ok_or(RepositoryError::NotFound)?;
                record.tier = tier;
                Ok(())
            })
            .await?;

        tracing::info!(email = %email, tier = %tier, "Tier updated");
        Ok(())
    }

    /// Replace an account's password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no account has this email.
    pub async fn set_password_hash(
        &self,
        email: &Email,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        self.file
            .update(|users| {
                let record = users
                    .get_mut(email.as_str())
                    .ok_or(RepositoryError::NotFound)?;
                password_hash.clone_into(&mut record.password_hash);
                Ok(())
            })
            .await
    }

    /// All accounts, ordered by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Io` if the store cannot be read and
    /// `RepositoryError::DataCorruption` if a stored key is not a valid email.
    pub async fn list_all(&self) -> Result<Vec<UserAccount>, RepositoryError> {
        let users = self.file.read().await?;
        users
            .iter()
            .map(|(key, record)| {
                let email = Email::parse(key).map_err(|e| {
                    RepositoryError::DataCorruption(format!("invalid email in user store: {e}"))
                })?;
                Ok(UserAccount::from_record(email, record))
            })
            .collect()
    }
}
