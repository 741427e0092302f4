//! Authentication service.
//!
//! Password accounts only. New hashes are Argon2id; unsalted SHA-256 hex
//! digests from the first-generation user store still verify and are replaced
//! with an Argon2id hash on the next successful login.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sha2::{Digest, Sha256};

use speakerlab_core::{Email, Tier};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::user::UserAccount;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(users: UserRepository<'a>) -> Self {
        Self { users }
    }

    /// Register a new free-tier account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password is too short.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(
        &self,
        email: &str,
        name: &str,
        password: &str,
    ) -> Result<UserAccount, AuthError> {
        self.create_account(email, name, password, Tier::Free).await
    }

    /// Create an account with a given tier.
    ///
    /// # Errors
    ///
    /// Same as [`AuthService::register`].
    pub async fn create_account(
        &self,
        email: &str,
        name: &str,
        password: &str,
        tier: Tier,
    ) -> Result<UserAccount, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        self.users
            .create(&email, name, &password_hash, tier)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserAccount, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (account, password_hash) = self
            .users
            .get_with_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        match verify_password(password, &password_hash)? {
            Verified::Current => {}
            Verified::Legacy => {
                let upgraded = hash_password(password)?;
                if let Err(e) = self.users.set_password_hash(&email, &upgraded).await {
                    tracing::warn!(
                        email = %email,
                        error = %e,
                        "Failed to upgrade legacy password hash"
                    );
                } else {
                    tracing::info!(email = %email, "Upgraded legacy password hash");
                }
            }
        }

        Ok(account)
    }

    /// Create the configured admin account unless it already exists.
    ///
    /// Returns `true` if an account was created.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the credentials are invalid or the store fails.
    pub async fn ensure_admin(&self, email: &str, password: &str) -> Result<bool, AuthError> {
        let parsed = Email::parse(email)?;
        if self.users.exists(&parsed).await? {
            return Ok(false);
        }

        self.create_account(email, "Curator", password, Tier::Curator)
            .await?;
        Ok(true)
    }
}

/// How a stored hash matched.
#[derive(Debug, PartialEq, Eq)]
enum Verified {
    Current,
    Legacy,
}

/// Validate password requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(MIN_PASSWORD_LENGTH));
    }
    Ok(())
}

/// Hash a password using Argon2id.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against an Argon2 PHC string or a legacy SHA-256 digest.
fn verify_password(password: &str, hash: &str) -> Result<Verified, AuthError> {
    if is_legacy_hash(hash) {
        let digest = hex::encode(Sha256::digest(password.as_bytes()));
        return if digest.eq_ignore_ascii_case(hash) {
            Ok(Verified::Legacy)
        } else {
            Err(AuthError::InvalidCredentials)
        };
    }

    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map(|()| Verified::Current)
        .map_err(|_| AuthError::InvalidCredentials)
}

fn is_legacy_hash(hash: &str) -> bool {
    hash.len() == 64 && hash.bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::Database;

    const ADMIN123_SHA256: &str =
        "240be518fabd2724ddb6f04eeb1da5967448d7e831c08c8fa822809f74c720a9";

    #[test]
    fn test_validate_password() {
        assert!(matches!(
            validate_password("12345"),
            Err(AuthError::WeakPassword(6))
        ));
        assert!(validate_password("123456").is_ok());
    }

    #[test]
    fn test_argon2_roundtrip() {
        let hash = hash_password("secret-pass").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert_eq!(verify_password("secret-pass", &hash).unwrap(), Verified::Current);
        assert!(verify_password("wrong-pass", &hash).is_err());
    }

    #[test]
    fn test_legacy_sha256_verifies() {
        assert_eq!(
            verify_password("admin123", ADMIN123_SHA256).unwrap(),
            Verified::Legacy
        );
        assert!(verify_password("admin124", ADMIN123_SHA256).is_err());
    }

    #[test]
    fn test_garbage_hash_rejects() {
        assert!(matches!(
            verify_password("anything", "not-a-hash"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(dir.path()).await.unwrap();
        let auth = AuthService::new(db.users());

        let account = auth
            .register(" Ana@TEDxBrasov.ro ", "Ana", "parola-buna")
            .await
            .unwrap();
        assert_eq!(account.email.as_str(), "ana@tedxbrasov.ro");
        assert_eq!(account.tier, Tier::Free);

        let logged_in = auth.login("ana@tedxbrasov.ro", "parola-buna").await.unwrap();
        assert_eq!(logged_in.email, account.email);

        assert!(matches!(
            auth.login("ana@tedxbrasov.ro", "gresit").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("nobody@tedxbrasov.ro", "parola-buna").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_register_rejects_duplicates_and_short_passwords() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(dir.path()).await.unwrap();
        let auth = AuthService::new(db.users());

        auth.register("ana@b.ro", "Ana", "123456").await.unwrap();
        assert!(matches!(
            auth.register("ANA@b.ro", "Ana", "123456").await,
            Err(AuthError::UserAlreadyExists)
        ));
        assert!(matches!(
            auth.register("zoe@b.ro", "Zoe", "123").await,
            Err(AuthError::WeakPassword(_))
        ));
        assert!(matches!(
            auth.register("not-an-email", "X", "123456").await,
            Err(AuthError::InvalidEmail(_))
        ));
    }

    #[tokio::test]
    async fn test_legacy_login_upgrades_hash() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(dir.path()).await.unwrap();
        let email = Email::parse("tibi@example.com").unwrap();
        db.users()
            .create(&email, "Tibi", ADMIN123_SHA256, Tier::Curator)
            .await
            .unwrap();

        let auth = AuthService::new(db.users());
        auth.login("tibi@example.com", "admin123").await.unwrap();

        let (_, hash) = db.users().get_with_password_hash(&email).await.unwrap().unwrap();
        assert!(hash.starts_with("$argon2"));
        auth.login("tibi@example.com", "admin123").await.unwrap();
    }

    #[tokio::test]
    async fn test_ensure_admin_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(dir.path()).await.unwrap();
        let auth = AuthService::new(db.users());

        assert!(auth.ensure_admin("curator@b.ro", "long-password").await.unwrap());
        assert!(!auth.ensure_admin("curator@b.ro", "long-password").await.unwrap());

        let account = db
            .users()
            .get(&Email::parse("curator@b.ro").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(account.tier, Tier::Curator);
    }
}
