//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] speakerlab_core::EmailError),

    /// Wrong password or unknown email.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Email already registered.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password shorter than the minimum length.
    #[error("password must be at least {0} characters")]
    WeakPassword(usize),

    /// Repository error.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl AuthError {
    /// Message safe to show on the login and register forms.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidEmail(_) => "Adresa de email nu este validă.".to_string(),
            Self::InvalidCredentials => "Email sau parolă incorectă.".to_string(),
            Self::UserAlreadyExists => "Acest email este deja înregistrat.".to_string(),
            Self::WeakPassword(min) => {
                format!("Parola trebuie să aibă cel puțin {min} caractere.")
            }
            Self::Repository(_) | Self::PasswordHash => {
                "A apărut o eroare. Încearcă din nou.".to_string()
            }
        }
    }
}
