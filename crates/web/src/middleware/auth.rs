//! Authentication extractors.
//!
//! The session stores only the account email. Every protected request reloads
//! the account, so a tier change made by an admin applies on the next request.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use speakerlab_core::Email;

use crate::error::{AppError, set_sentry_user};
use crate::models::session::keys;
use crate::models::user::UserAccount;
use crate::state::AppState;

/// Extractor that requires a logged-in account.
///
/// If nobody is logged in, returns a redirect to the login page.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.name)
/// }
/// ```
pub struct RequireAuth(pub UserAccount);

/// Extractor that requires an account on the admin tier.
pub struct RequireAdmin(pub UserAccount);

/// Error returned when a request lacks the required login or tier.
pub enum AuthRejection {
    /// Not logged in, or the session points at a deleted account.
    RedirectToLogin,
    /// Logged in below the admin tier.
    Forbidden,
    /// The account store could not be read.
    Store(AppError),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::Forbidden => AppError::Forbidden.into_response(),
            Self::Store(err) => err.into_response(),
        }
    }
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Set by SessionManagerLayer
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::RedirectToLogin)?;

        let Some(email) = session_email(session).await else {
            return Err(AuthRejection::RedirectToLogin);
        };

        let account = state
            .db()
            .users()
            .get(&email)
            .await
            .map_err(|e| AuthRejection::Store(e.into()))?;

        match account {
            Some(account) => {
                set_sentry_user(account.email.as_str(), account.tier.id());
                Ok(Self(account))
            }
            None => {
                tracing::info!(email = %email, "Session refers to a missing account");
                if let Err(e) = clear_session_email(session).await {
                    tracing::warn!(error = %e, "Failed to clear stale session");
                }
                Err(AuthRejection::RedirectToLogin)
            }
        }
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAuth(account) = RequireAuth::from_request_parts(parts, state).await?;
        if !account.is_admin() {
            tracing::warn!(email = %account.email, tier = %account.tier, "Admin route refused");
            return Err(AuthRejection::Forbidden);
        }
        Ok(Self(account))
    }
}

/// Email stored in the session, if any.
async fn session_email(session: &Session) -> Option<Email> {
    let stored: String = session.get(keys::USER_EMAIL).await.ok().flatten()?;
    Email::parse(&stored).ok()
}

/// Helper to log an account in.
///
/// The session id is cycled first so a pre-login id cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_session_email(
    session: &Session,
    email: &Email,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(keys::USER_EMAIL, email.as_str()).await
}

/// Helper to log the current account out.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_session_email(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
