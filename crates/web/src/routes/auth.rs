//! Authentication route handlers.
//!
//! Login, registration and logout for password accounts. Form errors are
//! passed back to the page as a short code in `?error=`.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use speakerlab_core::EmailError;

use crate::error::{add_breadcrumb, clear_sentry_user};
use crate::filters;
use crate::middleware::{clear_session_email, set_session_email};
use crate::services::auth::{AuthError, AuthService, MIN_PASSWORD_LENGTH};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: String,
}

/// Query parameters for error display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub error: Option<String>,
}

// =============================================================================
// Error codes
// =============================================================================

/// Short code carried in the redirect URL for a failed form.
fn error_code(err: &AuthError) -> &'static str {
    match err {
        AuthError::InvalidEmail(_) => "email",
        AuthError::InvalidCredentials => "credentials",
        AuthError::UserAlreadyExists => "exists",
        AuthError::WeakPassword(_) => "password",
        AuthError::Repository(_) | AuthError::PasswordHash => "server",
    }
}

/// Message shown for an error code. Unknown codes show nothing.
fn error_message(code: &str) -> Option<String> {
    let err = match code {
        "email" => AuthError::InvalidEmail(EmailError::Empty),
        "credentials" => AuthError::InvalidCredentials,
        "exists" => AuthError::UserAlreadyExists,
        "password" => AuthError::WeakPassword(MIN_PASSWORD_LENGTH),
        "server" => AuthError::PasswordHash,
        "session" => return Some("Sesiunea nu a putut fi creată. Încearcă din nou.".to_string()),
        _ => return None,
    };
    Some(err.user_message())
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    LoginTemplate {
        error: query.error.as_deref().and_then(error_message),
    }
}

/// Handle login form submission.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let auth = AuthService::new(state.db().users());

    match auth.login(&form.email, &form.password).await {
        Ok(account) => {
            if let Err(e) = set_session_email(&session, &account.email).await {
                tracing::error!("Failed to set session: {}", e);
                return Redirect::to("/login?error=session").into_response();
            }

            add_breadcrumb("auth", "Login", &[("tier", account.tier.id())]);
            tracing::info!(email = %account.email, "User logged in");
            Redirect::to("/").into_response()
        }
        Err(e) => {
            tracing::warn!("Login failed: {}", e);
            Redirect::to(&format!("/login?error={}", error_code(&e))).into_response()
        }
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    RegisterTemplate {
        error: query.error.as_deref().and_then(error_message),
    }
}

/// Handle registration form submission.
///
/// New accounts start on the free tier and are logged in immediately.
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Response {
    let auth = AuthService::new(state.db().users());

    match auth.register(&form.email, &form.name, &form.password).await {
        Ok(account) => {
            if let Err(e) = set_session_email(&session, &account.email).await {
                tracing::error!("Failed to set session: {}", e);
                return Redirect::to("/login?error=session").into_response();
            }

            tracing::info!(email = %account.email, "User registered");
            Redirect::to("/").into_response()
        }
        Err(e) => {
            tracing::warn!("Registration failed: {}", e);
            Redirect::to(&format!("/register?error={}", error_code(&e))).into_response()
        }
    }
}

// =============================================================================
// Logout
// =============================================================================

/// Log out and return to the login page.
pub async fn logout(session: Session) -> Redirect {
    if let Err(e) = clear_session_email(&session).await {
        tracing::error!("Failed to clear session: {}", e);
    }
    clear_sentry_user();
    Redirect::to("/login")
}
