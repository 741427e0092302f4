//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (stores readable)
//!
//! # Auth
//! GET  /login                  - Login page
//! POST /login                  - Login action
//! GET  /register               - Register page
//! POST /register               - Register action
//! GET  /logout                 - Logout
//! POST /logout                 - Logout
//!
//! # Analysis (requires auth)
//! GET  /                       - Transcript form, usage, recent analyses
//! POST /                       - Run the tier's analysis
//! GET  /upgrade                - Tier comparison
//! GET  /download/{file}        - Scorecard download (owner or admin)
//!
//! # Admin (requires the curator tier)
//! GET  /admin                  - Account list
//! POST /admin/set-tier         - Change an account's tier
//! ```

pub mod admin;
pub mod auth;
pub mod download;
pub mod home;
pub mod upgrade;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    middleware::from_fn,
    routing::{get, post},
};

use crate::middleware::{create_session_layer, request_id_middleware};
use crate::models::user::UserAccount;
use crate::state::AppState;

/// Account details every logged-in page shows in its header.
pub struct PageUser {
    pub name: String,
    pub email: String,
    pub tier_name: &'static str,
    pub tier_color: &'static str,
    pub is_admin: bool,
}

impl PageUser {
    #[must_use]
    pub fn from_account(account: &UserAccount) -> Self {
        let info = account.tier.info();
        Self {
            name: account.name.clone(),
            email: account.email.as_str().to_string(),
            tier_name: info.display_name,
            tier_color: info.color,
            is_admin: account.is_admin(),
        }
    }
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", get(auth::logout).post(auth::logout))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(admin::index))
        .route("/set-tier", post(admin::set_tier))
}

/// Create all page routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::index).post(home::analyze))
        .route("/upgrade", get(upgrade::show))
        .route("/download/{file}", get(download::download))
        .nest("/admin", admin_routes())
        .merge(auth_routes())
}

/// Build the full application router with sessions and request ids.
///
/// Tracing and Sentry layers are added by the binary.
pub fn build_router(state: AppState) -> Router {
    let session_layer = create_session_layer(state.config());

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes())
        .layer(session_layer)
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if either store cannot be read.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.db().check().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
