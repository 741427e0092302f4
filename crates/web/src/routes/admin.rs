//! Admin panel route handlers.
//!
//! Only accounts on the curator tier get here; everyone else is refused by
//! [`RequireAdmin`] before any handler runs.

use std::str::FromStr;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::Redirect,
};
use serde::Deserialize;

use speakerlab_core::{Email, Tier};

use crate::db::RepositoryError;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::routes::PageUser;
use crate::state::AppState;

/// Tier change form.
#[derive(Debug, Deserialize)]
pub struct SetTierForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub tier: String,
}

/// One account row.
pub struct AccountRow {
    pub email: String,
    pub name: String,
    pub tier_id: &'static str,
    pub tier_name: &'static str,
    pub tier_color: &'static str,
    pub created: String,
}

/// Tier choice in the selector.
pub struct TierOption {
    pub id: &'static str,
    pub name: &'static str,
}

/// Admin page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin.html")]
pub struct AdminTemplate {
    pub user: PageUser,
    pub accounts: Vec<AccountRow>,
    pub tiers: Vec<TierOption>,
}

/// List all accounts with tier selectors.
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<AdminTemplate> {
    let accounts = state
        .db()
        .users()
        .list_all()
        .await?
        .into_iter()
        .map(|account| AccountRow {
            email: account.email.as_str().to_string(),
            name: account.name,
            tier_id: account.tier.id(),
            tier_name: account.tier.display_name(),
            tier_color: account.tier.info().color,
            created: account.created_at.format("%d.%m.%Y").to_string(),
        })
        .collect();

    let tiers = Tier::ALL
        .into_iter()
        .map(|tier| TierOption {
            id: tier.id(),
            name: tier.display_name(),
        })
        .collect();

    Ok(AdminTemplate {
        user: PageUser::from_account(&admin),
        accounts,
        tiers,
    })
}

/// Change an account's tier.
///
/// The tier must be a known id (legacy ids accepted); anything else is a 400
/// and nothing is written.
pub async fn set_tier(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Form(form): Form<SetTierForm>,
) -> Result<Redirect> {
    let tier = Tier::from_str(form.tier.trim()).map_err(|e| {
        tracing::warn!(error = %e, "Rejected tier change");
        AppError::BadRequest("Invalid tier".to_string())
    })?;
    let email = Email::parse(&form.email)
        .map_err(|_| AppError::NotFound("User not found".to_string()))?;

    state
        .db()
        .users()
        .set_tier(&email, tier)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("User not found".to_string()),
            other => AppError::Repository(other),
        })?;

    add_breadcrumb(
        "admin",
        "Tier changed",
        &[("email", email.as_str()), ("tier", tier.id())],
    );
    tracing::info!(admin = %admin.email, email = %email, tier = %tier, "Tier changed");

    Ok(Redirect::to("/admin"))
}
