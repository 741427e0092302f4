//! Tier comparison page.
//!
//! View-only: tiers are assigned by an admin, there is no checkout.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use chrono::{NaiveTime, Utc};

use speakerlab_core::{ModelClass, Tier};

use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::routes::PageUser;
use crate::state::AppState;

/// One tier's card.
pub struct TierCard {
    pub name: &'static str,
    pub color: &'static str,
    pub quota: u32,
    pub features: Vec<&'static str>,
    pub current: bool,
}

/// Upgrade page template.
#[derive(Template, WebTemplate)]
#[template(path = "upgrade.html")]
pub struct UpgradeTemplate {
    pub user: PageUser,
    pub used_today: usize,
    pub tiers: Vec<TierCard>,
}

/// Display the tier comparison.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<UpgradeTemplate> {
    let since = Utc::now().date_naive().and_time(NaiveTime::MIN).and_utc();
    let used_today = state
        .db()
        .history()
        .count_for_user_since(user.email.as_str(), since)
        .await?;

    let tiers = Tier::ALL
        .into_iter()
        .map(|tier| {
            let info = tier.info();
            TierCard {
                name: info.display_name,
                color: info.color,
                quota: info.analyses_per_day,
                features: features(tier, info.model),
                current: tier == user.tier,
            }
        })
        .collect();

    Ok(UpgradeTemplate {
        user: PageUser::from_account(&user),
        used_today,
        tiers,
    })
}

fn features(tier: Tier, model: ModelClass) -> Vec<&'static str> {
    let mut features = vec![match model {
        ModelClass::Basic => "Model de bază",
        ModelClass::Advanced => "Model avansat",
    }];
    features.extend(match tier {
        Tier::Free => &["5 criterii de bază", "Scorecard PDF cu grafic radar"][..],
        Tier::Speaker => &[
            "Cele 9 principii Talk Like TED",
            "Recomandări cu exemple TED",
            "Scorecard PDF cu grafic radar",
        ][..],
        Tier::Coach => &[
            "Plan de coaching pe 9 zile",
            "Exerciții și întrebări de lucru",
            "Scorecard PDF cu grafic radar",
        ][..],
        Tier::Curator => &[
            "Feedback personal de curator",
            "Verdict de pregătire pentru scenă",
            "Acces la panoul de administrare",
        ][..],
    });
    features
}
