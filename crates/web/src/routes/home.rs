//! Analysis page route handlers.
//!
//! `GET /` shows the transcript form, the account's tier and usage, and the
//! latest analyses. `POST /` runs the tier's pipeline, renders the scorecard,
//! records the entry and shows the result.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Form, extract::State};
use chrono::{Local, NaiveTime, Utc};
use serde::Deserialize;
use tracing::instrument;

use speakerlab_core::{AnalysisResult, TierAnalysis, format_score};

use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::history::{HistoryEntry, preview};
use crate::models::user::UserAccount;
use crate::routes::PageUser;
use crate::services::report::ReportInput;
use crate::state::AppState;

/// Entries listed under "recent analyses".
const RECENT_LIMIT: usize = 5;

/// Characters of each recent transcript shown in the list.
const RECENT_PREVIEW_CHARS: usize = 80;

// =============================================================================
// Form Types
// =============================================================================

/// Transcript submission.
#[derive(Debug, Deserialize)]
pub struct AnalyzeForm {
    #[serde(default)]
    pub speech_text: String,
}

// =============================================================================
// View Types
// =============================================================================

/// Analyses used today against the tier's daily allowance.
pub struct Usage {
    pub used: usize,
    pub quota: u32,
}

/// One scored line of a result.
pub struct ResultItem {
    pub title: String,
    pub score: Option<String>,
    /// `present` / `absent` for the speaker tier, status for coaching days.
    pub badge: Option<String>,
    pub lines: Vec<String>,
}

/// Titled list of short notes.
pub struct NoteList {
    pub title: String,
    pub entries: Vec<String>,
}

/// An analysis prepared for display.
pub struct ResultView {
    pub tier_name: &'static str,
    pub headline: Option<String>,
    pub verdict: Option<String>,
    pub message: Option<String>,
    pub items: Vec<ResultItem>,
    pub notes: Vec<NoteList>,
    /// Raw model reply when it could not be used.
    pub error: Option<String>,
}

/// A line in the recent analyses list.
pub struct RecentView {
    pub when: String,
    pub excerpt: String,
    pub tier_name: &'static str,
    pub summary: String,
    pub report_file: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Analysis page template.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub user: PageUser,
    pub usage: Usage,
    pub transcript: String,
    pub notice: Option<String>,
    pub result: Option<ResultView>,
    pub report_file: Option<String>,
    pub recent: Vec<RecentView>,
}

// =============================================================================
// Route Handlers
// =============================================================================

/// Display the analysis form.
#[instrument(skip(state, user), fields(email = %user.email))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<IndexTemplate> {
    page(&state, &user, String::new()).await
}

/// Run an analysis for the logged-in account.
///
/// A blank transcript re-displays the form. An upstream failure is returned
/// as an error page; a failed scorecard is logged and the result still shown.
#[instrument(skip(state, user, form), fields(email = %user.email, tier = %user.tier))]
pub async fn analyze(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<AnalyzeForm>,
) -> Result<IndexTemplate> {
    let transcript = form.speech_text;
    if transcript.trim().is_empty() {
        let mut template = page(&state, &user, transcript).await?;
        template.notice = Some("Introdu textul discursului pentru analiză.".to_string());
        return Ok(template);
    }

    add_breadcrumb("analysis", "Analysis requested", &[("tier", user.tier.id())]);
    let result = state.analyzer().analyze(user.tier, &transcript).await?;

    let input = ReportInput {
        transcript: transcript.clone(),
        result: result.clone(),
        speaker_name: user.name.clone(),
        generated_at: Local::now(),
    };
    let report_file = match state.reports().render_blocking(input).await {
        Ok(report) => Some(report.pdf_file),
        Err(e) => {
            tracing::error!(error = %e, "Scorecard rendering failed");
            None
        }
    };

    state
        .db()
        .history()
        .append(HistoryEntry::new(
            user.email.as_str(),
            &transcript,
            result.clone(),
            report_file.clone(),
        ))
        .await?;

    let mut template = page(&state, &user, transcript).await?;
    template.result = Some(ResultView::from_result(&result));
    template.report_file = report_file;
    Ok(template)
}

/// The page without a result.
async fn page(state: &AppState, user: &UserAccount, transcript: String) -> Result<IndexTemplate> {
    let history = state.db().history();
    let since = Utc::now().date_naive().and_time(NaiveTime::MIN).and_utc();
    let used = history
        .count_for_user_since(user.email.as_str(), since)
        .await?;
    let recent = history
        .recent_for_user(user.email.as_str(), RECENT_LIMIT)
        .await?
        .iter()
        .map(RecentView::from_entry)
        .collect();

    Ok(IndexTemplate {
        user: PageUser::from_account(user),
        usage: Usage {
            used,
            quota: user.tier.info().analyses_per_day,
        },
        transcript,
        notice: None,
        result: None,
        report_file: None,
        recent,
    })
}

// =============================================================================
// View building
// =============================================================================

impl ResultView {
    /// Prepare `result` for display.
    #[must_use]
    pub fn from_result(result: &AnalysisResult) -> Self {
        let mut view = Self {
            tier_name: result.tier().display_name(),
            headline: None,
            verdict: None,
            message: None,
            items: Vec::new(),
            notes: Vec::new(),
            error: None,
        };

        match result.view() {
            Some(analysis) => view.fill(analysis),
            None => {
                let raw = match result {
                    AnalysisResult::Failed { error, .. } => error.clone(),
                    AnalysisResult::Parsed { analysis, .. } => analysis.to_string(),
                };
                view.error = Some(raw);
            }
        }
        view
    }

    fn fill(&mut self, analysis: TierAnalysis) {
        match analysis {
            TierAnalysis::Free(criteria) => {
                self.items = criteria
                    .iter()
                    .map(|(name, criterion)| ResultItem {
                        title: name.to_string(),
                        score: Some(format_score(criterion.score)),
                        badge: None,
                        lines: vec![criterion.recommendation.clone()],
                    })
                    .collect();
            }
            TierAnalysis::Speaker(criteria) => {
                self.items = criteria
                    .iter()
                    .map(|(name, criterion)| ResultItem {
                        title: name.to_string(),
                        score: Some(format_score(criterion.score)),
                        badge: criterion
                            .present
                            .map(|present| if present { "prezent" } else { "absent" }.to_string()),
                        lines: vec![criterion.recommendation.clone()],
                    })
                    .collect();
            }
            TierAnalysis::Coach(plan) => {
                self.headline = Some(format!(
                    "Scor general: {}/10",
                    format_score(plan.overall_score)
                ));
                self.message = Some(plan.summary);
                self.items = plan
                    .coaching_sessions
                    .into_iter()
                    .map(|session| {
                        let mut lines = vec![format!("Exercițiu: {}", session.exercise)];
                        if !session.example_question.is_empty() {
                            lines.push(format!("Întrebare: {}", session.example_question));
                        }
                        if !session.ted_example.is_empty() {
                            lines.push(format!("Exemplu TED: {}", session.ted_example));
                        }
                        ResultItem {
                            title: format!("Ziua {}: {}", session.day, session.principle),
                            score: None,
                            badge: (!session.status.is_empty()).then_some(session.status),
                            lines,
                        }
                    })
                    .collect();
                push_notes(&mut self.notes, "Puncte forte", plan.strengths);
                push_notes(&mut self.notes, "Pașii următori", plan.next_steps);
            }
            TierAnalysis::Curator(feedback) => {
                self.headline = Some(format!(
                    "Scor general: {}/10",
                    format_score(feedback.overall_score)
                ));
                self.verdict = Some(feedback.curator_verdict);
                self.message = Some(feedback.curator_message);
                self.items = feedback
                    .nine_principles_check
                    .iter()
                    .map(|(name, check)| ResultItem {
                        title: name.to_string(),
                        score: Some(format_score(check.score)),
                        badge: None,
                        lines: if check.curator_note.is_empty() {
                            Vec::new()
                        } else {
                            vec![check.curator_note.clone()]
                        },
                    })
                    .collect();

                let mut impressions = Vec::new();
                if !feedback.what_moved_me.is_empty() {
                    impressions.push(format!("M-a impresionat: {}", feedback.what_moved_me));
                }
                if !feedback.what_worries_me.is_empty() {
                    impressions.push(format!("Mă îngrijorează: {}", feedback.what_worries_me));
                }
                push_notes(&mut self.notes, "Impresii", impressions);

                if let Some(readiness) = feedback.stage_readiness {
                    let mut entries = vec![if readiness.ready_to_present {
                        "Pregătit pentru scenă".to_string()
                    } else {
                        format!(
                            "Mai sunt necesare aproximativ {} sesiuni",
                            readiness.estimated_sessions_needed
                        )
                    }];
                    if !readiness.priority_action.is_empty() {
                        entries.push(format!("Prioritate: {}", readiness.priority_action));
                    }
                    push_notes(&mut self.notes, "Pregătire pentru scenă", entries);
                }
            }
        }
    }
}

fn push_notes(notes: &mut Vec<NoteList>, title: &str, entries: Vec<String>) {
    if !entries.is_empty() {
        notes.push(NoteList {
            title: title.to_string(),
            entries,
        });
    }
}

impl RecentView {
    fn from_entry(entry: &HistoryEntry) -> Self {
        let summary = match entry.result.view() {
            Some(TierAnalysis::Coach(plan)) => {
                format!("Scor {}/10", format_score(plan.overall_score))
            }
            Some(TierAnalysis::Curator(feedback)) => feedback.curator_verdict,
            Some(TierAnalysis::Free(criteria) | TierAnalysis::Speaker(criteria)) => {
                format!("{} criterii evaluate", criteria.len())
            }
            None => "Răspuns neinterpretabil".to_string(),
        };

        Self {
            when: entry
                .timestamp
                .with_timezone(&Local)
                .format("%d.%m.%Y %H:%M")
                .to_string(),
            excerpt: preview(&entry.text, RECENT_PREVIEW_CHARS),
            tier_name: entry.result.tier().display_name(),
            summary,
            report_file: entry.report_file.clone(),
        }
    }
}
