//! Scorecard downloads.

use axum::{
    extract::{Path, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};

use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::services::report::is_report_file_name;
use crate::state::AppState;

/// Serve a scorecard file as an attachment.
///
/// Only names the renderer could have produced are looked up, only inside the
/// report directory, and only for the account whose history entry references
/// the scorecard (or an admin). Everything else is a 404.
pub async fn download(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(file): Path<String>,
) -> Result<Response> {
    if !is_report_file_name(&file) {
        tracing::warn!(file = %file, "Rejected download name");
        return Err(not_found());
    }

    if !user.is_admin() {
        let pdf_name = file
            .strip_suffix(".png")
            .map_or_else(|| file.clone(), |stem| format!("{stem}.pdf"));
        let owner = state.db().history().find_report_owner(&pdf_name).await?;
        if owner.as_deref() != Some(user.email.as_str()) {
            tracing::warn!(file = %file, email = %user.email, "Download refused");
            return Err(not_found());
        }
    }

    let path = state.reports().dir().join(&file);
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(not_found()),
        Err(e) => return Err(AppError::Internal(format!("reading {}: {e}", path.display()))),
    };

    let content_type = if file.ends_with(".png") {
        "image/png"
    } else {
        "application/pdf"
    };

    Ok((
        [
            (CONTENT_TYPE, content_type.to_string()),
            (CONTENT_DISPOSITION, format!("attachment; filename=\"{file}\"")),
        ],
        bytes,
    )
        .into_response())
}

fn not_found() -> AppError {
    AppError::NotFound("Scorecard not found".to_string())
}
