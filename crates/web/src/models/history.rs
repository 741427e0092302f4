//! Analysis history entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use speakerlab_core::AnalysisResult;

/// Characters of the transcript kept in history.
pub const TRANSCRIPT_PREVIEW_CHARS: usize = 200;

/// One analysis, as appended to `history.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Entry id. Generated for first-generation entries that had none.
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    /// When the analysis ran.
    #[serde(deserialize_with = "super::timestamp::deserialize")]
    pub timestamp: DateTime<Utc>,
    /// Account that requested it.
    pub email: String,
    /// Transcript preview.
    pub text: String,
    /// Outcome as shown to the user.
    pub result: AnalysisResult,
    /// Scorecard file name inside the report directory, if one was rendered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_file: Option<String>,
}

impl HistoryEntry {
    /// Create an entry for an analysis that just finished.
    #[must_use]
    pub fn new(
        email: &str,
        transcript: &str,
        result: AnalysisResult,
        report_file: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            email: email.to_string(),
            text: preview(transcript, TRANSCRIPT_PREVIEW_CHARS),
            result,
            report_file,
        }
    }
}

/// First `max` characters of `text`, with `...` appended if anything was cut.
#[must_use]
pub fn preview(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
