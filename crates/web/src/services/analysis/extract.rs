//! Turning a model reply into an [`AnalysisResult`].
//!
//! The reply may wrap its JSON in a Markdown code fence. After unwrapping, the
//! text must parse as JSON and match the tier's schema; otherwise the result
//! carries the attempted text as its error. Nothing here fails.

use serde_json::Value;

use speakerlab_core::{AnalysisResult, Tier, TierAnalysis};

const FENCE: &str = "```";

/// Text between the first pair of code fences, minus a language tag.
///
/// Without a fence the whole reply is returned. Surrounding whitespace is
/// trimmed either way.
#[must_use]
pub fn strip_fences(raw: &str) -> &str {
    let Some((_, after_open)) = raw.split_once(FENCE) else {
        return raw.trim();
    };
    let inner = after_open
        .split_once(FENCE)
        .map_or(after_open, |(inner, _)| inner);

    drop_language_tag(inner).trim()
}

/// Drop `json`, `JSON`, `json5`... from the start of a fenced block.
fn drop_language_tag(block: &str) -> &str {
    if let Some((first_line, rest)) = block.split_once('\n') {
        let tag = first_line.trim();
        if !tag.is_empty()
            && tag
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return rest;
        }
    }
    block.strip_prefix("json").unwrap_or(block)
}

/// Parse and validate a model reply for `tier`.
#[must_use]
pub fn extract(tier: Tier, raw: &str) -> AnalysisResult {
    let candidate = strip_fences(raw);

    let analysis: Value = match serde_json::from_str(candidate) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(tier = %tier, error = %e, "Model reply is not valid JSON");
            return failed(tier, candidate);
        }
    };

    if let Err(e) = TierAnalysis::from_value(tier, &analysis) {
        tracing::warn!(tier = %tier, error = %e, "Model reply does not match schema");
        return failed(tier, candidate);
    }

    AnalysisResult::Parsed { tier, analysis }
}

fn failed(tier: Tier, text: &str) -> AnalysisResult {
    AnalysisResult::Failed {
        tier,
        error: text.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    const IDEA: &str = r#"{"Idea Strength":{"score":8,"recommendation":"x"}}"#;

    #[test]
    fn test_plain_json_is_kept_verbatim() {
        let result = extract(Tier::Free, IDEA);
        assert_eq!(
            result,
            AnalysisResult::Parsed {
                tier: Tier::Free,
                analysis: json!({"Idea Strength": {"score": 8, "recommendation": "x"}}),
            }
        );
    }

    #[test]
    fn test_fenced_json_equals_unwrapped() {
        let fenced = format!("Iată analiza:\n```json\n{IDEA}\n```\nSucces!");
        assert_eq!(extract(Tier::Free, &fenced), extract(Tier::Free, IDEA));

        let bare_fence = format!("```\n{IDEA}\n```");
        assert_eq!(extract(Tier::Free, &bare_fence), extract(Tier::Free, IDEA));

        let same_line_tag = format!("```json{IDEA}```");
        assert_eq!(extract(Tier::Free, &same_line_tag), extract(Tier::Free, IDEA));
    }

    #[test]
    fn test_not_json_is_recovered() {
        let result = extract(Tier::Coach, "not json");
        assert_eq!(
            result,
            AnalysisResult::Failed {
                tier: Tier::Coach,
                error: "not json".to_string(),
            }
        );
    }

    #[test]
    fn test_fenced_garbage_reports_inner_text() {
        let result = extract(Tier::Speaker, "```json\n{\"Pasiunea\": \n```");
        assert_eq!(result.error(), Some("{\"Pasiunea\":"));
    }

    #[test]
    fn test_unclosed_fence_uses_rest() {
        assert_eq!(strip_fences("```json\n{\"a\": 1}"), "{\"a\": 1}");
    }

    #[test]
    fn test_wrong_shape_is_recovered() {
        // Valid JSON, but the coach schema needs a coaching plan.
        let result = extract(Tier::Coach, IDEA);
        assert_eq!(result.error(), Some(IDEA));
        assert_eq!(result.tier(), Tier::Coach);

        let result = extract(Tier::Free, "[1, 2, 3]");
        assert_eq!(result.error(), Some("[1, 2, 3]"));

        let result = extract(Tier::Free, "{}");
        assert_eq!(result.error(), Some("{}"));
    }

    #[test]
    fn test_curator_reply() {
        let reply = json!({
            "curator_message": "Ai ceva de spus.",
            "overall_score": 8,
            "curator_verdict": "Aproape gata",
            "what_moved_me": "Povestea bunicii.",
            "what_worries_me": "Finalul.",
            "nine_principles_check": {"Pasiunea": {"score": 8, "curator_note": "da"}},
            "stage_readiness": {"ready_to_present": false, "estimated_sessions_needed": 2, "priority_action": "Finalul"}
        })
        .to_string();
        let result = extract(Tier::Curator, &reply);
        assert!(result.analysis().is_some());
        assert!(result.view().is_some());
    }
}
