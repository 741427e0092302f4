//! Analysis results and the per-tier analysis schemas.
//!
//! The completion provider answers with free-form JSON. [`AnalysisResult`] is
//! what gets stored and shown: either the parsed JSON (kept verbatim, key order
//! preserved) or the raw text that could not be used. [`TierAnalysis`] is the
//! typed view of a parsed analysis; building it is the schema check.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::tier::Tier;

/// Outcome of one analysis, as persisted in history.
///
/// Serialises as `{"tier": .., "analysis": {..}}` or `{"tier": .., "error": ".."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisResult {
    /// The provider returned JSON matching the tier's schema.
    Parsed {
        /// Tier whose pipeline produced this result.
        tier: Tier,
        /// The parsed JSON, verbatim.
        analysis: Value,
    },
    /// The provider returned text that was not usable JSON.
    Failed {
        /// Tier whose pipeline produced this result.
        tier: Tier,
        /// The text that failed to parse or validate.
        error: String,
    },
}

impl AnalysisResult {
    /// Tier whose pipeline produced this result.
    #[must_use]
    pub const fn tier(&self) -> Tier {
        match self {
            Self::Parsed { tier, .. } | Self::Failed { tier, .. } => *tier,
        }
    }

    /// The parsed analysis, if any.
    #[must_use]
    pub const fn analysis(&self) -> Option<&Value> {
        match self {
            Self::Parsed { analysis, .. } => Some(analysis),
            Self::Failed { .. } => None,
        }
    }

    /// The unusable text, if parsing failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Parsed { .. } => None,
            Self::Failed { error, .. } => Some(error),
        }
    }

    /// Typed view of the analysis.
    ///
    /// Returns `None` for failed results and for stored analyses that no
    /// longer match their tier's schema.
    #[must_use]
    pub fn view(&self) -> Option<TierAnalysis> {
        match self {
            Self::Parsed { tier, analysis } => TierAnalysis::from_value(*tier, analysis).ok(),
            Self::Failed { .. } => None,
        }
    }
}

/// Raised when parsed JSON does not have the shape a tier's prompt asked for.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// A required field is missing or has the wrong type.
    #[error("analysis does not match the {tier} schema: {source}")]
    Shape {
        /// Tier whose schema was checked.
        tier: Tier,
        /// Underlying deserialisation error.
        #[source]
        source: serde_json::Error,
    },
    /// The analysis parsed but contains nothing to show.
    #[error("{tier} analysis has no entries")]
    Empty {
        /// Tier whose schema was checked.
        tier: Tier,
    },
}

/// Typed view of a parsed analysis, one variant per tier.
#[derive(Debug, Clone, PartialEq)]
pub enum TierAnalysis {
    /// Five basic criteria.
    Free(CriteriaAnalysis),
    /// Nine principles with presence flags.
    Speaker(CriteriaAnalysis),
    /// Nine-session coaching plan.
    Coach(CoachingPlan),
    /// Personal curator feedback.
    Curator(CuratorFeedback),
}

impl TierAnalysis {
    /// Check `value` against the schema `tier`'s prompt declares.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Shape`] if a required field is missing or
    /// mistyped, and [`SchemaError::Empty`] if there is nothing to display.
    pub fn from_value(tier: Tier, value: &Value) -> Result<Self, SchemaError> {
        let shape = |source| SchemaError::Shape { tier, source };

        let view = match tier {
            Tier::Free => Self::Free(CriteriaAnalysis::deserialize(value).map_err(shape)?),
            Tier::Speaker => Self::Speaker(CriteriaAnalysis::deserialize(value).map_err(shape)?),
            Tier::Coach => Self::Coach(CoachingPlan::deserialize(value).map_err(shape)?),
            Tier::Curator => Self::Curator(CuratorFeedback::deserialize(value).map_err(shape)?),
        };

        let empty = match &view {
            Self::Free(criteria) | Self::Speaker(criteria) => criteria.is_empty(),
            Self::Coach(plan) => plan.coaching_sessions.is_empty(),
            Self::Curator(feedback) => feedback.nine_principles_check.is_empty(),
        };
        if empty {
            return Err(SchemaError::Empty { tier });
        }

        Ok(view)
    }
}

// =============================================================================
// Ordered maps
// =============================================================================

/// A JSON object read as an ordered list of `(name, value)` pairs.
///
/// Criteria and principles are keyed by display name; the order the model
/// wrote them in is the order they are shown.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedEntries<T>(pub Vec<(String, T)>);

impl<T> NamedEntries<T> {
    /// Iterate over `(name, value)` pairs in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T> Default for NamedEntries<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for NamedEntries<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for EntriesVisitor<T> {
            type Value = NamedEntries<T>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object of named entries")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, value)) = map.next_entry::<String, T>()? {
                    entries.push((name, value));
                }
                Ok(NamedEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

impl<T: Serialize> Serialize for NamedEntries<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

// =============================================================================
// Per-tier shapes
// =============================================================================

/// One scored criterion (free) or principle (speaker).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    pub score: f64,
    pub recommendation: String,
    /// Only the speaker tier asks for this.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub present: Option<bool>,
}

/// Free and speaker tier analysis: criterion name to assessment.
pub type CriteriaAnalysis = NamedEntries<Criterion>;

/// Coach tier analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachingPlan {
    pub overall_score: f64,
    pub summary: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    pub coaching_sessions: Vec<CoachingSession>,
    #[serde(default)]
    pub next_steps: Vec<String>,
}

/// One day of the coaching plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachingSession {
    pub day: u32,
    pub principle: String,
    /// `present`, `partial` or `missing` as the model sees it.
    #[serde(default)]
    pub status: String,
    pub exercise: String,
    #[serde(default)]
    pub example_question: String,
    #[serde(default)]
    pub ted_example: String,
}

/// Curator tier analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CuratorFeedback {
    pub curator_message: String,
    pub overall_score: f64,
    pub curator_verdict: String,
    #[serde(default)]
    pub what_moved_me: String,
    #[serde(default)]
    pub what_worries_me: String,
    pub nine_principles_check: NamedEntries<PrincipleCheck>,
    #[serde(default)]
    pub stage_readiness: Option<StageReadiness>,
}

/// Curator's short note on one principle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrincipleCheck {
    pub score: f64,
    #[serde(default)]
    pub curator_note: String,
}

/// Curator's call on whether the talk is ready.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StageReadiness {
    #[serde(default)]
    pub ready_to_present: bool,
    #[serde(default)]
    pub estimated_sessions_needed: u32,
    #[serde(default)]
    pub priority_action: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_result_serialises_in_stored_shape() {
        let parsed = AnalysisResult::Parsed {
            tier: Tier::Free,
            analysis: json!({"Idea Strength": {"score": 8, "recommendation": "x"}}),
        };
        assert_eq!(
            serde_json::to_value(&parsed).unwrap(),
            json!({"tier": "free", "analysis": {"Idea Strength": {"score": 8, "recommendation": "x"}}})
        );

        let failed = AnalysisResult::Failed {
            tier: Tier::Coach,
            error: "not json".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            json!({"tier": "coach", "error": "not json"})
        );
    }

    #[test]
    fn test_result_reads_legacy_history_entries() {
        let stored = r#"{"tier": "paid3", "error": "oops"}"#;
        let result: AnalysisResult = serde_json::from_str(stored).unwrap();
        assert_eq!(result.tier(), Tier::Curator);
        assert_eq!(result.error(), Some("oops"));
        assert!(result.analysis().is_none());
        assert!(result.view().is_none());
    }

    #[test]
    fn test_named_entries_keep_document_order() {
        let value: Value = serde_json::from_str(
            r#"{"Zeta": {"score": 1, "recommendation": "a"},
                "Alpha": {"score": 2, "recommendation": "b"}}"#,
        )
        .unwrap();
        let criteria = CriteriaAnalysis::deserialize(&value).unwrap();
        let names: Vec<&str> = criteria.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["Zeta", "Alpha"]);
    }

    #[test]
    fn test_free_schema_accepts_partial_criteria() {
        let value = json!({"Idea Strength": {"score": 8, "recommendation": "x"}});
        let view = TierAnalysis::from_value(Tier::Free, &value).unwrap();
        let TierAnalysis::Free(criteria) = view else {
            panic!("expected free view");
        };
        assert_eq!(criteria.len(), 1);
        assert!((criteria.0[0].1.score - 8.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_speaker_schema_reads_presence() {
        let value = json!({
            "Pasiunea": {"score": 7, "present": true, "recommendation": "ok"},
            "Umor": {"score": 3, "present": false, "recommendation": "more"}
        });
        let TierAnalysis::Speaker(criteria) =
            TierAnalysis::from_value(Tier::Speaker, &value).unwrap()
        else {
            panic!("expected speaker view");
        };
        assert_eq!(criteria.0[0].1.present, Some(true));
        assert_eq!(criteria.0[1].1.present, Some(false));
    }

    #[test]
    fn test_wrong_shape_is_a_schema_error() {
        let value = json!({"Idea Strength": "great"});
        assert!(matches!(
            TierAnalysis::from_value(Tier::Free, &value),
            Err(SchemaError::Shape { tier: Tier::Free, .. })
        ));

        let value = json!([1, 2, 3]);
        assert!(TierAnalysis::from_value(Tier::Speaker, &value).is_err());
    }

    #[test]
    fn test_empty_object_is_rejected() {
        assert!(matches!(
            TierAnalysis::from_value(Tier::Free, &json!({})),
            Err(SchemaError::Empty { tier: Tier::Free })
        ));
    }

    #[test]
    fn test_coach_schema() {
        let value = json!({
            "overall_score": 7,
            "summary": "Bun inceput",
            "coaching_sessions": [
                {"day": 1, "principle": "Pasiunea", "status": "present", "exercise": "Scrie"}
            ]
        });
        let TierAnalysis::Coach(plan) = TierAnalysis::from_value(Tier::Coach, &value).unwrap()
        else {
            panic!("expected coach view");
        };
        assert_eq!(plan.coaching_sessions[0].principle, "Pasiunea");
        assert!(plan.strengths.is_empty());
        assert!(plan.coaching_sessions[0].ted_example.is_empty());

        let missing_sessions = json!({"overall_score": 7, "summary": "x"});
        assert!(TierAnalysis::from_value(Tier::Coach, &missing_sessions).is_err());
    }

    #[test]
    fn test_curator_schema() {
        let value = json!({
            "curator_message": "Salut",
            "overall_score": 8,
            "curator_verdict": "Aproape gata",
            "nine_principles_check": {
                "Pasiunea": {"score": 8, "curator_note": "foarte bine"},
                "Umor": {"score": 4}
            },
            "stage_readiness": {"ready_to_present": false, "estimated_sessions_needed": 3, "priority_action": "Repeta"}
        });
        let TierAnalysis::Curator(feedback) =
            TierAnalysis::from_value(Tier::Curator, &value).unwrap()
        else {
            panic!("expected curator view");
        };
        assert_eq!(feedback.nine_principles_check.len(), 2);
        assert_eq!(feedback.stage_readiness.unwrap().estimated_sessions_needed, 3);
        assert!(feedback.what_moved_me.is_empty());
    }
}
