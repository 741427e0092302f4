//! Score mappings for charts.
//!
//! Each tier's analysis carries its scores in a different place. A
//! [`ScoreMap`] flattens them into `label -> score` pairs in document order.
//! Extraction reads the raw JSON, so it works on stored results whether or
//! not they still match their schema, and it never invents values: entries
//! without a numeric score are skipped.

use serde_json::Value;

use super::analysis::AnalysisResult;
use super::tier::Tier;

/// Coaching sessions have no per-principle score; each principle in the plan
/// is plotted at this value.
pub const COACHING_AXIS_SCORE: f64 = 7.0;

/// Ordered `label -> score` pairs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScoreMap(Vec<(String, f64)>);

impl ScoreMap {
    /// Derive the score mapping for a stored result.
    ///
    /// Failed results have no scores.
    #[must_use]
    pub fn from_result(result: &AnalysisResult) -> Self {
        result
            .analysis()
            .map_or_else(Self::default, |analysis| {
                Self::from_analysis(result.tier(), analysis)
            })
    }

    /// Derive the score mapping from a raw analysis object.
    #[must_use]
    pub fn from_analysis(tier: Tier, analysis: &Value) -> Self {
        let pairs = match tier {
            Tier::Free | Tier::Speaker => scored_entries(Some(analysis)),
            Tier::Coach => coaching_principles(analysis),
            Tier::Curator => scored_entries(analysis.get("nine_principles_check")),
        };
        Self(pairs)
    }

    /// Iterate over `(label, score)` in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(label, score)| (label.as_str(), *score))
    }

    /// Labels in order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(label, _)| label.as_str())
    }

    /// Number of axes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there is nothing to plot.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Render a score without a trailing `.0`: `8`, `6.5`.
#[must_use]
pub fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{score:.0}")
    } else {
        format!("{score:.1}")
    }
}

/// `name -> {score: n, ..}` entries of an object, skipping unscored ones.
fn scored_entries(object: Option<&Value>) -> Vec<(String, f64)> {
    let Some(Value::Object(map)) = object else {
        return Vec::new();
    };

    map.iter()
        .filter_map(|(name, entry)| {
            let score = entry.get("score")?.as_f64()?;
            Some((name.clone(), score))
        })
        .collect()
}

/// One axis per distinct principle in the coaching plan.
fn coaching_principles(analysis: &Value) -> Vec<(String, f64)> {
    let Some(Value::Array(sessions)) = analysis.get("coaching_sessions") else {
        return Vec::new();
    };

    let mut pairs: Vec<(String, f64)> = Vec::new();
    for principle in sessions
        .iter()
        .filter_map(|session| session.get("principle")?.as_str())
    {
        if !pairs.iter().any(|(label, _)| label == principle) {
            pairs.push((principle.to_owned(), COACHING_AXIS_SCORE));
        }
    }
    pairs
}
