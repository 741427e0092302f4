//! Subscription tiers.
//!
//! A tier decides which analysis pipeline runs for a user (prompt template,
//! model class, temperature) and what the UI shows. The table is static and
//! never mutated at runtime.

use serde::{Deserialize, Serialize, Serializer};

/// Which provider model a tier's pipeline uses.
///
/// The concrete model names are deployment configuration; tiers only pick
/// the class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelClass {
    /// Cheaper model used by the free tier.
    Basic,
    /// Stronger model used by every paid tier.
    Advanced,
}

/// Static description of a tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierInfo {
    /// Name shown to users.
    pub display_name: &'static str,
    /// Badge color (CSS hex).
    pub color: &'static str,
    /// Daily analysis allowance. Displayed, not enforced.
    pub analyses_per_day: u32,
    /// Model class for the completion call.
    pub model: ModelClass,
    /// Sampling temperature for the completion call.
    pub temperature: f32,
}

/// Subscription tier.
///
/// Serialises as its id (`free`, `speaker`, `coach`, `curator`). Stored values
/// are read leniently through [`Tier::resolve`], which also accepts the legacy
/// ids `paid1`..`paid3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Deserialize)]
#[serde(from = "String")]
pub enum Tier {
    /// Explorer: five basic criteria.
    #[default]
    Free,
    /// Nine-principle analysis.
    Speaker,
    /// Nine-session coaching plan.
    Coach,
    /// Personal curator feedback. Doubles as the admin role.
    Curator,
}

/// Error returned by the strict [`Tier`] parser.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid tier: {0}")]
pub struct UnknownTier(pub String);

impl Tier {
    /// Every tier, lowest first.
    pub const ALL: [Self; 4] = [Self::Free, Self::Speaker, Self::Coach, Self::Curator];

    /// Stable identifier used in storage, forms and URLs.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Speaker => "speaker",
            Self::Coach => "coach",
            Self::Curator => "curator",
        }
    }

    /// Identifier used by the first generation of the user store.
    #[must_use]
    pub const fn legacy_id(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Speaker => "paid1",
            Self::Coach => "paid2",
            Self::Curator => "paid3",
        }
    }

    /// Static table entry for this tier.
    #[must_use]
    pub const fn info(self) -> TierInfo {
        match self {
            Self::Free => TierInfo {
                display_name: "Explorer",
                color: "#6b7280",
                analyses_per_day: 3,
                model: ModelClass::Basic,
                temperature: 0.7,
            },
            Self::Speaker => TierInfo {
                display_name: "Speaker",
                color: "#b45309",
                analyses_per_day: 20,
                model: ModelClass::Advanced,
                temperature: 0.7,
            },
            Self::Coach => TierInfo {
                display_name: "Coach",
                color: "#1d4ed8",
                analyses_per_day: 50,
                model: ModelClass::Advanced,
                temperature: 0.8,
            },
            Self::Curator => TierInfo {
                display_name: "Curator",
                color: "#be123c",
                analyses_per_day: 999,
                model: ModelClass::Advanced,
                temperature: 0.9,
            },
        }
    }

    /// Shorthand for `info().display_name`.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        self.info().display_name
    }

    /// Whether this tier may use the admin panel.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Curator)
    }

    /// Resolve any stored or submitted tier value.
    ///
    /// Unknown values resolve to [`Tier::Free`], the lowest tier. This is the
    /// single place that policy lives; it is logged so bad data is visible.
    #[must_use]
    pub fn resolve(value: &str) -> Self {
        value.parse().unwrap_or_else(|_| {
            tracing::warn!(tier = %value, "unknown tier value, falling back to free");
            Self::Free
        })
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl std::str::FromStr for Tier {
    type Err = UnknownTier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|tier| tier.id() == s || tier.legacy_id() == s)
            .ok_or_else(|| UnknownTier(s.to_owned()))
    }
}

impl From<String> for Tier {
    fn from(value: String) -> Self {
        Self::resolve(&value)
    }
}

impl Serialize for Tier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.id())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_parse_accepts_ids_and_legacy_ids() {
        assert_eq!("free".parse::<Tier>().unwrap(), Tier::Free);
        assert_eq!("speaker".parse::<Tier>().unwrap(), Tier::Speaker);
        assert_eq!("paid2".parse::<Tier>().unwrap(), Tier::Coach);
        assert_eq!("paid3".parse::<Tier>().unwrap(), Tier::Curator);
    }

    #[test]
    fn test_strict_parse_rejects_unknown() {
        let err = "platinum".parse::<Tier>().unwrap_err();
        assert_eq!(err, UnknownTier("platinum".to_string()));
        assert!("".parse::<Tier>().is_err());
    }

    #[test]
    fn test_resolve_falls_back_to_free() {
        assert_eq!(Tier::resolve("platinum"), Tier::Free);
        assert_eq!(Tier::resolve(""), Tier::Free);
        assert_eq!(Tier::resolve("coach"), Tier::Coach);
    }

    #[test]
    fn test_only_curator_is_admin() {
        let admins: Vec<Tier> = Tier::ALL.into_iter().filter(|t| t.is_admin()).collect();
        assert_eq!(admins, vec![Tier::Curator]);
    }

    #[test]
    fn test_tier_table() {
        assert_eq!(Tier::Free.info().model, ModelClass::Basic);
        assert!(
            Tier::ALL[1..]
                .iter()
                .all(|t| t.info().model == ModelClass::Advanced)
        );
        assert!((Tier::Coach.info().temperature - 0.8).abs() < f32::EPSILON);
        assert!((Tier::Curator.info().temperature - 0.9).abs() < f32::EPSILON);
        assert_eq!(Tier::Curator.info().analyses_per_day, 999);
        assert_eq!(Tier::Free.display_name(), "Explorer");
    }

    #[test]
    fn test_serde_uses_ids_and_reads_legacy_values() {
        assert_eq!(serde_json::to_string(&Tier::Coach).unwrap(), "\"coach\"");
        let tier: Tier = serde_json::from_str("\"paid1\"").unwrap();
        assert_eq!(tier, Tier::Speaker);
        let tier: Tier = serde_json::from_str("\"mystery\"").unwrap();
        assert_eq!(tier, Tier::Free);
    }
}
