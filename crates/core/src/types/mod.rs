//! Core types for Speaker Lab.
//!
//! This module provides type-safe wrappers for the domain concepts shared
//! between the web service and the CLI.

pub mod analysis;
pub mod email;
pub mod scores;
pub mod tier;

pub use analysis::{
    AnalysisResult, CoachingPlan, CoachingSession, CriteriaAnalysis, Criterion, CuratorFeedback,
    NamedEntries, PrincipleCheck, SchemaError, StageReadiness, TierAnalysis,
};
pub use email::{Email, EmailError};
pub use scores::{COACHING_AXIS_SCORE, ScoreMap, format_score};
pub use tier::{ModelClass, Tier, TierInfo, UnknownTier};
