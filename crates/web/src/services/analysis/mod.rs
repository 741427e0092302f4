//! Tiered transcript analysis.
//!
//! One pipeline per tier: build the tier's prompt, call the completion provider
//! with the tier's model and temperature, extract the reply. The outcome has
//! three cases:
//!
//! - `Ok(AnalysisResult::Parsed { .. })` - usable analysis
//! - `Ok(AnalysisResult::Failed { .. })` - the model answered with something unusable
//! - `Err(CompletionError)` - the provider call itself failed
//!
//! Each call is made exactly once.

pub mod catalogue;
pub mod extract;
pub mod prompt;

use std::sync::Arc;

use tracing::instrument;

use speakerlab_core::{AnalysisResult, ModelClass, Tier};

use crate::services::completion::{CompletionClient, CompletionError, CompletionRequest};

/// Provider model names for each model class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelNames {
    pub basic: String,
    pub advanced: String,
}

impl ModelNames {
    #[must_use]
    pub fn for_class(&self, class: ModelClass) -> &str {
        match class {
            ModelClass::Basic => &self.basic,
            ModelClass::Advanced => &self.advanced,
        }
    }
}

/// Dispatches transcripts to their tier's pipeline.
#[derive(Clone)]
pub struct Analyzer {
    client: Arc<dyn CompletionClient>,
    models: ModelNames,
}

impl Analyzer {
    /// Create an analyzer over a completion backend.
    #[must_use]
    pub fn new(client: Arc<dyn CompletionClient>, models: ModelNames) -> Self {
        Self { client, models }
    }

    /// The completion call `tier`'s pipeline makes for `transcript`.
    #[must_use]
    pub fn request_for(&self, tier: Tier, transcript: &str) -> CompletionRequest {
        let info = tier.info();
        CompletionRequest {
            model: self.models.for_class(info.model).to_string(),
            temperature: info.temperature,
            prompt: prompt::build(tier, transcript),
        }
    }

    /// Run `tier`'s pipeline.
    ///
    /// # Errors
    ///
    /// Returns `CompletionError` only when the provider call fails. Unusable
    /// replies are returned as `AnalysisResult::Failed`.
    #[instrument(skip(self, transcript), fields(tier = %tier, chars = transcript.chars().count()))]
    pub async fn analyze(
        &self,
        tier: Tier,
        transcript: &str,
    ) -> Result<AnalysisResult, CompletionError> {
        let request = self.request_for(tier, transcript);
        let reply = self.client.complete(&request).await?;
        let result = extract::extract(tier, &reply);

        if result.analysis().is_some() {
            tracing::info!("Analysis parsed");
        } else {
            tracing::warn!("Analysis reply unusable, returning raw text");
        }
        Ok(result)
    }
}
