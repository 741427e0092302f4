//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::Database;
use crate::services::analysis::{Analyzer, ModelNames};
use crate::services::completion::CompletionClient;
use crate::services::report::ReportRenderer;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the stores, the analysis pipeline and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    db: Database,
    analyzer: Analyzer,
    reports: ReportRenderer,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Service configuration
    /// * `db` - Opened data directory
    /// * `client` - Completion backend used by every tier's pipeline
    #[must_use]
    pub fn new(config: AppConfig, db: Database, client: Arc<dyn CompletionClient>) -> Self {
        let models = ModelNames {
            basic: config.openai.basic_model.clone(),
            advanced: config.openai.advanced_model.clone(),
        };
        let analyzer = Analyzer::new(client, models);
        let reports = ReportRenderer::new(config.report_dir());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                db,
                analyzer,
                reports,
            }),
        }
    }

    /// Get a reference to the service configuration.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Get a reference to the flat-file stores.
    #[must_use]
    pub fn db(&self) -> &Database {
        &self.inner.db
    }

    /// Get a reference to the analysis pipeline.
    #[must_use]
    pub fn analyzer(&self) -> &Analyzer {
        &self.inner.analyzer
    }

    /// Get a reference to the scorecard renderer.
    #[must_use]
    pub fn reports(&self) -> &ReportRenderer {
        &self.inner.reports
    }
}
