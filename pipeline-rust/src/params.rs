use crate::{DocumentPipeline, FailurePolicy, HistoryRecorder};
use docgen_renderer::{DocumentRenderer, TemplateCatalog};
use std::sync::Arc;

/// Parameters required to create a new document pipeline.
/// # Default Values
/// - `catalog`: `None`
/// - `history`: `None`
/// - `failure_policy`: `FailurePolicy::ClearPreview`
/// - `url_origin`: `"docgen"`
pub struct PipelineParams {
    /// The renderer that produces the documents.
    pub renderer: Arc<dyn DocumentRenderer>,
    /// Resolves template ids and their required fields. Without a catalog,
    /// requests are sent to the renderer as they are.
    pub catalog: Option<Arc<dyn TemplateCatalog>>,
    /// Receives an entry for every successful generation.
    pub history: Option<Arc<dyn HistoryRecorder>>,
    /// Whether a failed render keeps the previous preview visible.
    pub failure_policy: FailurePolicy,
    /// Origin part of preview URLs (`blob:<origin>/<id>`).
    pub url_origin: String,
}

impl PipelineParams {
    pub fn new(renderer: Arc<dyn DocumentRenderer>) -> Self {
        Self {
            renderer,
            catalog: None,
            history: None,
            failure_policy: FailurePolicy::default(),
            url_origin: "docgen".to_string(),
        }
    }

    /// Set the template catalog
    #[must_use]
    pub fn catalog(mut self, catalog: Arc<dyn TemplateCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Set the history recorder
    #[must_use]
    pub fn history(mut self, history: Arc<dyn HistoryRecorder>) -> Self {
        self.history = Some(history);
        self
    }

    /// Set the failure policy
    #[must_use]
    pub fn failure_policy(mut self, failure_policy: FailurePolicy) -> Self {
        self.failure_policy = failure_policy;
        self
    }

    /// Set the origin of preview URLs
    #[must_use]
    pub fn url_origin(mut self, url_origin: impl Into<String>) -> Self {
        self.url_origin = url_origin.into();
        self
    }

    #[must_use]
    pub fn build(self) -> DocumentPipeline {
        DocumentPipeline::new(self)
    }
}
