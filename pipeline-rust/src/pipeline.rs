use crate::{
    FailurePolicy, HistoryRecorder, ObjectUrlStore, PipelineError, PipelineParams, PreviewSession,
};
use docgen_renderer::{DocumentRenderer, Template, TemplateCatalog};
use std::sync::Arc;

/// Shared configuration of the preview dialogs of an application. Each
/// dialog mounts its own [`PreviewSession`]; all sessions publish their
/// previews to the same [`ObjectUrlStore`].
pub struct DocumentPipeline {
    renderer: Arc<dyn DocumentRenderer>,
    catalog: Option<Arc<dyn TemplateCatalog>>,
    history: Option<Arc<dyn HistoryRecorder>>,
    failure_policy: FailurePolicy,
    store: ObjectUrlStore,
}

impl DocumentPipeline {
    #[must_use]
    pub fn new(params: PipelineParams) -> Self {
        Self {
            renderer: params.renderer,
            catalog: params.catalog,
            history: params.history,
            failure_policy: params.failure_policy,
            store: ObjectUrlStore::new(params.url_origin),
        }
    }

    pub fn builder(renderer: Arc<dyn DocumentRenderer>) -> PipelineParams {
        PipelineParams::new(renderer)
    }

    /// Create the state of a newly opened preview dialog.
    #[must_use]
    pub fn mount(&self) -> PreviewSession {
        PreviewSession::new(
            self.renderer.clone(),
            self.catalog.clone(),
            self.history.clone(),
            self.store.clone(),
            self.failure_policy,
        )
    }

    /// The URL table viewers resolve preview handles against.
    pub fn store(&self) -> &ObjectUrlStore {
        &self.store
    }

    /// Templates offered for selection, empty without a catalog.
    pub async fn templates(&self) -> Result<Vec<Template>, PipelineError> {
        match &self.catalog {
            Some(catalog) => Ok(catalog.list().await?),
            None => Ok(Vec::new()),
        }
    }
}
