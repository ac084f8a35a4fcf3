use crate::{
    opentelemetry::{trace_generation, GenerationSpanMethod},
    FailurePolicy, GenerationOutcome, GenerationPhase, GenerationState, HistoryEntry,
    HistoryFilter, HistoryRecorder, ObjectUrlStore, PipelineError, PreviewHandle,
    PreviewViewState,
};
use docgen_renderer::{
    prepare_request, Artifact, DocumentRenderer, GenerationRequest, RenderContext, RenderError,
    RenderResult, Template, TemplateCatalog,
};
use futures::lock::Mutex;
use std::sync::Arc;
use tracing::{debug, warn};

/// The pipeline state of one open preview dialog.
///
/// The session is created when the dialog mounts and owns one
/// [`GenerationState`] and one [`PreviewViewState`]. Renders run without
/// holding the state lock, so the dialog can be cleaned up while a render is
/// in flight; the late result is then dropped without creating a handle.
/// Dropping the session (or calling [`PreviewSession::finish`]) releases the
/// live preview handle.
pub struct PreviewSession {
    renderer: Arc<dyn DocumentRenderer>,
    catalog: Option<Arc<dyn TemplateCatalog>>,
    history: Option<Arc<dyn HistoryRecorder>>,
    store: ObjectUrlStore,
    state: Mutex<SessionState>,
}

struct SessionState {
    generation: GenerationState,
    view: PreviewViewState,
}

struct Rendered {
    template: Option<Template>,
    request: GenerationRequest,
    artifact: Artifact,
}

impl PreviewSession {
    pub(crate) fn new(
        renderer: Arc<dyn DocumentRenderer>,
        catalog: Option<Arc<dyn TemplateCatalog>>,
        history: Option<Arc<dyn HistoryRecorder>>,
        store: ObjectUrlStore,
        failure_policy: FailurePolicy,
    ) -> Self {
        Self {
            renderer,
            catalog,
            history,
            store: store.clone(),
            state: Mutex::new(SessionState {
                generation: GenerationState::new(store, failure_policy),
                view: PreviewViewState::new(),
            }),
        }
    }

    pub async fn select_template(&self, template_id: &str) -> Result<(), PipelineError> {
        let mut state = self.state.lock().await;
        state.generation.select_template(template_id)?;
        debug!(template_id, "template selected");
        Ok(())
    }

    /// Render the selected template with `context`.
    pub async fn generate(
        &self,
        context: RenderContext,
    ) -> Result<GenerationOutcome, PipelineError> {
        let template_id = self
            .state
            .lock()
            .await
            .generation
            .selected_template_id()
            .map(ToString::to_string)
            .ok_or(PipelineError::NoTemplateSelected)?;

        self.dispatch(
            GenerationRequest::new(template_id, context),
            GenerationSpanMethod::Generate,
        )
        .await
    }

    /// Send the last request again, unchanged.
    pub async fn retry(&self) -> Result<GenerationOutcome, PipelineError> {
        let request = self.state.lock().await.generation.retry_request()?;
        self.dispatch(request, GenerationSpanMethod::Retry).await
    }

    /// Release the preview handle and return to `Idle`. Renders still in
    /// flight are discarded when they complete.
    pub async fn cleanup(&self) {
        let mut state = self.state.lock().await;
        state.generation.cleanup();
        state.view = PreviewViewState::new();
        debug!("preview session cleaned up");
    }

    pub async fn report_load_failure(&self) {
        let mut state = self.state.lock().await;
        state.view.report_load_failure();
        warn!(
            url = state.generation.handle().map(|handle| handle.url.as_str()),
            "preview could not be displayed"
        );
    }

    /// Clear the display failure without rendering again.
    pub async fn retry_load(&self) {
        self.state.lock().await.view.retry_load();
    }

    pub async fn begin_edit(&self, initial_content: impl Into<String>) {
        self.state.lock().await.view.begin_edit(initial_content);
    }

    /// Leave edit mode and render a new document from `content`. The new
    /// request keeps the context of the last one, with its content field
    /// replaced.
    pub async fn save_edit(
        &self,
        content: impl Into<String>,
    ) -> Result<GenerationOutcome, PipelineError> {
        let request = {
            let mut state = self.state.lock().await;
            let base = match state.generation.last_request() {
                Some(request) => request.clone(),
                None => GenerationRequest::new(
                    state
                        .generation
                        .selected_template_id()
                        .ok_or(PipelineError::NoTemplateSelected)?,
                    RenderContext::new(),
                ),
            };
            let content = state.view.save_edit(content);
            base.with_content(content)
        };

        self.dispatch(request, GenerationSpanMethod::SaveEdit).await
    }

    pub async fn cancel_edit(&self) {
        self.state.lock().await.view.cancel_edit();
    }

    pub async fn phase(&self) -> GenerationPhase {
        self.state.lock().await.generation.phase()
    }

    pub async fn is_generating(&self) -> bool {
        self.state.lock().await.generation.is_generating()
    }

    pub async fn selected_template_id(&self) -> Option<String> {
        self.state
            .lock()
            .await
            .generation
            .selected_template_id()
            .map(ToString::to_string)
    }

    pub async fn handle(&self) -> Option<PreviewHandle> {
        self.state.lock().await.generation.handle().cloned()
    }

    pub async fn last_error(&self) -> Option<Arc<RenderError>> {
        self.state.lock().await.generation.last_error().cloned()
    }

    /// Textual source of the last dispatched request, the natural starting
    /// point of an edit.
    pub async fn current_content(&self) -> Option<String> {
        self.state
            .lock()
            .await
            .generation
            .last_request()
            .map(GenerationRequest::content_text)
    }

    pub async fn load_error(&self) -> bool {
        self.state.lock().await.view.load_error
    }

    pub async fn view(&self) -> PreviewViewState {
        self.state.lock().await.view.clone()
    }

    /// Dereference a preview URL, `None` once it was revoked.
    pub fn resolve(&self, url: &str) -> Option<Arc<Artifact>> {
        self.store.resolve(url)
    }

    pub async fn history(
        &self,
        filter: &HistoryFilter,
    ) -> Result<Vec<HistoryEntry>, PipelineError> {
        match &self.history {
            Some(history) => history.list(filter).await.map_err(PipelineError::History),
            None => Ok(Vec::new()),
        }
    }

    /// Tear the session down, releasing the preview handle.
    pub fn finish(self) {
        let mut state = self.state.into_inner();
        state.generation.cleanup();
    }

    async fn dispatch(
        &self,
        request: GenerationRequest,
        method: GenerationSpanMethod,
    ) -> Result<GenerationOutcome, PipelineError> {
        let template_id = request.template_id.clone();
        trace_generation(&template_id, method, self.run_generation(request)).await
    }

    async fn run_generation(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationOutcome, PipelineError> {
        let ticket = self.state.lock().await.generation.begin(request.clone())?;
        debug!(
            template_id = %request.template_id,
            seq = ticket.seq(),
            "generation dispatched"
        );

        let result = self.render(request).await;

        let (outcome, entry) = {
            let mut state = self.state.lock().await;
            match result {
                Ok(Rendered {
                    template,
                    request,
                    artifact,
                }) => {
                    let file_url = artifact.file_url.clone();
                    let outcome = state.generation.complete(ticket, Ok(artifact));
                    let entry = if let GenerationOutcome::Ready(_) = outcome {
                        state.view.reset_on_new_handle();
                        Some(history_entry(template.as_ref(), &request).with_file_url(file_url))
                    } else {
                        None
                    };
                    (outcome, entry)
                }
                Err(error) => (state.generation.complete(ticket, Err(error)), None),
            }
        };

        match &outcome {
            GenerationOutcome::Ready(handle) => {
                debug!(seq = ticket.seq(), url = %handle.url, "generation ready");
            }
            GenerationOutcome::Failed(error) => {
                warn!(seq = ticket.seq(), error = %error, "generation failed");
            }
            GenerationOutcome::Discarded(reason) => {
                debug!(seq = ticket.seq(), reason = ?reason, "generation result discarded");
            }
        }

        if let Some(entry) = entry {
            self.record(entry).await;
        }

        Ok(outcome)
    }

    async fn render(&self, request: GenerationRequest) -> RenderResult<Rendered> {
        let (template, request) = match &self.catalog {
            Some(catalog) => {
                let (template, request) = prepare_request(catalog.as_ref(), request).await?;
                (Some(template), request)
            }
            None => (None, request),
        };

        let artifact = self.renderer.render(request.clone()).await?;
        Ok(Rendered {
            template,
            request,
            artifact,
        })
    }

    async fn record(&self, entry: HistoryEntry) {
        let Some(history) = &self.history else {
            return;
        };
        if let Err(error) = history.append(entry).await {
            warn!(error = %error, "failed to record generated document");
        }
    }
}

fn history_entry(template: Option<&Template>, request: &GenerationRequest) -> HistoryEntry {
    let (name, category) = template.map_or_else(
        || (request.template_id.clone(), String::new()),
        |template| (template.label.clone(), template.category.clone()),
    );
    HistoryEntry::new(
        name,
        category,
        request.template_id.clone(),
        request.content_text(),
    )
}
