use crate::{ObjectUrlStore, PipelineError, PreviewHandle, PreviewResourceManager};
use docgen_renderer::{Artifact, GenerationRequest, RenderError, RenderResult};
use std::{fmt, sync::Arc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationPhase {
    /// No template selected.
    Idle,
    /// A template is chosen but nothing was rendered for it yet.
    TemplateSelected,
    /// A render is in flight.
    Generating,
    /// The latest render succeeded and its handle is live.
    Ready,
    /// The latest render failed.
    Error,
}

impl GenerationPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::TemplateSelected => "template_selected",
            Self::Generating => "generating",
            Self::Ready => "ready",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for GenerationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happens to the last good preview when a later render fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Revoke the previous handle so that only the error is shown.
    #[default]
    ClearPreview,
    /// Keep the previous handle visible next to the error.
    KeepLastGood,
}

/// Identifies one dispatched render. Results are only applied if the ticket
/// is still the latest dispatch of the same lifetime of the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationTicket {
    epoch: u64,
    seq: u64,
}

impl GenerationTicket {
    pub fn seq(self) -> u64 {
        self.seq
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    /// `cleanup` ran while the render was in flight.
    TornDown,
    /// A newer render was dispatched after this one.
    Superseded,
}

#[derive(Debug, Clone)]
pub enum GenerationOutcome {
    Ready(PreviewHandle),
    Failed(Arc<RenderError>),
    /// The result arrived too late and was dropped without creating a handle.
    Discarded(DiscardReason),
}

impl GenerationOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ready(_) => "ready",
            Self::Failed(_) => "failed",
            Self::Discarded(DiscardReason::TornDown) => "discarded_torn_down",
            Self::Discarded(DiscardReason::Superseded) => "discarded_superseded",
        }
    }

    pub fn handle(&self) -> Option<&PreviewHandle> {
        match self {
            Self::Ready(handle) => Some(handle),
            _ => None,
        }
    }
}

/// Lifecycle of the generation attempts of one preview dialog.
pub struct GenerationState {
    selected_template_id: Option<String>,
    phase: GenerationPhase,
    failure_policy: FailurePolicy,
    /// Advanced by `cleanup`, invalidates every ticket handed out before.
    epoch: u64,
    next_seq: u64,
    /// Sequence number of the dispatch whose result is still awaited.
    pending: Option<u64>,
    last_request: Option<GenerationRequest>,
    last_error: Option<Arc<RenderError>>,
    resources: PreviewResourceManager,
}

impl GenerationState {
    #[must_use]
    pub fn new(store: ObjectUrlStore, failure_policy: FailurePolicy) -> Self {
        Self {
            selected_template_id: None,
            phase: GenerationPhase::Idle,
            failure_policy,
            epoch: 0,
            next_seq: 0,
            pending: None,
            last_request: None,
            last_error: None,
            resources: PreviewResourceManager::new(store),
        }
    }

    pub fn phase(&self) -> GenerationPhase {
        self.phase
    }

    pub fn selected_template_id(&self) -> Option<&str> {
        self.selected_template_id.as_deref()
    }

    pub fn is_generating(&self) -> bool {
        self.pending.is_some()
    }

    pub fn handle(&self) -> Option<&PreviewHandle> {
        self.resources.current()
    }

    pub fn last_request(&self) -> Option<&GenerationRequest> {
        self.last_request.as_ref()
    }

    pub fn last_error(&self) -> Option<&Arc<RenderError>> {
        self.last_error.as_ref()
    }

    /// Choose the template to generate. Any live handle is revoked since it
    /// belongs to the previous choice.
    pub fn select_template(&mut self, template_id: impl Into<String>) -> Result<(), PipelineError> {
        if self.phase == GenerationPhase::Generating {
            return Err(PipelineError::InvalidTransition {
                phase: self.phase,
                operation: "select a template",
            });
        }

        self.resources.revoke();
        self.selected_template_id = Some(template_id.into());
        self.last_request = None;
        self.last_error = None;
        self.phase = GenerationPhase::TemplateSelected;
        Ok(())
    }

    /// Record the dispatch of `request` and move to `Generating`.
    ///
    /// A dispatch while another one is in flight supersedes it: only the
    /// result of the latest ticket will be applied.
    pub fn begin(&mut self, request: GenerationRequest) -> Result<GenerationTicket, PipelineError> {
        let Some(selected) = self.selected_template_id.as_deref() else {
            return Err(PipelineError::NoTemplateSelected);
        };
        if selected != request.template_id {
            return Err(PipelineError::InvalidTransition {
                phase: self.phase,
                operation: "generate a document for a template that is not selected",
            });
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending = Some(seq);
        self.last_request = Some(request);
        self.last_error = None;
        self.phase = GenerationPhase::Generating;

        Ok(GenerationTicket {
            epoch: self.epoch,
            seq,
        })
    }

    /// Apply the result of a dispatched render.
    pub fn complete(
        &mut self,
        ticket: GenerationTicket,
        result: RenderResult<Artifact>,
    ) -> GenerationOutcome {
        if ticket.epoch != self.epoch {
            return GenerationOutcome::Discarded(DiscardReason::TornDown);
        }
        if self.pending != Some(ticket.seq) {
            return GenerationOutcome::Discarded(DiscardReason::Superseded);
        }
        self.pending = None;

        match result {
            Ok(artifact) => {
                let handle = self.resources.adopt(artifact);
                self.phase = GenerationPhase::Ready;
                GenerationOutcome::Ready(handle)
            }
            Err(error) => {
                let error = Arc::new(error);
                if self.failure_policy == FailurePolicy::ClearPreview {
                    self.resources.revoke();
                }
                self.last_error = Some(error.clone());
                self.phase = GenerationPhase::Error;
                GenerationOutcome::Failed(error)
            }
        }
    }

    /// The request to send again for an identical re-generation.
    pub fn retry_request(&self) -> Result<GenerationRequest, PipelineError> {
        if self.selected_template_id.is_none() {
            return Err(PipelineError::NoTemplateSelected);
        }
        self.last_request
            .clone()
            .ok_or(PipelineError::NothingToRetry)
    }

    /// Release the handle and forget the selection. Results of renders still
    /// in flight will be discarded when they arrive.
    pub fn cleanup(&mut self) {
        self.resources.revoke();
        self.selected_template_id = None;
        self.pending = None;
        self.last_request = None;
        self.last_error = None;
        self.epoch += 1;
        self.phase = GenerationPhase::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docgen_renderer::RenderContext;

    fn request(template_id: &str) -> GenerationRequest {
        let mut context = RenderContext::new();
        context.insert("tenant".to_string(), "Alice".to_string());
        GenerationRequest::new(template_id, context)
    }

    fn pdf() -> Artifact {
        Artifact::pdf(b"%PDF-1.7".to_vec())
    }

    fn failure() -> RenderError {
        RenderError::InvalidInput("boom".to_string())
    }

    #[test]
    fn begin_requires_a_selected_template() {
        let mut state = GenerationState::new(ObjectUrlStore::default(), FailurePolicy::default());
        assert!(matches!(
            state.begin(request("lease")),
            Err(PipelineError::NoTemplateSelected)
        ));
        assert_eq!(state.phase(), GenerationPhase::Idle);
    }

    #[test]
    fn select_template_is_rejected_while_generating() {
        let mut state = GenerationState::new(ObjectUrlStore::default(), FailurePolicy::default());
        state.select_template("lease").unwrap();
        state.begin(request("lease")).unwrap();

        let err = state.select_template("notice").unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InvalidTransition {
                phase: GenerationPhase::Generating,
                ..
            }
        ));
        assert_eq!(state.selected_template_id(), Some("lease"));
    }

    #[test]
    fn success_moves_to_ready_with_handle() {
        let store = ObjectUrlStore::default();
        let mut state = GenerationState::new(store.clone(), FailurePolicy::default());
        state.select_template("lease").unwrap();
        let ticket = state.begin(request("lease")).unwrap();
        assert!(state.is_generating());
        assert_eq!(state.phase(), GenerationPhase::Generating);

        let outcome = state.complete(ticket, Ok(pdf()));
        let handle = outcome.handle().cloned().expect("ready");
        assert_eq!(state.phase(), GenerationPhase::Ready);
        assert!(!state.is_generating());
        assert_eq!(state.handle(), Some(&handle));
        assert!(store.is_live(&handle.url));
    }

    #[test]
    fn failure_clears_previous_preview_by_default() {
        let store = ObjectUrlStore::default();
        let mut state = GenerationState::new(store.clone(), FailurePolicy::ClearPreview);
        state.select_template("lease").unwrap();
        let ticket = state.begin(request("lease")).unwrap();
        state.complete(ticket, Ok(pdf()));

        let ticket = state.begin(request("lease")).unwrap();
        let outcome = state.complete(ticket, Err(failure()));

        assert!(matches!(outcome, GenerationOutcome::Failed(_)));
        assert_eq!(state.phase(), GenerationPhase::Error);
        assert!(!state.is_generating());
        assert_eq!(state.handle(), None);
        assert_eq!(store.live_count(), 0);
        assert!(state.last_error().is_some());
    }

    #[test]
    fn failure_keeps_last_good_preview_when_configured() {
        let store = ObjectUrlStore::default();
        let mut state = GenerationState::new(store.clone(), FailurePolicy::KeepLastGood);
        state.select_template("lease").unwrap();
        let ticket = state.begin(request("lease")).unwrap();
        let handle = state.complete(ticket, Ok(pdf())).handle().cloned().unwrap();

        let ticket = state.begin(request("lease")).unwrap();
        state.complete(ticket, Err(failure()));

        assert_eq!(state.phase(), GenerationPhase::Error);
        assert_eq!(state.handle(), Some(&handle));
        assert_eq!(store.live_count(), 1);
    }

    #[test]
    fn older_ticket_is_discarded_once_superseded() {
        let store = ObjectUrlStore::default();
        let mut state = GenerationState::new(store.clone(), FailurePolicy::default());
        state.select_template("lease").unwrap();
        let first = state.begin(request("lease")).unwrap();
        let second = state.begin(request("lease")).unwrap();

        let outcome = state.complete(second, Ok(pdf()));
        assert!(matches!(outcome, GenerationOutcome::Ready(_)));

        let outcome = state.complete(first, Ok(pdf()));
        assert!(matches!(
            outcome,
            GenerationOutcome::Discarded(DiscardReason::Superseded)
        ));
        assert_eq!(store.live_count(), 1);
    }

    #[test]
    fn cleanup_discards_in_flight_results() {
        let store = ObjectUrlStore::default();
        let mut state = GenerationState::new(store.clone(), FailurePolicy::default());
        state.select_template("lease").unwrap();
        let ticket = state.begin(request("lease")).unwrap();

        state.cleanup();
        let outcome = state.complete(ticket, Ok(pdf()));

        assert!(matches!(
            outcome,
            GenerationOutcome::Discarded(DiscardReason::TornDown)
        ));
        assert_eq!(state.phase(), GenerationPhase::Idle);
        assert_eq!(state.selected_template_id(), None);
        assert_eq!(state.handle(), None);
        assert_eq!(store.live_count(), 0);
    }

    #[test]
    fn retry_request_returns_last_dispatched_request() {
        let mut state = GenerationState::new(ObjectUrlStore::default(), FailurePolicy::default());
        state.select_template("lease").unwrap();
        assert!(matches!(
            state.retry_request(),
            Err(PipelineError::NothingToRetry)
        ));

        let ticket = state.begin(request("lease")).unwrap();
        state.complete(ticket, Err(failure()));
        assert_eq!(state.retry_request().unwrap(), request("lease"));
    }
}
