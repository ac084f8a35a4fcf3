use crate::GenerationPhase;
use docgen_renderer::RenderError;
use thiserror::Error;

/// Errors returned for misuse of a preview session. Render and display
/// failures are not errors at this level: they are recorded in the session
/// state instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("No template selected")]
    NoTemplateSelected,
    #[error("Nothing to retry: no generation was dispatched for the selected template")]
    NothingToRetry,
    #[error("Cannot {operation} while {phase}")]
    InvalidTransition {
        phase: GenerationPhase,
        operation: &'static str,
    },
    #[error("Template catalog error: {0}")]
    Catalog(#[from] RenderError),
    #[error("History recorder error: {0}")]
    History(#[source] BoxedError),
}

pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;
