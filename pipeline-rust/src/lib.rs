mod errors;
mod generation;
mod history;
mod object_url;
mod opentelemetry;
mod params;
mod pipeline;
mod resources;
mod session;
mod view;

pub use errors::{BoxedError, PipelineError};
pub use generation::{
    DiscardReason, FailurePolicy, GenerationOutcome, GenerationPhase, GenerationState,
    GenerationTicket,
};
pub use history::{HistoryEntry, HistoryFilter, HistoryRecorder, InMemoryHistoryRecorder};
pub use object_url::ObjectUrlStore;
pub use params::PipelineParams;
pub use pipeline::DocumentPipeline;
pub use resources::{PreviewHandle, PreviewResourceManager};
pub use session::PreviewSession;
pub use view::PreviewViewState;
