use crate::{Artifact, GenerationRequest, RenderResult};

/// Turns a generation request into a rendered document.
///
/// Implementations are stateless transforms: they must not retry
/// internally and must not keep any reference to the produced artifact.
/// Retrying a failed render is a decision left to the caller.
#[async_trait::async_trait]
pub trait DocumentRenderer: Send + Sync {
    fn provider(&self) -> &'static str;
    async fn render(&self, request: GenerationRequest) -> RenderResult<Artifact>;
}
