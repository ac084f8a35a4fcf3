use crate::{Artifact, GenerationRequest, RenderResult};
use opentelemetry::trace::Status;
use std::time::Instant;
use tracing::{info_span, Span};
use tracing_futures::Instrument;
use tracing_opentelemetry::OpenTelemetrySpanExt;

pub struct RenderSpan {
    span: Span,
    start_time: Instant,
    artifact_bytes: Option<usize>,
    mime_type: Option<String>,
}

impl RenderSpan {
    pub fn new(provider: &str, request: &GenerationRequest) -> Self {
        let span = info_span!("docgen_renderer.render");
        span.set_attribute("docgen.operation.name", "render_document");
        span.set_attribute("docgen.provider", provider.to_string());
        span.set_attribute("docgen.template.id", request.template_id.clone());
        span.set_attribute(
            "docgen.context.fields",
            i64::try_from(request.context.len()).unwrap_or(i64::MAX),
        );

        Self {
            span,
            start_time: Instant::now(),
            artifact_bytes: None,
            mime_type: None,
        }
    }

    fn span(&self) -> Span {
        self.span.clone()
    }

    pub async fn instrument_future<F>(&self, future: F) -> F::Output
    where
        F: std::future::Future,
    {
        future.instrument(self.span()).await
    }

    pub fn on_artifact(&mut self, artifact: &Artifact) {
        self.artifact_bytes = Some(artifact.len());
        self.mime_type = Some(artifact.mime_type.clone());
    }

    pub fn on_error(&mut self, error: &(dyn std::error::Error + 'static)) {
        self.span
            .set_attribute("exception.message", error.to_string());
        self.span.set_status(Status::error(error.to_string()));
    }

    pub fn on_end(&mut self) {
        if let Some(bytes) = self.artifact_bytes {
            self.span.set_attribute(
                "docgen.artifact.bytes",
                i64::try_from(bytes).unwrap_or(i64::MAX),
            );
        }
        if let Some(mime_type) = &self.mime_type {
            self.span
                .set_attribute("docgen.artifact.mime_type", mime_type.clone());
        }
        self.span.set_attribute(
            "docgen.render.duration",
            self.start_time.elapsed().as_secs_f64(),
        );
    }
}

impl Drop for RenderSpan {
    fn drop(&mut self) {
        self.on_end();
    }
}

pub async fn trace_render<F, Fut>(
    provider: &str,
    request: GenerationRequest,
    f: F,
) -> RenderResult<Artifact>
where
    F: FnOnce(GenerationRequest) -> Fut,
    Fut: std::future::Future<Output = RenderResult<Artifact>>,
{
    let mut span = RenderSpan::new(provider, &request);
    let result = span.instrument_future(f(request)).await;

    match &result {
        Ok(artifact) => span.on_artifact(artifact),
        Err(error) => span.on_error(error),
    }

    result
}
