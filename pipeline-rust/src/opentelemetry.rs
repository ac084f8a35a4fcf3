use crate::{GenerationOutcome, PipelineError};
use opentelemetry::trace::Status;
use std::future::Future;
use tracing::{info_span, Span};
use tracing_futures::Instrument;
use tracing_opentelemetry::OpenTelemetrySpanExt;

#[derive(Clone, Copy)]
pub enum GenerationSpanMethod {
    Generate,
    Retry,
    SaveEdit,
}

impl GenerationSpanMethod {
    fn as_str(self) -> &'static str {
        match self {
            Self::Generate => "generate",
            Self::Retry => "retry",
            Self::SaveEdit => "save_edit",
        }
    }
}

pub struct GenerationSpan {
    span: Span,
    outcome: Option<&'static str>,
}

impl GenerationSpan {
    pub fn new(template_id: &str, method: GenerationSpanMethod) -> Self {
        let span = info_span!("docgen_pipeline.generate");
        span.set_attribute("docgen.operation.name", "generate_preview");
        span.set_attribute("docgen.template.id", template_id.to_string());
        span.set_attribute("docgen_pipeline.method", method.as_str());

        Self {
            span,
            outcome: None,
        }
    }

    pub fn span(&self) -> Span {
        self.span.clone()
    }

    pub fn on_outcome(&mut self, outcome: &GenerationOutcome) {
        self.outcome = Some(outcome.as_str());
        if let GenerationOutcome::Failed(error) = outcome {
            self.span.set_attribute("exception.message", error.to_string());
            self.span.set_status(Status::error(error.to_string()));
        }
    }

    pub fn on_error(&mut self, error: &(dyn std::error::Error + 'static)) {
        self.span.set_attribute("exception.message", error.to_string());
        self.span.set_status(Status::error(error.to_string()));
    }

    pub fn on_end(&mut self) {
        if let Some(outcome) = self.outcome {
            self.span.set_attribute("docgen.outcome", outcome);
        }
    }
}

impl Drop for GenerationSpan {
    fn drop(&mut self) {
        self.on_end();
    }
}

pub async fn trace_generation<Fut>(
    template_id: &str,
    method: GenerationSpanMethod,
    future: Fut,
) -> Result<GenerationOutcome, PipelineError>
where
    Fut: Future<Output = Result<GenerationOutcome, PipelineError>> + Send,
{
    let mut span = GenerationSpan::new(template_id, method);
    let result = future.instrument(span.span()).await;

    match &result {
        Ok(outcome) => span.on_outcome(outcome),
        Err(error) => span.on_error(error),
    }

    result
}
