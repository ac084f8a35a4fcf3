use crate::{GenerationRequest, RenderError, RenderResult, Template};

/// Source of the templates available to a tenant.
#[async_trait::async_trait]
pub trait TemplateCatalog: Send + Sync {
    async fn list(&self) -> RenderResult<Vec<Template>>;
    async fn get(&self, template_id: &str) -> RenderResult<Option<Template>>;
}

/// Store a fixed set of templates and look them up by id
#[derive(Debug, Clone, Default)]
pub struct InMemoryTemplateCatalog {
    templates: Vec<Template>,
}

impl InMemoryTemplateCatalog {
    pub fn new(templates: Vec<Template>) -> Self {
        Self { templates }
    }

    #[must_use]
    pub fn add_template(mut self, template: Template) -> Self {
        self.templates.retain(|existing| existing.id != template.id);
        self.templates.push(template);
        self
    }
}

#[async_trait::async_trait]
impl TemplateCatalog for InMemoryTemplateCatalog {
    async fn list(&self) -> RenderResult<Vec<Template>> {
        Ok(self.templates.clone())
    }

    async fn get(&self, template_id: &str) -> RenderResult<Option<Template>> {
        Ok(self
            .templates
            .iter()
            .find(|template| template.id == template_id)
            .cloned())
    }
}

/// Resolve the template of a request and fill every required field the
/// context does not provide with an empty string.
pub async fn prepare_request(
    catalog: &dyn TemplateCatalog,
    request: GenerationRequest,
) -> RenderResult<(Template, GenerationRequest)> {
    if request.template_id.trim().is_empty() {
        return Err(RenderError::InvalidInput(
            "template id must not be empty".to_string(),
        ));
    }

    let template = catalog
        .get(&request.template_id)
        .await?
        .ok_or_else(|| RenderError::UnknownTemplate(request.template_id.clone()))?;

    let mut context = request.context;
    for field in &template.fields {
        context.entry(field.clone()).or_default();
    }

    let request = GenerationRequest {
        template_id: request.template_id,
        context,
    };
    Ok((template, request))
}
