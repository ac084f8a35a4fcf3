use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

/// Name of the context field that carries the free-form textual body of a
/// document. Editing a preview rewrites this field.
pub const CONTENT_FIELD: &str = "content";

/// Data passed to a template. Keys are ordered so that requests built from
/// the same values are equal and render the same way.
pub type RenderContext = BTreeMap<String, String>;

/// A renderable document kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    /// Human readable name, also used as the name of history entries.
    pub label: String,
    /// Grouping for generated documents (e.g. "lease", "notice").
    #[serde(default)]
    pub category: String,
    /// Fields the template reads from the context. Missing ones are rendered
    /// as empty strings.
    #[serde(default)]
    pub fields: Vec<String>,
}

impl Template {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            category: String::new(),
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    #[must_use]
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }
}

/// The full input of one render. A request is never mutated once built;
/// an edit produces a new request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub template_id: String,
    pub context: RenderContext,
}

impl GenerationRequest {
    pub fn new(template_id: impl Into<String>, context: RenderContext) -> Self {
        Self {
            template_id: template_id.into(),
            context,
        }
    }

    /// Build a new request with the same template and context, except for
    /// the content field which is replaced by `content`.
    #[must_use]
    pub fn with_content(&self, content: impl Into<String>) -> Self {
        let mut context = self.context.clone();
        context.insert(CONTENT_FIELD.to_string(), content.into());
        Self {
            template_id: self.template_id.clone(),
            context,
        }
    }

    /// Textual source of the document: the content field when present,
    /// otherwise one `key: value` line per context entry.
    pub fn content_text(&self) -> String {
        if let Some(content) = self.context.get(CONTENT_FIELD) {
            return content.clone();
        }
        self.context
            .iter()
            .map(|(key, value)| format!("{key}: {value}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A rendered document.
#[derive(Clone, PartialEq, Eq)]
pub struct Artifact {
    pub data: Vec<u8>,
    /// e.g. `application/pdf`
    pub mime_type: String,
    /// Persistent location of the document, when the renderer stored it.
    pub file_url: Option<String>,
}

pub const PDF_MIME_TYPE: &str = "application/pdf";

impl Artifact {
    pub fn new(data: impl Into<Vec<u8>>, mime_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime_type: mime_type.into(),
            file_url: None,
        }
    }

    pub fn pdf(data: impl Into<Vec<u8>>) -> Self {
        Self::new(data, PDF_MIME_TYPE)
    }

    #[must_use]
    pub fn with_file_url(mut self, file_url: impl Into<String>) -> Self {
        self.file_url = Some(file_url.into());
        self
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl fmt::Debug for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Artifact")
            .field("data", &format_args!("<{} bytes>", self.data.len()))
            .field("mime_type", &self.mime_type)
            .field("file_url", &self.file_url)
            .finish()
    }
}
