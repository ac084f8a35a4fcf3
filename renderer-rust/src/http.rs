use crate::{
    client_utils, Artifact, DocumentRenderer, GenerationRequest, RenderContext, RenderError,
    RenderResult, PDF_MIME_TYPE,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::{
    header::{self, HeaderMap, HeaderName, HeaderValue},
    Client, Response,
};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, time::Duration};

const PROVIDER: &str = "http";
const DEFAULT_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const PDF_MAGIC: &[u8] = b"%PDF-";

/// Renders documents by calling a remote render service.
///
/// The service receives `POST {base_url}/render` with a JSON body
/// `{"templateId": ..., "context": {...}}` and answers either with the raw
/// document bytes or with a JSON envelope carrying base64 data.
pub struct HttpDocumentRenderer {
    base_url: String,
    api_key: Option<String>,
    client: Client,
    headers: HashMap<String, String>,
    timeout: Duration,
}

#[derive(Clone, Default)]
pub struct HttpRendererOptions {
    /// Defaults to `http://localhost:8080`
    pub base_url: Option<String>,
    /// Sent as a bearer token when set.
    pub api_key: Option<String>,
    pub headers: Option<HashMap<String, String>>,
    pub client: Option<Client>,
    /// Defaults to 30 seconds.
    pub timeout: Option<Duration>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RenderRequestBody<'a> {
    template_id: &'a str,
    context: &'a RenderContext,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderResponseEnvelope {
    data: String,
    mime_type: Option<String>,
    file_url: Option<String>,
}

impl HttpDocumentRenderer {
    #[must_use]
    pub fn new(options: HttpRendererOptions) -> Self {
        let HttpRendererOptions {
            base_url,
            api_key,
            headers,
            client,
            timeout,
        } = options;

        let base_url = base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Self {
            base_url,
            api_key,
            client: client.unwrap_or_else(Client::new),
            headers: headers.unwrap_or_default(),
            timeout: timeout.unwrap_or(DEFAULT_TIMEOUT),
        }
    }

    fn request_headers(&self) -> RenderResult<HeaderMap> {
        let mut headers = HeaderMap::new();

        if let Some(api_key) = &self.api_key {
            let auth_header =
                HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|error| {
                    RenderError::InvalidInput(format!(
                        "Invalid render service API key header value: {error}"
                    ))
                })?;
            headers.insert(header::AUTHORIZATION, auth_header);
        }

        for (key, value) in &self.headers {
            let header_name = HeaderName::from_bytes(key.as_bytes()).map_err(|error| {
                RenderError::InvalidInput(format!("Invalid header name '{key}': {error}"))
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|error| {
                RenderError::InvalidInput(format!("Invalid header value for '{key}': {error}"))
            })?;
            headers.insert(header_name, header_value);
        }

        Ok(headers)
    }

    async fn send(&self, request: GenerationRequest) -> RenderResult<Artifact> {
        let body = RenderRequestBody {
            template_id: &request.template_id,
            context: &request.context,
        };
        let url = format!("{}/render", self.base_url);

        let response = client_utils::send_json(
            &self.client,
            &url,
            &body,
            self.request_headers()?,
            self.timeout,
        )
        .await?;

        let content_type = content_type(&response);
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string);
        let data = client_utils::read_body(response, self.timeout).await?;

        let mut artifact = if content_type == "application/json" {
            decode_envelope(&data)?
        } else {
            Artifact::new(data, content_type)
        };

        if artifact.file_url.is_none() {
            artifact.file_url = location;
        }

        validate_artifact(&artifact)?;
        Ok(artifact)
    }
}

#[async_trait::async_trait]
impl DocumentRenderer for HttpDocumentRenderer {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    async fn render(&self, request: GenerationRequest) -> RenderResult<Artifact> {
        crate::opentelemetry::trace_render(self.provider(), request, |request| self.send(request))
            .await
    }
}

/// Media type of the response without parameters, `application/octet-stream`
/// when the header is absent.
fn content_type(response: &Response) -> String {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map_or_else(
            || "application/octet-stream".to_string(),
            |value| value.trim().to_ascii_lowercase(),
        )
}

fn decode_envelope(body: &[u8]) -> RenderResult<Artifact> {
    let envelope: RenderResponseEnvelope = serde_json::from_slice(body).map_err(|error| {
        RenderError::MalformedPayload(PROVIDER, format!("Invalid JSON envelope: {error}"))
    })?;

    let data = STANDARD.decode(envelope.data.as_bytes()).map_err(|error| {
        RenderError::MalformedPayload(PROVIDER, format!("Invalid base64 document data: {error}"))
    })?;

    Ok(Artifact {
        data,
        mime_type: envelope
            .mime_type
            .unwrap_or_else(|| PDF_MIME_TYPE.to_string()),
        file_url: envelope.file_url,
    })
}

fn validate_artifact(artifact: &Artifact) -> RenderResult<()> {
    if artifact.is_empty() {
        return Err(RenderError::MalformedPayload(
            PROVIDER,
            "Render service returned an empty document".to_string(),
        ));
    }

    match artifact.mime_type.as_str() {
        PDF_MIME_TYPE => {
            if artifact.data.starts_with(PDF_MAGIC) {
                Ok(())
            } else {
                Err(RenderError::MalformedPayload(
                    PROVIDER,
                    "Document is labelled as PDF but has no PDF header".to_string(),
                ))
            }
        }
        "application/octet-stream" => Ok(()),
        other => Err(RenderError::MalformedPayload(
            PROVIDER,
            format!("Unsupported content type: {other}"),
        )),
    }
}
