use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    /// The request does not satisfy the renderer contract (e.g. an empty
    /// template id or an invalid header value in the options).
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// The template id does not reference a template known to the catalog.
    #[error("Unknown template: {0}")]
    UnknownTemplate(String),
    /// The request to the render service failed before a response was
    /// received.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The render service returned a non-success status code
    #[error("Status error: {1} (Status {0})")]
    StatusCode(reqwest::StatusCode, String),
    /// The render service did not answer within the configured timeout.
    #[error("Render timed out after {0:?}")]
    Timeout(Duration),
    /// The render service answered, but the payload is not a usable document
    /// (empty body, undecodable data, unexpected content type).
    #[error("Malformed payload from {0}: {1}")]
    MalformedPayload(&'static str, String),
    /// The renderer reached a state that should not be possible.
    #[error("Invariant from {0}: {1}")]
    Invariant(&'static str, String),
}

pub type RenderResult<T> = Result<T, RenderError>;
