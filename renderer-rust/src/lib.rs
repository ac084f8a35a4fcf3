mod catalog;
mod client_utils;
mod document_renderer;
mod errors;
pub mod http;
mod opentelemetry;
pub mod renderer_test;
mod types;

pub use catalog::{prepare_request, InMemoryTemplateCatalog, TemplateCatalog};
pub use document_renderer::DocumentRenderer;
pub use errors::*;
pub use types::*;
