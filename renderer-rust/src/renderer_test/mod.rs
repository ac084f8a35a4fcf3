mod mock;

pub use mock::{DeferredRender, MockDocumentRenderer, MockRenderResult};
