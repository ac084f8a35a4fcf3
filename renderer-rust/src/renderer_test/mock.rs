use std::{collections::VecDeque, sync::Mutex};

use futures::channel::oneshot;

use crate::{Artifact, DocumentRenderer, GenerationRequest, RenderError, RenderResult};

/// Result for a mocked `render` call.
/// It can be an artifact, an error, or a result resolved later by the test.
pub enum MockRenderResult {
    Artifact(Artifact),
    Error(RenderError),
    Deferred(oneshot::Receiver<RenderResult<Artifact>>),
}

impl MockRenderResult {
    /// Construct a result that yields the provided artifact.
    pub fn artifact(artifact: Artifact) -> Self {
        Self::Artifact(artifact)
    }

    /// Construct a result that yields the provided error.
    pub fn error(error: RenderError) -> Self {
        Self::Error(error)
    }

    /// Construct a result that stays pending until the returned
    /// `DeferredRender` is resolved.
    pub fn deferred() -> (Self, DeferredRender) {
        let (sender, receiver) = oneshot::channel();
        (Self::Deferred(receiver), DeferredRender { sender })
    }
}

impl From<Artifact> for MockRenderResult {
    fn from(artifact: Artifact) -> Self {
        Self::artifact(artifact)
    }
}

impl From<RenderError> for MockRenderResult {
    fn from(error: RenderError) -> Self {
        Self::error(error)
    }
}

impl From<RenderResult<Artifact>> for MockRenderResult {
    fn from(result: RenderResult<Artifact>) -> Self {
        match result {
            Ok(artifact) => Self::Artifact(artifact),
            Err(error) => Self::Error(error),
        }
    }
}

/// Completes a deferred mocked render.
pub struct DeferredRender {
    sender: oneshot::Sender<RenderResult<Artifact>>,
}

impl DeferredRender {
    /// Resolve the pending render. Returns false if the render future was
    /// already dropped.
    pub fn resolve(self, result: RenderResult<Artifact>) -> bool {
        self.sender.send(result).is_ok()
    }
}

#[derive(Default)]
struct MockRendererState {
    mocked_results: VecDeque<MockRenderResult>,
    tracked_requests: Vec<GenerationRequest>,
}

impl MockRendererState {
    fn reset(&mut self) {
        self.tracked_requests.clear();
    }

    fn restore(&mut self) {
        self.mocked_results.clear();
        self.reset();
    }
}

/// A mock renderer for testing that tracks requests and yields predefined
/// results.
pub struct MockDocumentRenderer {
    provider: &'static str,
    state: Mutex<MockRendererState>,
}

impl Default for MockDocumentRenderer {
    fn default() -> Self {
        Self {
            provider: "mock",
            state: Mutex::new(MockRendererState::default()),
        }
    }
}

impl MockDocumentRenderer {
    /// Construct a new mock renderer instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the provider identifier returned by the mock.
    pub fn set_provider(&mut self, provider: &'static str) {
        self.provider = provider;
    }

    /// Enqueue one or more mocked render results.
    pub fn enqueue_results<I>(&self, results: I) -> &Self
    where
        I: IntoIterator<Item = MockRenderResult>,
    {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.mocked_results.extend(results);
        drop(state);
        self
    }

    /// Convenience to enqueue a single mocked render result.
    pub fn enqueue<R>(&self, result: R) -> &Self
    where
        R: Into<MockRenderResult>,
    {
        self.enqueue_results(std::iter::once(result.into()))
    }

    /// Enqueue a deferred result and return the handle that resolves it.
    pub fn enqueue_deferred(&self) -> DeferredRender {
        let (result, deferred) = MockRenderResult::deferred();
        self.enqueue(result);
        deferred
    }

    /// Retrieve the tracked requests accumulated so far.
    pub fn tracked_requests(&self) -> Vec<GenerationRequest> {
        let state = self.state.lock().expect("mock state poisoned");
        state.tracked_requests.clone()
    }

    /// Reset tracked requests without touching enqueued results.
    pub fn reset(&self) {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.reset();
    }

    /// Clear both tracked requests and enqueued results.
    pub fn restore(&self) {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.restore();
    }
}

#[async_trait::async_trait]
impl DocumentRenderer for MockDocumentRenderer {
    fn provider(&self) -> &'static str {
        self.provider
    }

    async fn render(&self, request: GenerationRequest) -> RenderResult<Artifact> {
        let result = {
            let mut state = self.state.lock().expect("mock state poisoned");
            state.tracked_requests.push(request);
            state.mocked_results.pop_front()
        }
        .ok_or_else(|| {
            RenderError::Invariant(self.provider, "no mocked render results available".into())
        })?;

        match result {
            MockRenderResult::Artifact(artifact) => Ok(artifact),
            MockRenderResult::Error(error) => Err(error),
            MockRenderResult::Deferred(receiver) => receiver.await.unwrap_or_else(|_| {
                Err(RenderError::Invariant(
                    self.provider,
                    "deferred render was dropped before being resolved".into(),
                ))
            }),
        }
    }
}
