use crate::ObjectUrlStore;
use docgen_renderer::Artifact;
use std::sync::Arc;
use tracing::debug;

/// A revocable reference to a rendered artifact, usable as the source of a
/// display surface. The URL must not be used after the owning manager
/// revoked it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewHandle {
    pub url: String,
    pub artifact: Arc<Artifact>,
}

/// Owns the single live preview handle of a generation state.
///
/// Every path that ends interest in a handle (supersession, cleanup,
/// failure, teardown) goes through [`PreviewResourceManager::revoke`], so a
/// handle is released exactly once. Dropping the manager revokes whatever it
/// still holds.
pub struct PreviewResourceManager {
    store: ObjectUrlStore,
    current: Option<PreviewHandle>,
}

impl PreviewResourceManager {
    #[must_use]
    pub fn new(store: ObjectUrlStore) -> Self {
        Self {
            store,
            current: None,
        }
    }

    /// Revoke the held handle, then register `artifact` and hold the new
    /// handle.
    pub fn adopt(&mut self, artifact: Artifact) -> PreviewHandle {
        self.revoke();

        let artifact = Arc::new(artifact);
        let url = self.store.create(artifact.clone());
        debug!(url = %url, bytes = artifact.len(), "preview handle adopted");

        let handle = PreviewHandle { url, artifact };
        self.current = Some(handle.clone());
        handle
    }

    /// Release the held handle, if any. Calling it again is a no-op.
    /// Returns whether a handle was released.
    pub fn revoke(&mut self) -> bool {
        let Some(handle) = self.current.take() else {
            return false;
        };
        self.store.revoke(&handle.url);
        debug!(url = %handle.url, "preview handle revoked");
        true
    }

    pub fn current(&self) -> Option<&PreviewHandle> {
        self.current.as_ref()
    }
}

impl Drop for PreviewResourceManager {
    fn drop(&mut self) {
        self.revoke();
    }
}
