use docgen_renderer::Artifact;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use tracing::trace;

/// Table of URL-like references to rendered artifacts, shared between the
/// sessions that create them and the viewers that display them.
///
/// A URL stays resolvable until it is revoked. Cloning the store shares the
/// same table.
#[derive(Clone)]
pub struct ObjectUrlStore {
    origin: Arc<str>,
    entries: Arc<Mutex<HashMap<String, Arc<Artifact>>>>,
}

impl ObjectUrlStore {
    pub fn new(origin: impl Into<String>) -> Self {
        let origin: String = origin.into();
        Self {
            origin: origin.into(),
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Arc<Artifact>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register an artifact and return its URL.
    pub fn create(&self, artifact: Arc<Artifact>) -> String {
        let mut entries = self.entries();
        let url = loop {
            let candidate = format!("blob:{}/{:032x}", self.origin, rand::random::<u128>());
            if !entries.contains_key(&candidate) {
                break candidate;
            }
        };
        entries.insert(url.clone(), artifact);
        trace!(url = %url, live = entries.len(), "object url created");
        url
    }

    /// Release a URL. Returns false if it was not live.
    pub fn revoke(&self, url: &str) -> bool {
        let mut entries = self.entries();
        let released = entries.remove(url).is_some();
        trace!(url = %url, released, live = entries.len(), "object url revoked");
        released
    }

    pub fn resolve(&self, url: &str) -> Option<Arc<Artifact>> {
        self.entries().get(url).cloned()
    }

    pub fn is_live(&self, url: &str) -> bool {
        self.entries().contains_key(url)
    }

    pub fn live_count(&self) -> usize {
        self.entries().len()
    }
}

impl Default for ObjectUrlStore {
    fn default() -> Self {
        Self::new("docgen")
    }
}
