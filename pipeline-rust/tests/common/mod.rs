#![allow(dead_code)]

use async_trait::async_trait;
use docgen_pipeline::{BoxedError, HistoryEntry, HistoryFilter, HistoryRecorder};
use docgen_renderer::{Artifact, RenderContext};

pub fn pdf(body: &str) -> Artifact {
    Artifact::pdf(format!("%PDF-1.7 {body}").into_bytes())
}

pub fn context(pairs: &[(&str, &str)]) -> RenderContext {
    pairs
        .iter()
        .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
        .collect()
}

/// Recorder whose storage is unavailable.
pub struct FailingHistoryRecorder;

#[async_trait]
impl HistoryRecorder for FailingHistoryRecorder {
    async fn append(&self, _entry: HistoryEntry) -> Result<(), BoxedError> {
        Err("history store unavailable".into())
    }

    async fn list(&self, _filter: &HistoryFilter) -> Result<Vec<HistoryEntry>, BoxedError> {
        Err("history store unavailable".into())
    }
}
