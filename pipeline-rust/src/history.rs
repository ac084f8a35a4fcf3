use crate::BoxedError;
use chrono::{DateTime, Utc};
use futures::lock::Mutex;
use serde::{Deserialize, Serialize};

/// A generated document as persisted by the history recorder. Entries are
/// written once, when a generation succeeds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub name: String,
    pub category: String,
    /// Id of the template the document was rendered from.
    pub document_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    /// Textual source the document was rendered from.
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        document_type: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: format!("{:032x}", rand::random::<u128>()),
            name: name.into(),
            category: category.into(),
            document_type: document_type.into(),
            file_url: None,
            content: content.into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn with_file_url(mut self, file_url: Option<String>) -> Self {
        self.file_url = file_url;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    pub category: Option<String>,
    pub document_type: Option<String>,
    pub limit: Option<usize>,
}

impl HistoryFilter {
    pub fn matches(&self, entry: &HistoryEntry) -> bool {
        self.category
            .as_ref()
            .is_none_or(|category| *category == entry.category)
            && self
                .document_type
                .as_ref()
                .is_none_or(|document_type| *document_type == entry.document_type)
    }
}

/// Persists completed generations.
#[async_trait::async_trait]
pub trait HistoryRecorder: Send + Sync {
    async fn append(&self, entry: HistoryEntry) -> Result<(), BoxedError>;
    /// Entries matching `filter`, newest first.
    async fn list(&self, filter: &HistoryFilter) -> Result<Vec<HistoryEntry>, BoxedError>;
}

#[derive(Default)]
pub struct InMemoryHistoryRecorder {
    entries: Mutex<Vec<HistoryEntry>>,
}

impl InMemoryHistoryRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl HistoryRecorder for InMemoryHistoryRecorder {
    async fn append(&self, entry: HistoryEntry) -> Result<(), BoxedError> {
        self.entries.lock().await.push(entry);
        Ok(())
    }

    async fn list(&self, filter: &HistoryFilter) -> Result<Vec<HistoryEntry>, BoxedError> {
        let entries = self.entries.lock().await;
        Ok(entries
            .iter()
            .rev()
            .filter(|entry| filter.matches(entry))
            .take(filter.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }
}
