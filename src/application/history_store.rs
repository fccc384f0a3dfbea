// Repository traits for history and device-list access
use crate::domain::sample::RecordSet;
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Inclusive key interval, compared lexicographically by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRange {
    pub start: String,
    pub end: String,
}

impl KeyRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        key >= self.start.as_str() && key <= self.end.as_str()
    }
}

#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Fetch the records under a board's history root, optionally restricted to a key range
    async fn fetch(&self, root: &str, range: Option<&KeyRange>) -> anyhow::Result<RecordSet>;

    /// List the top-level keys of the raw data collection
    async fn list_roots(&self) -> anyhow::Result<Vec<String>>;
}

/// Live list of registered boards. Each item is the complete current set of ids.
#[async_trait]
pub trait DeviceDirectory: Send + Sync {
    async fn watch(&self) -> anyhow::Result<BoxStream<'static, anyhow::Result<Vec<String>>>>;
}
