// Test doubles shared by the application tests
use crate::application::chart_sink::ChartSink;
use crate::application::history_store::{DeviceDirectory, HistoryStore, KeyRange};
use crate::domain::channel::Series;
use crate::domain::sample::RecordSet;
use crate::domain::threshold::Tier;
use crate::domain::variable::Variable;
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub fn records(variable: Variable, entries: &[(&str, f64)]) -> RecordSet {
    entries
        .iter()
        .map(|(key, value)| (key.to_string(), serde_json::json!({ variable.key(): value })))
        .collect()
}

/// In-memory store with lexicographic range filtering, failure injection and
/// per-range-start delays.
#[derive(Default)]
pub struct MemoryStore {
    roots: Mutex<HashMap<String, RecordSet>>,
    listed: Mutex<Vec<String>>,
    delays: Mutex<HashMap<Option<String>, Duration>>,
    failing: AtomicBool,
    fetches: AtomicUsize,
    last_range: Mutex<Option<KeyRange>>,
}

impl MemoryStore {
    pub fn with_root(root: &str, records: RecordSet) -> Self {
        let store = Self::default();
        store.set_root(root, records);
        store
    }

    pub fn set_root(&self, root: &str, records: RecordSet) {
        self.roots.lock().unwrap().insert(root.to_string(), records);
    }

    pub fn set_listed(&self, ids: &[&str]) {
        *self.listed.lock().unwrap() = ids.iter().map(|s| s.to_string()).collect();
    }

    /// Delay fetches whose range starts at `start` (`None` = full history).
    pub fn delay(&self, start: Option<&str>, delay: Duration) {
        self.delays
            .lock()
            .unwrap()
            .insert(start.map(str::to_string), delay);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn last_range(&self) -> Option<KeyRange> {
        self.last_range.lock().unwrap().clone()
    }
}

#[async_trait]
impl HistoryStore for MemoryStore {
    async fn fetch(&self, root: &str, range: Option<&KeyRange>) -> anyhow::Result<RecordSet> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        *self.last_range.lock().unwrap() = range.cloned();

        let delay = self
            .delays
            .lock()
            .unwrap()
            .get(&range.map(|r| r.start.clone()))
            .copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("connection refused");
        }

        let roots = self.roots.lock().unwrap();
        let all = roots.get(root).cloned().unwrap_or_default();
        Ok(all
            .into_iter()
            .filter(|(key, _)| range.is_none_or(|r| r.contains(key)))
            .collect())
    }

    async fn list_roots(&self) -> anyhow::Result<Vec<String>> {
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("connection refused");
        }
        Ok(self.listed.lock().unwrap().clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    Render {
        variable: Variable,
        labels: Vec<String>,
        series: Vec<Series>,
    },
    Reset(Variable),
    Status(Variable, Tier),
    Caption(Variable, String),
}

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<SinkEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    pub fn renders(&self, variable: Variable) -> Vec<(Vec<String>, Vec<Series>)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SinkEvent::Render {
                    variable: v,
                    labels,
                    series,
                } if v == variable => Some((labels, series)),
                _ => None,
            })
            .collect()
    }
}

impl ChartSink for RecordingSink {
    fn render(&self, variable: Variable, labels: &[String], series: &[Series]) {
        self.events.lock().unwrap().push(SinkEvent::Render {
            variable,
            labels: labels.to_vec(),
            series: series.to_vec(),
        });
    }

    fn reset(&self, variable: Variable) {
        self.events.lock().unwrap().push(SinkEvent::Reset(variable));
    }

    fn status(&self, variable: Variable, tier: Tier) {
        self.events.lock().unwrap().push(SinkEvent::Status(variable, tier));
    }

    fn caption(&self, variable: Variable, text: &str) {
        self.events
            .lock()
            .unwrap()
            .push(SinkEvent::Caption(variable, text.to_string()));
    }
}

/// Directory that replays a fixed list of updates, or fails to connect.
/// `connect_delay` holds `watch` back before it answers.
pub struct ScriptedDirectory {
    pub updates: Vec<anyhow::Result<Vec<String>>>,
    pub connect_error: bool,
    pub connect_delay: Option<Duration>,
}

impl ScriptedDirectory {
    pub fn new(updates: Vec<Vec<&str>>) -> Self {
        Self {
            updates: updates
                .into_iter()
                .map(|ids| Ok(ids.into_iter().map(str::to_string).collect()))
                .collect(),
            connect_error: false,
            connect_delay: None,
        }
    }
}

#[async_trait]
impl DeviceDirectory for ScriptedDirectory {
    async fn watch(&self) -> anyhow::Result<BoxStream<'static, anyhow::Result<Vec<String>>>> {
        if let Some(delay) = self.connect_delay {
            tokio::time::sleep(delay).await;
        }
        if self.connect_error {
            anyhow::bail!("directory offline");
        }
        let updates: Vec<anyhow::Result<Vec<String>>> = self
            .updates
            .iter()
            .map(|u| match u {
                Ok(ids) => Ok(ids.clone()),
                Err(e) => Err(anyhow::anyhow!("{}", e)),
            })
            .collect();
        Ok(stream::iter(updates).boxed())
    }
}
