#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

//! Topic-tagged event publishing for module-to-module notifications.

use std::{
    collections::VecDeque,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::{fs::OpenOptions, io::AsyncWriteExt, sync::broadcast};

/// Event emitted by a component, encoded as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusEvent {
    /// Unique identifier.
    pub id: String,
    /// Component that produced the event.
    pub source: String,
    /// Dotted topic (e.g., `adapt.plan_adjusted`).
    pub topic: String,
    /// ISO timestamp.
    pub timestamp: String,
    /// Arbitrary JSON payload.
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// Sink accepting published events.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Publishes one event.
    async fn publish(&self, event: BusEvent) -> Result<()>;
}

/// In-memory broadcast bus retaining a bounded backlog of recent events.
#[derive(Debug, Clone)]
pub struct MemoryEventBus {
    sender: broadcast::Sender<BusEvent>,
    backlog: Arc<Mutex<VecDeque<BusEvent>>>,
    retain: usize,
}

impl MemoryEventBus {
    /// Creates a bus retaining up to `retain` recent events.
    #[must_use]
    pub fn new(retain: usize) -> Self {
        let (sender, _) = broadcast::channel(retain.max(1));
        Self {
            sender,
            backlog: Arc::new(Mutex::new(VecDeque::new())),
            retain: retain.max(1),
        }
    }

    /// Subscribes to the live stream of events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<BusEvent> {
        self.sender.subscribe()
    }

    /// Snapshot of retained events, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<BusEvent> {
        self.backlog.lock().iter().cloned().collect()
    }

    /// Retained events published under the given topic.
    #[must_use]
    pub fn topic_snapshot(&self, topic: &str) -> Vec<BusEvent> {
        self.backlog
            .lock()
            .iter()
            .filter(|event| event.topic == topic)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl EventSink for MemoryEventBus {
    async fn publish(&self, event: BusEvent) -> Result<()> {
        {
            let mut backlog = self.backlog.lock();
            backlog.push_back(event.clone());
            while backlog.len() > self.retain {
                backlog.pop_front();
            }
        }
        let _ = self.sender.send(event);
        Ok(())
    }
}

/// Durable sink appending events as JSON lines.
#[derive(Debug, Clone)]
pub struct FileEventSink {
    path: PathBuf,
}

impl FileEventSink {
    /// Creates a sink appending to the given path.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(Self { path })
    }
}

#[async_trait]
impl EventSink for FileEventSink {
    async fn publish(&self, event: BusEvent) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        let data = serde_json::to_vec(&event)?;
        file.write_all(&data).await?;
        file.write_all(b"\n").await?;
        file.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tokio::runtime::Runtime;

    fn sample_event(topic: &str) -> BusEvent {
        BusEvent {
            id: "evt-1".into(),
            source: "tester".into(),
            topic: topic.into(),
            timestamp: "2026-08-01T00:00:00Z".into(),
            payload: serde_json::json!({ "value": 1 }),
        }
    }

    #[test]
    fn publishes_and_receives() {
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let bus = MemoryEventBus::new(16);
            let mut rx = bus.subscribe();
            bus.publish(sample_event("adapt.done")).await.unwrap();
            let event = rx.recv().await.unwrap();
            assert_eq!(event.topic, "adapt.done");
        });
    }

    #[test]
    fn backlog_is_bounded_and_filterable() {
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let bus = MemoryEventBus::new(2);
            bus.publish(sample_event("a")).await.unwrap();
            bus.publish(sample_event("b")).await.unwrap();
            bus.publish(sample_event("b")).await.unwrap();
            assert_eq!(bus.snapshot().len(), 2);
            assert_eq!(bus.topic_snapshot("b").len(), 2);
        });
    }

    #[test]
    fn file_sink_appends_events() {
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let dir = tempdir().unwrap();
            let path = dir.path().join("events.jsonl");
            let sink = FileEventSink::new(&path).unwrap();
            sink.publish(sample_event("adapt.done")).await.unwrap();
            let content = std::fs::read_to_string(path).unwrap();
            assert!(content.contains("adapt.done"));
        });
    }
}
