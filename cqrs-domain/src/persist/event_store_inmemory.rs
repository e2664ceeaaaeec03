use crate::{
    error::{DomainError, DomainResult},
    message::{EventMessage, Headers},
    persist::{EventStore, SerializedEvent},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// 内存事件存储
///
/// 所有流共用一把写锁，版本检查与追加在同一临界区内完成。
#[derive(Clone, Default)]
pub struct InMemoryEventStore {
    streams: Arc<RwLock<HashMap<String, Vec<SerializedEvent>>>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 流当前版本（记录数），未知流为 0
    pub async fn stream_version(&self, stream: &str) -> usize {
        self.streams.read().await.get(stream).map_or(0, Vec::len)
    }

    pub async fn stream_names(&self) -> Vec<String> {
        self.streams.read().await.keys().cloned().collect()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    #[tracing::instrument(level = "debug", skip(self, events, headers), fields(count = events.len()))]
    async fn save(
        &self,
        stream: &str,
        events: &[EventMessage],
        expected_version: Option<usize>,
        headers: &Headers,
    ) -> DomainResult<()> {
        if events.is_empty() {
            return Err(DomainError::NoEventsToAppend);
        }

        let mut streams = self.streams.write().await;
        let current = streams.get(stream).map_or(0, Vec::len);

        if let Some(expected) = expected_version {
            if expected != current {
                tracing::warn!(expected, actual = current, "stream version mismatch");
                return Err(DomainError::VersionConflict {
                    stream: stream.to_string(),
                    expected,
                    actual: Some(current),
                });
            }
        }

        // 先整体序列化，任一失败则不写入
        let batch = events
            .iter()
            .enumerate()
            .map(|(offset, e)| SerializedEvent::from_message(stream, current + offset, e, headers))
            .collect::<DomainResult<Vec<_>>>()?;

        let records = streams.entry(stream.to_string()).or_default();
        records.extend(batch);
        tracing::debug!(version = records.len(), "events appended");
        Ok(())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn load(&self, stream: &str) -> DomainResult<Vec<SerializedEvent>> {
        self.streams
            .read()
            .await
            .get(stream)
            .cloned()
            .ok_or_else(|| DomainError::NoEventsFound {
                stream: stream.to_string(),
            })
    }
}
