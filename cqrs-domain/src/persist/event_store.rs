use crate::{
    error::DomainResult,
    message::{EventMessage, Headers},
    persist::SerializedEvent,
};
use async_trait::async_trait;
use std::sync::Arc;

/// 只追加的事件日志
#[async_trait]
pub trait EventStore: Send + Sync {
    /// 将 `events` 追加到 `stream`。
    ///
    /// - `events` 为空时返回 `NoEventsToAppend`；
    /// - `expected_version` 为 `Some(v)` 时，仅当流当前版本（记录数）等于 `v` 才追加，
    ///   否则返回 `VersionConflict`，检查与追加对同一流的其他保存是原子的；
    /// - `headers` 为本次追加的公共头部。
    async fn save(
        &self,
        stream: &str,
        events: &[EventMessage],
        expected_version: Option<usize>,
        headers: &Headers,
    ) -> DomainResult<()>;

    /// 按追加顺序返回流中全部记录；未知流返回 `NoEventsFound`
    async fn load(&self, stream: &str) -> DomainResult<Vec<SerializedEvent>>;
}

#[async_trait]
impl<T> EventStore for Arc<T>
where
    T: EventStore + ?Sized,
{
    async fn save(
        &self,
        stream: &str,
        events: &[EventMessage],
        expected_version: Option<usize>,
        headers: &Headers,
    ) -> DomainResult<()> {
        (**self)
            .save(stream, events, expected_version, headers)
            .await
    }

    async fn load(&self, stream: &str) -> DomainResult<Vec<SerializedEvent>> {
        (**self).load(stream).await
    }
}
