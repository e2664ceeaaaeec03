//! 领域仓储（DomainRepository）
//!
//! - `load`：解析流名 → 读取流 → 经 `EventFactory` 还原事件 → 重放到新建聚合；
//! - `save`：以聚合原始版本为前置条件追加未提交事件，成功后提交变更并发布。
//!
use crate::{
    aggregate::{Aggregate, AggregateRoot, AggregateState, ChangeTracker, Versioned},
    error::{DomainError, DomainResult},
    eventing::EventBus,
    factory::{AggregateFactory, EventFactory},
    message::{AGGREGATE_ID_HEADER, AGGREGATE_TYPE_HEADER, EventMessage, Headers},
    persist::EventStore,
    stream_namer::StreamNamer,
};
use async_trait::async_trait;
use bon::Builder;
use std::sync::Arc;

#[async_trait]
pub trait DomainRepository: Send + Sync {
    /// 按类型标签与 ID 加载聚合，返回重放后的新实例
    async fn load(
        &self,
        aggregate_type: &str,
        aggregate_id: &str,
    ) -> DomainResult<Box<dyn AggregateRoot>>;

    /// 保存未提交事件；`expected_version` 为 `None` 时以聚合原始版本为前置条件
    async fn save(
        &self,
        aggregate: &mut dyn AggregateRoot,
        expected_version: Option<usize>,
    ) -> DomainResult<()>;
}

#[async_trait]
impl<T> DomainRepository for Arc<T>
where
    T: DomainRepository + ?Sized,
{
    async fn load(
        &self,
        aggregate_type: &str,
        aggregate_id: &str,
    ) -> DomainResult<Box<dyn AggregateRoot>> {
        (**self).load(aggregate_type, aggregate_id).await
    }

    async fn save(
        &self,
        aggregate: &mut dyn AggregateRoot,
        expected_version: Option<usize>,
    ) -> DomainResult<()> {
        (**self).save(aggregate, expected_version).await
    }
}

/// 类型化加载
#[async_trait]
pub trait DomainRepositoryExt: DomainRepository {
    async fn load_aggregate<A>(&self, aggregate_id: &str) -> DomainResult<A>
    where
        A: Aggregate,
    {
        let root = self.load(A::TYPE, aggregate_id).await?;
        let actual = root.aggregate_type();
        root.into_any()
            .downcast::<A>()
            .map(|boxed| *boxed)
            .map_err(|_| DomainError::UnknownAggregateType {
                aggregate_type: format!("{} (constructed as {actual})", A::TYPE),
            })
    }
}

impl<T> DomainRepositoryExt for T where T: DomainRepository + ?Sized {}

/// 基于 `EventStore` + `EventBus` 的通用仓储
#[derive(Builder)]
pub struct CommonDomainRepository {
    store: Arc<dyn EventStore>,
    bus: Arc<dyn EventBus>,
    aggregate_factory: Option<Arc<dyn AggregateFactory>>,
    stream_namer: Option<Arc<dyn StreamNamer>>,
    event_factory: Option<Arc<dyn EventFactory>>,
}

impl CommonDomainRepository {
    pub fn store(&self) -> &Arc<dyn EventStore> {
        &self.store
    }

    pub fn bus(&self) -> &Arc<dyn EventBus> {
        &self.bus
    }

    fn stream_namer(&self) -> DomainResult<&dyn StreamNamer> {
        self.stream_namer
            .as_deref()
            .ok_or(DomainError::MissingStreamNamer)
    }
}

#[async_trait]
impl DomainRepository for CommonDomainRepository {
    #[tracing::instrument(level = "debug", skip(self))]
    async fn load(
        &self,
        aggregate_type: &str,
        aggregate_id: &str,
    ) -> DomainResult<Box<dyn AggregateRoot>> {
        let aggregate_factory = self
            .aggregate_factory
            .as_deref()
            .ok_or(DomainError::MissingAggregateFactory)?;
        let stream_namer = self.stream_namer()?;
        let event_factory = self
            .event_factory
            .as_deref()
            .ok_or(DomainError::MissingEventFactory)?;

        let mut aggregate = aggregate_factory
            .get_aggregate(aggregate_type, aggregate_id)
            .ok_or_else(|| DomainError::UnknownAggregateType {
                aggregate_type: aggregate_type.to_string(),
            })?;

        let stream = stream_namer.stream_name(aggregate_type, aggregate_id)?;

        let records = match self.store.load(&stream).await {
            Ok(records) => records,
            Err(DomainError::NoEventsFound { .. }) => Vec::new(),
            Err(DomainError::StreamNotFound { .. }) => {
                return Err(DomainError::AggregateNotFound {
                    aggregate_type: aggregate_type.to_string(),
                    aggregate_id: aggregate_id.to_string(),
                });
            }
            Err(err) => return Err(err),
        };

        for record in records {
            let payload = event_factory
                .get_event(record.event_type(), record.payload().clone())
                .ok_or_else(|| DomainError::UnknownEventType {
                    event_type: record.event_type().to_string(),
                })??;

            let event = EventMessage::from_payload(aggregate_id, payload)
                .with_version(Some(record.version()))
                .with_headers(record.headers().clone());

            aggregate.apply(event, false);
            aggregate.increment_version();
        }

        tracing::debug!(
            version = aggregate.original_version(),
            "aggregate hydrated"
        );
        Ok(aggregate)
    }

    #[tracing::instrument(
        level = "debug",
        skip(self, aggregate),
        fields(
            aggregate_type = aggregate.aggregate_type(),
            aggregate_id = aggregate.aggregate_id()
        )
    )]
    async fn save(
        &self,
        aggregate: &mut dyn AggregateRoot,
        expected_version: Option<usize>,
    ) -> DomainResult<()> {
        let stream_namer = self.stream_namer()?;

        if aggregate.changes().is_empty() {
            return Ok(());
        }

        let aggregate_type = aggregate.aggregate_type();
        let aggregate_id = aggregate.aggregate_id().to_string();
        let stream = stream_namer.stream_name(aggregate_type, &aggregate_id)?;
        let expected = expected_version.unwrap_or_else(|| aggregate.original_version());

        let events: Vec<EventMessage> = aggregate
            .changes()
            .iter()
            .cloned()
            .map(|e| e.with_header(AGGREGATE_ID_HEADER, aggregate_id.clone()))
            .collect();

        let mut headers = Headers::new();
        headers.insert(AGGREGATE_TYPE_HEADER.to_string(), aggregate_type.into());

        match self
            .store
            .save(&stream, &events, Some(expected), &headers)
            .await
        {
            Ok(()) => {}
            Err(DomainError::VersionConflict { actual, .. }) => {
                tracing::warn!(
                    stream = %stream,
                    expected,
                    ?actual,
                    "optimistic concurrency check failed"
                );
                return Err(DomainError::Concurrency {
                    aggregate_type: aggregate_type.to_string(),
                    aggregate_id,
                    expected_version: expected,
                    stream_name: stream,
                });
            }
            Err(err) => return Err(err),
        }

        aggregate.commit_changes_at(expected);

        // 事件已持久化：逐个发布，处理器失败只记录，不影响保存结果
        for (offset, event) in events.into_iter().enumerate() {
            let event = event.with_version(Some(expected + offset + 1));
            if let Err(err) = self.bus.publish_event(&event).await {
                tracing::warn!(
                    stream = %stream,
                    event_type = event.event_type(),
                    version = ?event.version(),
                    error = %err,
                    "event handler failed after commit"
                );
            }
        }

        tracing::debug!(version = aggregate.original_version(), "aggregate saved");
        Ok(())
    }
}
