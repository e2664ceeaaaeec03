//! 持久化与事件溯源（persist）
//!
//! - `EventStore`：只追加事件日志协议，带期望版本的乐观并发检查；
//! - `InMemoryEventStore`：参考实现；
//! - `StreamingEventStore`：经 `StreamTransport` 适配远程存储的流式实现；
//! - `RecordingEventStore`：记录保存事件的装饰器；
//! - `CommonDomainRepository`：加载（重放）与保存（追加 + 发布）聚合。
//!
mod event_store;
mod event_store_inmemory;
mod event_store_recording;
mod event_store_streaming;
mod repository;
mod serialized_event;

pub use event_store::EventStore;
pub use event_store_inmemory::InMemoryEventStore;
pub use event_store_recording::RecordingEventStore;
pub use event_store_streaming::{
    OutgoingEvent, RawRecord, ReadItem, ResponseMeta, StreamTransport, StreamingEventStore,
    StreamingEventStoreConfig, TransportError,
};
pub use repository::{CommonDomainRepository, DomainRepository, DomainRepositoryExt};
pub use serialized_event::SerializedEvent;
