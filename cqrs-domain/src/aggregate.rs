//! 聚合（Aggregate）抽象
//!
//! 聚合的状态完全由其事件历史推导：
//! - `AggregateBase` 持有标识、版本与未提交事件；
//! - `Versioned` / `ChangeTracker` 是委托给 `AggregateBase` 的能力接口；
//! - 具体聚合只需提供 `apply` 状态转换函数（重放与新事件共用），
//!   以及可选的 `handle` 命令处理。
//!
use crate::error::{DomainError, DomainResult};
use crate::message::{CommandMessage, Event, EventMessage};
use std::any::Any;

/// 聚合公共状态
///
/// `version` 为已持久化（加载时重放或保存成功）的事件数量，新聚合为 0；
/// 未提交事件只提升内存中的当前版本。
#[derive(Debug, Default, Clone)]
pub struct AggregateBase {
    id: String,
    version: usize,
    changes: Vec<EventMessage>,
}

impl AggregateBase {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: 0,
            changes: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn version(&self) -> usize {
        self.version
    }

    pub fn increment_version(&mut self) {
        self.version += 1;
    }

    pub fn track_change(&mut self, event: EventMessage) {
        self.changes.push(event);
    }

    pub fn changes(&self) -> &[EventMessage] {
        &self.changes
    }

    pub fn clear_changes(&mut self) {
        self.changes.clear();
    }

    /// 取出全部未提交事件并将版本推进相同数量
    pub fn commit_changes(&mut self) -> Vec<EventMessage> {
        self.commit_changes_at(self.version)
    }

    /// 以 `base_version` 为起点提交：事件追加在流的该版本之后，提交后版本等于流版本
    pub fn commit_changes_at(&mut self, base_version: usize) -> Vec<EventMessage> {
        let committed = std::mem::take(&mut self.changes);
        self.version = base_version + committed.len();
        committed
    }
}

/// 版本能力
pub trait Versioned {
    /// 加载（或上次保存成功）时的版本，即保存时的乐观并发前置条件
    fn original_version(&self) -> usize;

    /// 原始版本加上未提交事件数
    fn current_version(&self) -> usize;

    fn increment_version(&mut self);
}

/// 未提交事件跟踪能力
pub trait ChangeTracker {
    fn track_change(&mut self, event: EventMessage);

    fn changes(&self) -> &[EventMessage];

    fn clear_changes(&mut self);

    fn commit_changes(&mut self) -> Vec<EventMessage>;

    fn commit_changes_at(&mut self, base_version: usize) -> Vec<EventMessage>;
}

/// 聚合持有 `AggregateBase` 并暴露给框架的部分，通常由 `#[aggregate]` 宏生成
pub trait AggregateState: Any + Send + Sync {
    fn aggregate_type(&self) -> &'static str;

    fn base(&self) -> &AggregateBase;

    fn base_mut(&mut self) -> &mut AggregateBase;

    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T> Versioned for T
where
    T: AggregateState,
{
    fn original_version(&self) -> usize {
        self.base().version()
    }

    fn current_version(&self) -> usize {
        self.base().version() + self.base().changes().len()
    }

    fn increment_version(&mut self) {
        self.base_mut().increment_version();
    }
}

impl<T> ChangeTracker for T
where
    T: AggregateState,
{
    fn track_change(&mut self, event: EventMessage) {
        self.base_mut().track_change(event);
    }

    fn changes(&self) -> &[EventMessage] {
        self.base().changes()
    }

    fn clear_changes(&mut self) {
        self.base_mut().clear_changes();
    }

    fn commit_changes(&mut self) -> Vec<EventMessage> {
        self.base_mut().commit_changes()
    }

    fn commit_changes_at(&mut self, base_version: usize) -> Vec<EventMessage> {
        self.base_mut().commit_changes_at(base_version)
    }
}

/// 聚合根接口（对象安全，仓储以 `Box<dyn AggregateRoot>` 处理任意聚合）
pub trait AggregateRoot: AggregateState + Versioned + ChangeTracker {
    fn aggregate_id(&self) -> &str {
        self.base().id()
    }

    /// 应用事件更新业务状态；`is_new` 为真时还须调用 `track_change`。
    ///
    /// 重放（`is_new = false`）与新事件（`is_new = true`）共用同一个状态转换函数，
    /// 同一事件序列总能得到同一状态。
    fn apply(&mut self, event: EventMessage, is_new: bool);

    /// 处理命令：校验业务规则并通过 `raise` 产生新事件
    fn handle(&mut self, command: &CommandMessage) -> DomainResult<()> {
        Err(DomainError::UnsupportedCommand {
            aggregate_type: self.aggregate_type().to_string(),
            command_type: command.command_type().to_string(),
        })
    }

    /// 以新事件身份应用事件载荷
    fn raise<E>(&mut self, event: E)
    where
        E: Event,
        Self: Sized,
    {
        let message = EventMessage::new(self.aggregate_id().to_string(), event);
        self.apply(message, true);
    }
}

/// 具备静态类型标签与构造函数的聚合，用于类型化注册与加载
pub trait Aggregate: AggregateRoot + Sized {
    const TYPE: &'static str;

    fn new(id: String) -> Self;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Created {
        name: String,
    }

    impl Event for Created {
        const TYPE: &'static str = "Created";
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Renamed {
        name: String,
    }

    impl Event for Renamed {
        const TYPE: &'static str = "Renamed";
    }

    #[derive(Debug, Default)]
    struct Item {
        base: AggregateBase,
        name: String,
        renames: usize,
    }

    impl AggregateState for Item {
        fn aggregate_type(&self) -> &'static str {
            "Item"
        }
        fn base(&self) -> &AggregateBase {
            &self.base
        }
        fn base_mut(&mut self) -> &mut AggregateBase {
            &mut self.base
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn into_any(self: Box<Self>) -> Box<dyn Any> {
            self
        }
    }

    impl AggregateRoot for Item {
        fn apply(&mut self, event: EventMessage, is_new: bool) {
            if let Some(e) = event.downcast_ref::<Created>() {
                self.name = e.name.clone();
            } else if let Some(e) = event.downcast_ref::<Renamed>() {
                self.name = e.name.clone();
                self.renames += 1;
            }
            if is_new {
                self.track_change(event);
            }
        }
    }

    impl Aggregate for Item {
        const TYPE: &'static str = "Item";

        fn new(id: String) -> Self {
            Self {
                base: AggregateBase::new(id),
                ..Default::default()
            }
        }
    }

    fn history(id: &str) -> Vec<EventMessage> {
        vec![
            EventMessage::new(id, Created { name: "A".into() }),
            EventMessage::new(id, Renamed { name: "B".into() }),
            EventMessage::new(id, Renamed { name: "C".into() }),
        ]
    }

    fn replay(id: &str) -> Item {
        let mut item = Item::new(id.to_string());
        for e in history(id) {
            item.apply(e, false);
            item.increment_version();
        }
        item
    }

    #[test]
    fn new_aggregate_starts_at_version_zero() {
        let item = Item::new("i-1".into());
        assert_eq!(item.aggregate_id(), "i-1");
        assert_eq!(item.original_version(), 0);
        assert_eq!(item.current_version(), 0);
        assert!(item.changes().is_empty());
    }

    #[test]
    fn replay_is_deterministic() {
        let first = replay("i-1");
        let second = replay("i-1");
        assert_eq!(first.name, "C");
        assert_eq!(first.name, second.name);
        assert_eq!(first.renames, second.renames);
        assert_eq!(first.original_version(), 3);
        assert_eq!(second.original_version(), 3);
        assert!(first.changes().is_empty());
    }

    #[test]
    fn raised_events_are_tracked_but_not_persisted_version() {
        let mut item = replay("i-1");
        item.raise(Renamed { name: "D".into() });

        assert_eq!(item.name, "D");
        assert_eq!(item.original_version(), 3);
        assert_eq!(item.current_version(), 4);
        assert_eq!(item.changes().len(), 1);
        assert_eq!(item.changes()[0].event_type(), "Renamed");
        assert_eq!(item.changes()[0].aggregate_id(), "i-1");
    }

    #[test]
    fn commit_changes_advances_version_and_clear_does_not() {
        let mut item = Item::new("i-2".into());
        item.raise(Created { name: "A".into() });
        item.raise(Renamed { name: "B".into() });

        let committed = item.commit_changes();
        assert_eq!(committed.len(), 2);
        assert_eq!(item.original_version(), 2);
        assert!(item.changes().is_empty());

        item.raise(Renamed { name: "C".into() });
        item.clear_changes();
        assert_eq!(item.original_version(), 2);
        assert_eq!(item.current_version(), 2);
    }

    #[test]
    fn commit_at_explicit_base_aligns_with_stream() {
        let mut item = Item::new("i-4".into());
        item.raise(Created { name: "A".into() });

        let committed = item.commit_changes_at(3);
        assert_eq!(committed.len(), 1);
        assert_eq!(item.original_version(), 4);
        assert_eq!(item.current_version(), 4);
    }

    #[test]
    fn default_handle_rejects_commands() {
        #[derive(Debug)]
        struct Ping;
        impl crate::message::Command for Ping {
            const NAME: &'static str = "Ping";
        }

        let mut item = Item::new("i-3".into());
        let err = item.handle(&CommandMessage::new("i-3", Ping)).unwrap_err();
        match err {
            DomainError::UnsupportedCommand {
                aggregate_type,
                command_type,
            } => {
                assert_eq!(aggregate_type, "Item");
                assert_eq!(command_type, "Ping");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn boxed_root_downcasts_to_concrete_type() {
        let boxed: Box<dyn AggregateRoot> = Box::new(replay("i-4"));
        assert_eq!(boxed.original_version(), 3);
        let item = boxed
            .into_any()
            .downcast::<Item>()
            .expect("concrete aggregate");
        assert_eq!(item.name, "C");
    }
}
