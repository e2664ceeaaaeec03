//! CQRS / 事件溯源领域层核心库（cqrs-domain）
//!
//! 聚合状态不以快照保存，而是保存为有序、不可变的事件日志：
//! - 聚合（`aggregate`）：标识、版本与未提交事件跟踪，`apply` 同时服务重放与新事件；
//! - 消息（`message`）：事件与命令信封，带类型标签与头部；
//! - 工厂（`factory`）与流命名（`stream_namer`）：类型标签驱动的注册表；
//! - 持久化（`persist`）：事件存储、乐观并发检查与通用仓储；
//! - 事件系统（`eventing`）：进程内发布/订阅。
//!
//! 典型用法：
//! 1. 用 `#[aggregate]`、`#[event]`、`#[command]` 定义聚合、事件与命令；
//! 2. 向 `DelegateAggregateFactory`、`DelegateEventFactory`、`DelegateStreamNamer` 注册类型；
//! 3. 以 `CommonDomainRepository::builder()` 组装仓储，`load` → 业务方法 → `save`。
//!
pub mod aggregate;
pub mod error;
pub mod eventing;
pub mod factory;
pub mod message;
pub mod persist;
pub mod stream_namer;

// 允许在本 crate 内部通过 ::cqrs_domain 进行自引用，
// 以便过程宏在本 crate 的单元测试中也能解析到 ::cqrs_domain 路径。
extern crate self as cqrs_domain;

/// 生成新的聚合 ID（UUID v4 字符串）
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{Aggregate, AggregateRoot, ChangeTracker, Versioned};
    use crate::message::EventMessage;
    use cqrs_macros::{aggregate, event};

    #[event]
    struct Opened {
        owner: String,
    }

    #[aggregate]
    struct Ledger {
        owner: String,
    }

    impl AggregateRoot for Ledger {
        fn apply(&mut self, event: EventMessage, is_new: bool) {
            if let Some(e) = event.downcast_ref::<Opened>() {
                self.owner = e.owner.clone();
            }
            if is_new {
                self.track_change(event);
            }
        }
    }

    #[test]
    fn macros_expand_inside_this_crate() {
        let id = new_id();
        let mut ledger = Ledger::new(id.clone());
        ledger.raise(Opened {
            owner: "alice".into(),
        });

        assert_eq!(Ledger::TYPE, "Ledger");
        assert_eq!(ledger.aggregate_id(), id);
        assert_eq!(ledger.owner, "alice");
        assert_eq!(ledger.changes().len(), 1);
        assert_eq!(ledger.original_version(), 0);
        assert_eq!(ledger.current_version(), 1);
    }

    #[test]
    fn new_ids_are_distinct() {
        assert_ne!(new_id(), new_id());
    }
}
