//! 工厂注册表（Factory）
//!
//! 类型标签 → 构造函数 的注册表，使仓储在重放与分发时无需静态类型信息即可
//! 实例化具体聚合与事件。重复注册同一标签属于使用错误，不会覆盖已有注册。

mod aggregate_factory;
mod event_factory;

pub use aggregate_factory::{AggregateConstructor, AggregateFactory, DelegateAggregateFactory};
pub use event_factory::{DelegateEventFactory, EventDecoder, EventFactory};
