//! 消息信封（Message）
//!
//! 事件（`EventMessage`，已发生的事实）与命令（`CommandMessage`，变更请求）
//! 共用同一形态：目标聚合 ID、带类型标签的载荷、可扩展的头部集合。
//! 类型标签来自 `Event::TYPE` / `Command::NAME` 常量，不依赖运行时反射。

mod command;
mod event;
mod headers;

pub use command::{Command, CommandMessage, CommandPayload};
pub use event::{Event, EventMessage, EventPayload};
pub use headers::{AGGREGATE_ID_HEADER, AGGREGATE_TYPE_HEADER, Headers};
