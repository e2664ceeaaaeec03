//! 事件子系统（eventing）
//!
//! 进程内发布/订阅：
//! - `EventBus`：发布与处理器注册协议；
//! - `EventHandler`：消费事件的处理器；
//! - `InMemoryEventBus`：按类型标签路由，附加本地/全局兜底处理器集合。
//!
//! 仓储只在事件成功追加后发布，订阅者不会看到未持久化的事件。
//!
pub mod bus;
pub mod bus_inmemory;
pub mod handler;

pub use bus::EventBus;
pub use bus_inmemory::InMemoryEventBus;
pub use handler::EventHandler;
