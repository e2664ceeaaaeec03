//! CQRS 应用层（cqrs-application）
//!
//! 命令侧编排：
//! - `Dispatcher`：按命令类型标签路由到唯一处理器；
//! - `CommandHandler`：处理命令的协议；
//! - `AggregateCommandHandler`：加载聚合、交由聚合处理命令并保存。
//!
pub mod aggregate_command_handler;
pub mod command_handler;
pub mod dispatcher;
pub mod error;
pub mod inmemory_dispatcher;

pub use aggregate_command_handler::AggregateCommandHandler;
pub use inmemory_dispatcher::InMemoryDispatcher;
