use crate::{command_handler::CommandHandler, error::AppError};
use async_trait::async_trait;
use cqrs_domain::message::CommandMessage;
use std::sync::Arc;

/// 命令分发器（Dispatcher）
///
/// - 按命令类型标签路由到唯一注册的处理器；
/// - 在调用方任务内执行处理器并返回其结果；
/// - 面向应用的传输层（如 HTTP 处理函数）。
#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn dispatch(&self, command: &CommandMessage) -> Result<(), AppError>;

    /// 为 `command_types` 中的每个命令类型注册处理器，同一类型只允许一个处理器
    fn register_handler(
        &self,
        handler: Arc<dyn CommandHandler>,
        command_types: &[&str],
    ) -> Result<(), AppError>;
}
