use crate::error::AppError;
use async_trait::async_trait;
use cqrs_domain::message::CommandMessage;

/// 命令处理器：每种命令类型至多对应一个处理器
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(&self, command: &CommandMessage) -> Result<(), AppError>;
}
