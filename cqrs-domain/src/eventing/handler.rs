//! 事件处理器（EventHandler）
//!
use crate::error::DomainResult;
use crate::message::EventMessage;
use async_trait::async_trait;

/// 事件处理器：消费总线发布的事件
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// 处理器名称（用于日志与错误定位）
    fn handler_name(&self) -> &str;

    async fn handle(&self, event: &EventMessage) -> DomainResult<()>;
}
