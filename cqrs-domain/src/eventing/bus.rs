//! 事件总线（EventBus）协议
//!
//! 发布在调用方任务内同步完成：返回时所有匹配处理器都已执行。
//! 处理器之间不做隔离，第一个失败的处理器错误直接返回给发布方。
//!
use crate::{error::DomainResult as Result, eventing::EventHandler, message::EventMessage};
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait EventBus: Send + Sync {
    /// 投递给该类型的处理器、本地处理器与全局处理器，每个注册各执行一次
    async fn publish_event(&self, event: &EventMessage) -> Result<()>;

    async fn publish_events(&self, events: &[EventMessage]) -> Result<()> {
        for event in events {
            self.publish_event(event).await?;
        }
        Ok(())
    }

    /// 为 `event_types` 中的每个类型标签注册处理器
    fn add_handler(&self, handler: Arc<dyn EventHandler>, event_types: &[&str]) -> Result<()>;

    /// 注册接收全部事件的本地处理器
    fn add_local_handler(&self, handler: Arc<dyn EventHandler>) -> Result<()>;

    /// 注册接收全部事件的全局处理器
    fn add_global_handler(&self, handler: Arc<dyn EventHandler>) -> Result<()>;
}
