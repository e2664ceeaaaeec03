use crate::{
    error::DomainResult,
    message::{EventMessage, Headers},
    persist::{EventStore, SerializedEvent},
};
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// 记录型事件存储装饰器
///
/// 总是委托给内部存储；开启记录期间，额外保存每次 `save` 传入的事件副本，
/// 便于测试断言某段操作产生了哪些事件。
pub struct RecordingEventStore<S> {
    inner: S,
    recording: AtomicBool,
    recorded: Mutex<Vec<EventMessage>>,
}

impl<S> RecordingEventStore<S>
where
    S: EventStore,
{
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            recording: AtomicBool::new(false),
            recorded: Mutex::new(Vec::new()),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn start_recording(&self) {
        self.recording.store(true, Ordering::SeqCst);
    }

    pub fn stop_recording(&self) {
        self.recording.store(false, Ordering::SeqCst);
    }

    pub fn is_recording(&self) -> bool {
        self.recording.load(Ordering::SeqCst)
    }

    /// 已记录事件的快照
    pub fn recorded(&self) -> Vec<EventMessage> {
        self.recorded
            .lock()
            .map(|r| r.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub fn reset(&self) {
        match self.recorded.lock() {
            Ok(mut r) => r.clear(),
            Err(poisoned) => poisoned.into_inner().clear(),
        }
    }

    fn record(&self, events: &[EventMessage]) {
        match self.recorded.lock() {
            Ok(mut r) => r.extend_from_slice(events),
            Err(poisoned) => poisoned.into_inner().extend_from_slice(events),
        }
    }
}

#[async_trait]
impl<S> EventStore for RecordingEventStore<S>
where
    S: EventStore,
{
    async fn save(
        &self,
        stream: &str,
        events: &[EventMessage],
        expected_version: Option<usize>,
        headers: &Headers,
    ) -> DomainResult<()> {
        if self.is_recording() {
            self.record(events);
        }
        self.inner
            .save(stream, events, expected_version, headers)
            .await
    }

    async fn load(&self, stream: &str) -> DomainResult<Vec<SerializedEvent>> {
        self.inner.load(stream).await
    }
}
