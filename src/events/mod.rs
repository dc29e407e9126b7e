// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use tokio::sync::broadcast;

pub mod progress;

pub use progress::{EventCode, EventKind, ProgressEvent};

/// 事件总线
///
/// 基于 `tokio::sync::broadcast` 的单通道事件广播。发送是
/// fire-and-forget：没有订阅者或订阅者滞后都不会阻塞流水线，
/// 断开的客户端会静默错过事件，不提供回放。
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ProgressEvent>,
}

impl EventBus {
    /// 创建新的事件总线
    ///
    /// # 参数
    ///
    /// * `capacity` - 广播通道容量，超出后最旧的事件被丢弃
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// 发布一个进度事件
    ///
    /// 没有接收者时发送失败，按契约静默忽略
    pub fn emit(&self, event: ProgressEvent) {
        tracing::debug!(code = ?event.code, "progress event emitted");
        let _ = self.tx.send(event);
    }

    /// 订阅事件流
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_emit_without_subscribers_does_not_panic() {
        let bus = EventBus::new(8);
        bus.emit(ProgressEvent::browser_initiated());
    }

    #[tokio::test]
    async fn test_subscriber_receives_events_in_emission_order() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();
        bus.emit(ProgressEvent::browser_initiated());
        bus.emit(ProgressEvent::browser_closed());

        assert_eq!(rx.recv().await.unwrap().code, EventCode::BrowserInitiated);
        assert_eq!(rx.recv().await.unwrap().code, EventCode::BrowserClosed);
    }
}
