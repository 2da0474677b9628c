//! InMemoryTopic - 開発用の通知チャネル
//!
//! 各メッセージは tokio の broadcast で購読者全員に配られ、同時に配送ログにも
//! 残る（テストでは購読者なしでもログで確認できる）。

use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::broadcast;

use super::fault::FaultSwitch;
use crate::domain::{AdvertConfirmed, PublishError};
use crate::ports::NotificationPublisher;

const SUBSCRIBER_BUFFER: usize = 1024;

/// InMemoryTopic はシリアライズ済み `AdvertConfirmed` を運ぶ名前付き pub/sub topic
pub struct InMemoryTopic {
    name: String,
    sender: broadcast::Sender<String>,
    delivered: Mutex<Vec<String>>,
    faults: FaultSwitch,
}

impl InMemoryTopic {
    pub fn new(name: impl Into<String>) -> Self {
        let (sender, _) = broadcast::channel(SUBSCRIBER_BUFFER);
        Self {
            name: name.into(),
            sender,
            delivered: Mutex::new(Vec::new()),
            faults: FaultSwitch::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// この呼び出し以降に publish されたメッセージをすべて受信
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.sender.subscribe()
    }

    /// これまでに受け付けた全メッセージ（publish 順）
    pub fn delivered(&self) -> Vec<String> {
        self.delivered
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn faults(&self) -> &FaultSwitch {
        &self.faults
    }
}

#[async_trait]
impl NotificationPublisher for InMemoryTopic {
    async fn publish(&self, event: &AdvertConfirmed) -> Result<(), PublishError> {
        if !self.faults.admit().await {
            return Err(PublishError::Unavailable(format!(
                "topic {} is unreachable",
                self.name
            )));
        }
        let message = event.to_message()?;
        self.delivered
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(message.clone());
        // No subscribers is not an error; the delivery log still has it.
        let _ = self.sender.send(message);
        Ok(())
    }
}
