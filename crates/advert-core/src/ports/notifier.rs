//! NotificationPublisher port - 確認イベントの配送
//!
//! 配送は at-least-once（consumer は重複を許容すること）。
//! advert をまたいだ順序保証はない。

use async_trait::async_trait;

use crate::domain::{AdvertConfirmed, PublishError};

#[async_trait]
pub trait NotificationPublisher: Send + Sync {
    /// 設定されたチャネルにイベントを 1 件送信
    async fn publish(&self, event: &AdvertConfirmed) -> Result<(), PublishError>;
}
