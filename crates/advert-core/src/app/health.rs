//! HealthProbe - advert store の疎通確認
//!
//! リクエスト経路とは独立。`check()` で都度確認するか、`spawn_periodic()` で
//! `watch` チャネルを最新に保つ。

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::ports::AdvertStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Unhealthy(String),
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }
}

#[derive(Clone)]
pub struct HealthProbe {
    store: Arc<dyn AdvertStore>,
    timeout: Duration,
}

impl HealthProbe {
    pub fn new(store: Arc<dyn AdvertStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// タイムアウト付きの疎通確認を 1 回（advert データには触れない）
    #[tracing::instrument(skip_all)]
    pub async fn check(&self) -> HealthStatus {
        let status = match tokio::time::timeout(self.timeout, self.store.ping()).await {
            Ok(Ok(())) => HealthStatus::Healthy,
            Ok(Err(err)) => HealthStatus::Unhealthy(err.to_string()),
            Err(_) => HealthStatus::Unhealthy(format!(
                "store did not answer within {}ms",
                self.timeout.as_millis()
            )),
        };
        if let HealthStatus::Unhealthy(reason) = &status {
            tracing::warn!(%reason, "advert store unhealthy");
        }
        status
    }

    /// `interval` ごとに確認し、最新の状態を publish
    ///
    /// 初回はすぐに実行する。Receiver がすべて drop されるとタスクは終了する。
    pub fn spawn_periodic(
        self,
        interval: Duration,
    ) -> (watch::Receiver<HealthStatus>, JoinHandle<()>) {
        let (tx, rx) = watch::channel(HealthStatus::Unhealthy("not checked yet".to_string()));
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = tx.closed() => break,
                }
                let status = self.check().await;
                tx.send_if_modified(|current| {
                    if *current == status {
                        false
                    } else {
                        *current = status;
                        true
                    }
                });
            }
            tracing::debug!("health probe stopped");
        });
        (rx, handle)
    }
}
