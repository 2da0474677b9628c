//! FaultSwitch - in-memory バックエンド共通の障害・遅延スイッチ

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

/// テストでバックエンドを作り直さずに停止・遅延させる
#[derive(Debug)]
pub struct FaultSwitch {
    available: AtomicBool,
    latency_ms: AtomicU64,
}

impl FaultSwitch {
    pub fn new() -> Self {
        Self {
            available: AtomicBool::new(true),
            latency_ms: AtomicU64::new(0),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    pub fn set_latency(&self, latency: Duration) {
        let ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
        self.latency_ms.store(ms, Ordering::SeqCst);
    }

    /// 設定された遅延だけ待ち、呼び出しを通してよいかを返す
    pub async fn admit(&self) -> bool {
        let ms = self.latency_ms.load(Ordering::SeqCst);
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
        self.is_available()
    }
}

impl Default for FaultSwitch {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn outage_rejects_calls() {
        let switch = FaultSwitch::new();
        assert!(switch.admit().await);
        switch.set_available(false);
        assert!(!switch.admit().await);
        switch.set_available(true);
        assert!(switch.admit().await);
    }

    #[tokio::test]
    async fn latency_delays_calls() {
        let switch = FaultSwitch::new();
        switch.set_latency(Duration::from_millis(50));
        let start = tokio::time::Instant::now();
        assert!(switch.admit().await);
        assert!(start.elapsed() >= Duration::from_millis(50));
    }
}
