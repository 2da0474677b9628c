//! AppBuilder - アプリケーションの構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）
//! - store / publisher は起動時に一度だけ作って Arc で共有

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::app::health::{HealthProbe, HealthStatus};
use crate::app::lifecycle::{AdvertLifecycle, LifecycleSettings};
use crate::config::{AdvertConfig, ConfigError};
use crate::ports::{AdvertStore, NotificationPublisher};

/// AppBuilder はアプリケーションを構築
///
/// # 使用例
/// ```ignore
/// let app = AppBuilder::new(AdvertConfig::from_env()?)
///     .store(Arc::new(InMemoryAdvertStore::new()))
///     .publisher(Arc::new(InMemoryTopic::new("advert-confirmed")))
///     .build()?;
/// ```
///
/// # Fail-fast 設計
/// - store と publisher の両方が必須
/// - 手で組み立てた AdvertConfig も build() 時に検証する
/// - build() 時に不足や矛盾があれば BuildError を返す
pub struct AppBuilder {
    config: AdvertConfig,
    store: Option<Arc<dyn AdvertStore>>,
    publisher: Option<Arc<dyn NotificationPublisher>>,
}

/// BuildError はアプリケーション構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("no advert store configured. Call AppBuilder::store() before build().")]
    MissingStore,

    #[error("no notification publisher configured. Call AppBuilder::publisher() before build().")]
    MissingPublisher,

    #[error("invalid advert configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

impl AppBuilder {
    /// 新しい AppBuilder を作成
    pub fn new(config: AdvertConfig) -> Self {
        Self {
            config,
            store: None,
            publisher: None,
        }
    }

    /// advert store を登録
    pub fn store(mut self, store: Arc<dyn AdvertStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// 通知先の publisher を登録
    pub fn publisher(mut self, publisher: Arc<dyn NotificationPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    /// App を構築（検証込み）
    pub fn build(self) -> Result<App, BuildError> {
        let store = self.store.ok_or(BuildError::MissingStore)?;
        let publisher = self.publisher.ok_or(BuildError::MissingPublisher)?;
        self.config.validate()?;

        let call_timeout_ms =
            u64::try_from(self.config.call_timeout.as_millis()).unwrap_or(u64::MAX);
        tracing::info!(
            topic = %self.config.topic,
            table = %self.config.store.table_name,
            publish_on_confirm = self.config.publish_on_confirm,
            call_timeout_ms,
            "advert service wired"
        );

        let settings = LifecycleSettings::from(&self.config);
        let health = HealthProbe::new(store.clone(), self.config.health_timeout);
        Ok(App {
            lifecycle: Arc::new(AdvertLifecycle::new(store, publisher, settings)),
            health,
            config: self.config,
        })
    }
}

/// App はアプリケーションのランタイム
///
/// アダプタ（HTTP, CLI など）はこれを 1 つ持ち、`lifecycle` を呼び出す。
pub struct App {
    pub lifecycle: Arc<AdvertLifecycle>,
    pub health: HealthProbe,
    pub config: AdvertConfig,
}

impl App {
    /// `config.health_interval` ごとの定期 health check を開始
    ///
    /// 返した Receiver をすべて drop するとタスクは終了する。
    pub fn spawn_health(&self) -> (watch::Receiver<HealthStatus>, JoinHandle<()>) {
        self.health.clone().spawn_periodic(self.config.health_interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewAdvert;
    use crate::impls::{InMemoryAdvertStore, InMemoryTopic};
    use std::time::Duration;

    #[test]
    fn test_build_success() {
        let app = AppBuilder::new(AdvertConfig::default())
            .store(Arc::new(InMemoryAdvertStore::new()))
            .publisher(Arc::new(InMemoryTopic::new("advert-confirmed")))
            .build();
        assert!(app.is_ok());
    }

    #[test]
    fn test_build_missing_store() {
        let app = AppBuilder::new(AdvertConfig::default())
            .publisher(Arc::new(InMemoryTopic::new("advert-confirmed")))
            .build();
        assert!(matches!(app, Err(BuildError::MissingStore)));
    }

    #[test]
    fn test_build_missing_publisher() {
        let app = AppBuilder::new(AdvertConfig::default())
            .store(Arc::new(InMemoryAdvertStore::new()))
            .build();
        assert!(matches!(app, Err(BuildError::MissingPublisher)));
    }

    #[test]
    fn test_build_rejects_inconsistent_config() {
        let config = AdvertConfig {
            topic: String::new(),
            call_timeout: Duration::ZERO,
            publish_on_confirm: true,
            ..AdvertConfig::default()
        };
        let app = AppBuilder::new(config)
            .store(Arc::new(InMemoryAdvertStore::new()))
            .publisher(Arc::new(InMemoryTopic::new("advert-confirmed")))
            .build();
        assert!(matches!(
            app,
            Err(BuildError::InvalidConfig(ConfigError::Empty(_)))
        ));

        let config = AdvertConfig {
            call_timeout: Duration::ZERO,
            ..AdvertConfig::default()
        };
        let app = AppBuilder::new(config)
            .store(Arc::new(InMemoryAdvertStore::new()))
            .publisher(Arc::new(InMemoryTopic::new("advert-confirmed")))
            .build();
        assert!(matches!(
            app,
            Err(BuildError::InvalidConfig(ConfigError::Zero(_)))
        ));
    }

    #[tokio::test]
    async fn test_spawn_health_uses_configured_interval() {
        let config = AdvertConfig {
            health_interval: Duration::from_millis(10),
            health_timeout: Duration::from_millis(100),
            ..AdvertConfig::default()
        };
        let store = Arc::new(InMemoryAdvertStore::new());
        let app = AppBuilder::new(config)
            .store(store.clone())
            .publisher(Arc::new(InMemoryTopic::new("advert-confirmed")))
            .build()
            .unwrap();

        let (mut rx, handle) = app.spawn_health();
        rx.wait_for(|s| s.is_healthy()).await.unwrap();
        store.faults().set_available(false);
        // 10ms 間隔なので次の tick で Unhealthy になる
        tokio::time::timeout(Duration::from_secs(1), rx.wait_for(|s| !s.is_healthy()))
            .await
            .unwrap()
            .unwrap();

        drop(rx);
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_config_flows_into_lifecycle() {
        let config = AdvertConfig {
            call_timeout: Duration::from_millis(123),
            publish_on_confirm: false,
            ..AdvertConfig::default()
        };
        let topic = Arc::new(InMemoryTopic::new("advert-confirmed"));
        let app = AppBuilder::new(config)
            .store(Arc::new(InMemoryAdvertStore::new()))
            .publisher(topic.clone())
            .build()
            .unwrap();

        assert_eq!(
            app.lifecycle.settings(),
            LifecycleSettings {
                call_timeout: Duration::from_millis(123),
                publish_on_confirm: false,
            }
        );

        let id = app.lifecycle.create(NewAdvert::new("Bike", 100.0)).await.unwrap();
        app.lifecycle.confirm(id, None).await.unwrap();
        assert!(topic.delivered().is_empty());
        assert!(app.health.check().await.is_healthy());
    }
}
