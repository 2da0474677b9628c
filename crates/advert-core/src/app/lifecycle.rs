//! AdvertLifecycle - create / confirm / get の編成
//!
//! # フロー（confirm）
//! 1. AdvertStore::confirm() で Pending -> Confirmed
//! 2. AdvertStore::get_by_id() で title を取得
//! 3. NotificationPublisher::publish() で `{id, title}` を送信
//!
//! 呼び出し側への結果は 1 だけで決まる。2 と 3 は best-effort で、
//! 失敗はログとカウンタに残し、confirm は Ok を返す。

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};

use crate::config::AdvertConfig;
use crate::domain::{
    Advert, AdvertConfirmed, AdvertId, ConfirmOutcome, ErrorKind, LifecycleError, NewAdvert,
    PublishError, StoreError,
};
use crate::observability::{LifecycleCounters, LifecycleCounts};
use crate::ports::{AdvertStore, NotificationPublisher};

/// LifecycleSettings は orchestrator が毎回参照する設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleSettings {
    pub call_timeout: Duration,
    pub publish_on_confirm: bool,
}

impl Default for LifecycleSettings {
    fn default() -> Self {
        Self::from(&AdvertConfig::default())
    }
}

impl From<&AdvertConfig> for LifecycleSettings {
    fn from(config: &AdvertConfig) -> Self {
        Self {
            call_timeout: config.call_timeout,
            publish_on_confirm: config.publish_on_confirm,
        }
    }
}

/// AdvertLifecycle は store と publisher の上で advert lifecycle を編成
///
/// リクエストごとの状態は持たないので、`Arc` で共有して複数タスクから呼べる。
/// 同じ id への競合は store が裁定する。
pub struct AdvertLifecycle {
    store: Arc<dyn AdvertStore>,
    publisher: Arc<dyn NotificationPublisher>,
    settings: LifecycleSettings,
    counters: LifecycleCounters,
}

impl AdvertLifecycle {
    pub fn new(
        store: Arc<dyn AdvertStore>,
        publisher: Arc<dyn NotificationPublisher>,
        settings: LifecycleSettings,
    ) -> Self {
        Self {
            store,
            publisher,
            settings,
            counters: LifecycleCounters::default(),
        }
    }

    pub fn settings(&self) -> LifecycleSettings {
        self.settings
    }

    pub fn counts(&self) -> LifecycleCounts {
        self.counters.snapshot()
    }

    #[tracing::instrument(skip_all, fields(title = %input.title))]
    pub async fn create(&self, input: NewAdvert) -> Result<AdvertId, LifecycleError> {
        if let Err(err) = input.validate() {
            tracing::debug!(error = %err, "rejected advert input");
            return Err(err.into());
        }

        let id = self
            .store_call("add", self.store.add(input))
            .await
            .map_err(|err| store_failure("add", err))?;

        self.counters.record_created();
        tracing::info!(advert_id = %id, "advert created");
        Ok(id)
    }

    /// advert を confirm し、下流の consumer に通知
    ///
    /// Err になるのは store の失敗のときだけ。既に Confirmed の advert の
    /// confirm も成功し、イベントをもう一度 publish する。
    #[tracing::instrument(skip_all, fields(advert_id = %id))]
    pub async fn confirm(
        &self,
        id: AdvertId,
        file_path: Option<String>,
    ) -> Result<(), LifecycleError> {
        let outcome = self
            .store_call("confirm", self.store.confirm(id, file_path))
            .await
            .map_err(|err| store_failure("confirm", err))?;

        match outcome {
            ConfirmOutcome::Confirmed => {
                self.counters.record_confirmed();
                tracing::info!("advert confirmed");
            }
            ConfirmOutcome::AlreadyConfirmed => {
                self.counters.record_reconfirmed();
                tracing::info!("advert was already confirmed");
            }
        }

        if !self.settings.publish_on_confirm {
            self.counters.record_publish_skipped();
            tracing::debug!("notification disabled by configuration");
            return Ok(());
        }

        match self.notify(id).await {
            Ok(()) => {
                self.counters.record_published();
                tracing::debug!("advert confirmed notification published");
            }
            Err(err) => {
                self.counters.record_publish_failed();
                tracing::warn!(
                    error = %err,
                    kind = ?err.kind(),
                    "advert confirmed but notification was not delivered"
                );
            }
        }
        Ok(())
    }

    #[tracing::instrument(skip_all, fields(advert_id = %id))]
    pub async fn get(&self, id: AdvertId) -> Result<Advert, LifecycleError> {
        self.store_call("get_by_id", self.store.get_by_id(id))
            .await
            .map_err(|err| store_failure("get_by_id", err))
    }

    /// 全 advert を stream で返す
    ///
    /// スキャンの各ステップに call timeout を適用する。最初のエラーで stream は終わる。
    pub fn get_all(&self) -> BoxStream<'static, Result<Advert, LifecycleError>> {
        let limit = self.settings.call_timeout;
        let scan = self.store.get_all();
        stream::unfold(Some(scan), move |scan| async move {
            let mut scan = scan?;
            let next = match tokio::time::timeout(limit, scan.next()).await {
                Ok(next) => next?,
                Err(_) => Err(StoreError::Unavailable(timeout_message("get_all", limit))),
            };
            match next {
                Ok(advert) => Some((Ok(advert), Some(scan))),
                Err(err) => Some((Err(store_failure("get_all", err)), None)),
            }
        })
        .boxed()
    }

    /// `get_all` をメモリに集めたもの（1 つのドキュメントで返すアダプタ向け）
    pub async fn list_all(&self) -> Result<Vec<Advert>, LifecycleError> {
        self.get_all().try_collect().await
    }

    async fn notify(&self, id: AdvertId) -> Result<(), LifecycleError> {
        let advert = self
            .store_call("get_by_id", self.store.get_by_id(id))
            .await?;
        let event = AdvertConfirmed::from_advert(&advert);

        let limit = self.settings.call_timeout;
        match tokio::time::timeout(limit, self.publisher.publish(&event)).await {
            Ok(result) => result?,
            Err(_) => return Err(PublishError::Unavailable(timeout_message("publish", limit)).into()),
        }
        Ok(())
    }

    async fn store_call<T, F>(&self, op: &'static str, call: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        let limit = self.settings.call_timeout;
        match tokio::time::timeout(limit, call).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Unavailable(timeout_message(op, limit))),
        }
    }
}

fn timeout_message(op: &str, limit: Duration) -> String {
    format!("{op} timed out after {}ms", limit.as_millis())
}

fn store_failure(op: &'static str, err: StoreError) -> LifecycleError {
    match err.kind() {
        ErrorKind::NotFound => tracing::debug!(op, error = %err, "advert not found"),
        _ => tracing::error!(op, error = %err, "advert store call failed"),
    }
    err.into()
}
