//! AdvertStore port - advert レコードの正本（source of truth）
//!
//! 永続 key-value バックエンドならどれでもこの trait の裏に置ける。契約は意味のみ:
//! - `add` は新しい一意な id を割り当て、Pending で保存する
//! - `confirm` はキー単位でアトミックに Pending -> Confirmed にする
//! - `get_all` は遅延スキャン（全件を一度に読まない）
//! - `NotFound` と `Unavailable` は決して混同しない

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::domain::{Advert, AdvertId, ConfirmOutcome, NewAdvert, StoreError};

/// 遅延生成される advert の列。ページ取得に失敗すると `Err` を 1 件返して終わる。
pub type AdvertStream = BoxStream<'static, Result<Advert, StoreError>>;

#[async_trait]
pub trait AdvertStore: Send + Sync {
    /// 新しい advert を Pending で保存し、id を返す
    async fn add(&self, advert: NewAdvert) -> Result<AdvertId, StoreError>;

    /// advert を Confirmed にする
    ///
    /// 再 confirm は冪等で、`AlreadyConfirmed` を返す。
    async fn confirm(
        &self,
        id: AdvertId,
        file_path: Option<String>,
    ) -> Result<ConfirmOutcome, StoreError>;

    async fn get_by_id(&self, id: AdvertId) -> Result<Advert, StoreError>;

    /// status に関係なく全 advert をスキャン（順序は不定）
    fn get_all(&self) -> AdvertStream;

    /// 軽量な疎通確認（何も変更しないこと）
    async fn ping(&self) -> Result<(), StoreError>;
}
