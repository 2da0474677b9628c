//! Advert - advert レコードと状態遷移

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::ValidationError;
use super::ids::AdvertId;

/// AdvertStatus は advert の状態
///
/// # 状態遷移
/// - Pending -> Confirmed
///
/// Pending に戻ることはなく、他の状態もない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdvertStatus {
    /// 作成済み、メディア処理の完了待ち
    Pending,

    /// クライアントが確認済み（下流サービスへ通知済み）
    Confirmed,
}

impl AdvertStatus {
    /// 終端状態か（これ以上遷移しない）
    pub fn is_terminal(self) -> bool {
        matches!(self, AdvertStatus::Confirmed)
    }
}

/// NewAdvert は advert 作成時のクライアント入力
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewAdvert {
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub price: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl NewAdvert {
    pub fn new(title: impl Into<String>, price: f64) -> Self {
        Self {
            title: title.into(),
            price,
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// 構造チェックのみ（空でない title と有効な price）
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingField("title"));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(ValidationError::InvalidPrice(self.price));
        }
        Ok(())
    }
}

/// Advert は保存済みの advert レコード
///
/// `status` / `confirmed_at` / `file_path` 以外は作成時に確定する。
/// この 3 つは最初の confirm で一度だけ、まとめて変わる。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advert {
    pub id: AdvertId,
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub price: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,

    pub status: AdvertStatus,

    pub created_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed_at: Option<DateTime<Utc>>,

    /// 処理済みメディアの参照（confirm 時に記録）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

impl Advert {
    pub fn new(id: AdvertId, input: NewAdvert, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: input.title,
            description: input.description,
            price: input.price,
            category: input.category,
            metadata: input.metadata,
            status: AdvertStatus::Pending,
            created_at,
            confirmed_at: None,
            file_path: None,
        }
    }

    /// confirm を適用
    ///
    /// 最初の呼び出しで status を切り替え、時刻とメディア参照を記録する。
    /// 2 回目以降はレコードを変更しない。
    pub fn confirm(&mut self, file_path: Option<String>, now: DateTime<Utc>) -> ConfirmOutcome {
        if self.status.is_terminal() {
            return ConfirmOutcome::AlreadyConfirmed;
        }
        self.status = AdvertStatus::Confirmed;
        self.confirmed_at = Some(now);
        self.file_path = file_path;
        ConfirmOutcome::Confirmed
    }
}

/// ConfirmOutcome は confirm がレコードに何をしたか
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// この呼び出しで Pending -> Confirmed になった
    Confirmed,

    /// 既に Confirmed だった（変更なし）
    AlreadyConfirmed,
}
