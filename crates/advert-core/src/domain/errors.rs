//! Errors - エラー型と分類
//!
//! 境界ごとに enum を分ける:
//! - `StoreError`: `AdvertStore` が返すエラー
//! - `PublishError`: `NotificationPublisher` が返すエラー
//! - `LifecycleError`: orchestrator の呼び出し側に見えるエラー
//!
//! `NotFound`（id が存在しない）と `Unavailable`（バックエンド障害）は常に区別する。

use thiserror::Error;

use super::ids::{AdvertId, ParseAdvertIdError};

/// ErrorKind は運用上の分類（ログと HTTP ステータスの対応に使う）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Unavailable,
    Internal,
}

/// ValidationError はクライアント入力の構造エラー
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("price must be a finite, non-negative number (got {0})")]
    InvalidPrice(f64),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("advert not found: {0}")]
    NotFound(AdvertId),

    /// 接続失敗・スロットリング・タイムアウト
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store failure: {0}")]
    Other(String),
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::NotFound(_) => ErrorKind::NotFound,
            StoreError::Unavailable(_) => ErrorKind::Unavailable,
            StoreError::Other(_) => ErrorKind::Internal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishError {
    /// 送信失敗・タイムアウト
    #[error("notification channel unavailable: {0}")]
    Unavailable(String),

    #[error("failed to encode notification: {0}")]
    Encode(String),
}

impl PublishError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PublishError::Unavailable(_) => ErrorKind::Unavailable,
            PublishError::Encode(_) => ErrorKind::Internal,
        }
    }
}

/// LifecycleError は lifecycle 操作の呼び出し側に返すエラー
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LifecycleError {
    /// 呼び出し側が渡した id 文字列をそのまま保持
    #[error("advert not found: {0}")]
    NotFound(String),

    #[error("invalid advert: {0}")]
    Validation(#[from] ValidationError),

    /// それ以外すべて（`kind` は元の分類をログ用に保持）
    #[error("internal error: {message}")]
    Internal { kind: ErrorKind, message: String },
}

impl LifecycleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LifecycleError::NotFound(_) => ErrorKind::NotFound,
            LifecycleError::Validation(_) => ErrorKind::Validation,
            LifecycleError::Internal { kind, .. } => *kind,
        }
    }

    /// アダプタが返すべき HTTP ステータス
    pub fn status_code(&self) -> u16 {
        match self {
            LifecycleError::NotFound(_) => 404,
            LifecycleError::Validation(_) => 400,
            LifecycleError::Internal { .. } => 500,
        }
    }
}

impl From<StoreError> for LifecycleError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => LifecycleError::NotFound(id.to_string()),
            other => LifecycleError::Internal {
                kind: other.kind(),
                message: other.to_string(),
            },
        }
    }
}

impl From<PublishError> for LifecycleError {
    fn from(err: PublishError) -> Self {
        LifecycleError::Internal {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// パースできない id は保存済み advert を指せないので NotFound 扱い
impl From<ParseAdvertIdError> for LifecycleError {
    fn from(err: ParseAdvertIdError) -> Self {
        LifecycleError::NotFound(err.0)
    }
}
