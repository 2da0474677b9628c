//! Advert identifier.
//!
//! id は作成時に store が割り当てる ULID。テキスト形式は `advert-<ULID>` で、
//! 通知にもこの形式で載るので、下流の consumer には不透明な文字列にしか見えない。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

const PREFIX: &str = "advert-";

/// AdvertId は Advert の識別子（割り当て後は不変）
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct AdvertId(Ulid);

impl AdvertId {
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self(ulid)
    }

    pub fn as_ulid(&self) -> Ulid {
        self.0
    }
}

impl From<Ulid> for AdvertId {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl fmt::Display for AdvertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", PREFIX, self.0)
    }
}

/// 呼び出し側が渡した id が advert id として不正なときのエラー
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid advert id: {0:?}")]
pub struct ParseAdvertIdError(pub String);

impl FromStr for AdvertId {
    type Err = ParseAdvertIdError;

    /// `advert-<ULID>` と素の ULID の両方を受け付ける
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.strip_prefix(PREFIX).unwrap_or(s);
        Ulid::from_string(raw)
            .map(Self::from_ulid)
            .map_err(|_| ParseAdvertIdError(s.to_string()))
    }
}

impl From<AdvertId> for String {
    fn from(id: AdvertId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for AdvertId {
    type Error = ParseAdvertIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
