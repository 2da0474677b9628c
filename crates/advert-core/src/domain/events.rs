//! Events - advert lifecycle が発行するイベント

use serde::{Deserialize, Serialize};

use super::advert::Advert;
use super::errors::PublishError;
use super::ids::AdvertId;

/// AdvertConfirmed は confirm 成功ごとに発行
///
/// JSON はフラットな `{"id": "...", "title": "..."}`（version や envelope なし）。
/// consumer はこの 2 つのキーだけに依存する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvertConfirmed {
    pub id: AdvertId,
    pub title: String,
}

impl AdvertConfirmed {
    pub fn from_advert(advert: &Advert) -> Self {
        Self {
            id: advert.id,
            title: advert.title.clone(),
        }
    }

    pub fn to_message(&self) -> Result<String, PublishError> {
        serde_json::to_string(self).map_err(|e| PublishError::Encode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ulid::Ulid;

    #[test]
    fn message_is_flat_id_and_title() {
        let id = AdvertId::from_ulid(Ulid::new());
        let event = AdvertConfirmed {
            id,
            title: "Bike".to_string(),
        };
        let value: serde_json::Value = serde_json::from_str(&event.to_message().unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "id": id.to_string(), "title": "Bike" })
        );
    }
}
