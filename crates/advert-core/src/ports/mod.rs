//! Ports - 抽象化レイヤー
//!
//! 各 trait は外部システム（key-value store, message topic）への
//! インターフェースを提供し、実装の詳細を隠蔽します。

pub mod advert_store;
pub mod clock;
pub mod id_generator;
pub mod notifier;

// 主要な trait を再エクスポート
pub use self::advert_store::{AdvertStore, AdvertStream};
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::notifier::NotificationPublisher;
