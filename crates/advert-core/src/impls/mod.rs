//! Impls - 実装（開発用・テスト用）
//!
//! このモジュールには ports の実装を含めます。
//!
//! # 含まれる実装
//! - **InMemoryAdvertStore**: BTreeMap ベースの advert store
//! - **InMemoryTopic**: broadcast ベースの通知チャネル
//! - **FaultSwitch**: 上記 2 つの障害・遅延シミュレーション

pub mod fault;
pub mod inmem_store;
pub mod inmem_topic;

// 主要な型を再エクスポート
pub use self::fault::FaultSwitch;
pub use self::inmem_store::InMemoryAdvertStore;
pub use self::inmem_topic::InMemoryTopic;
