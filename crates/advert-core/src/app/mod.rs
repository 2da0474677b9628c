//! App - アプリケーション層
//!
//! このモジュールは、ports を組み合わせてアプリケーションロジックを実装します。
//!
//! # 主要コンポーネント
//! - **AppBuilder**: アプリケーションの構築とワイヤリング
//! - **AdvertLifecycle**: create / confirm / get / get_all
//! - **HealthProbe**: store の疎通確認

pub mod builder;
pub mod health;
pub mod lifecycle;

// 主要な型を再エクスポート
pub use self::builder::{App, AppBuilder, BuildError};
pub use self::health::{HealthProbe, HealthStatus};
pub use self::lifecycle::{AdvertLifecycle, LifecycleSettings};
