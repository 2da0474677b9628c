//! advert-core
//!
//! Advert lifecycle: create an advert, confirm it once its media is ready,
//! and tell downstream services about the confirmation.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, advert, events, errors）
//! - **ports**: 抽象化レイヤー（AdvertStore, NotificationPublisher, Clock, IdGenerator）
//! - **app**: アプリケーションロジック（builder, lifecycle, health）
//! - **impls**: 実装（InMemoryAdvertStore, InMemoryTopic など開発用）
//! - **config**: 環境変数からの設定読み込み
//! - **observability**: lifecycle カウンタ

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod observability;
pub mod ports;
