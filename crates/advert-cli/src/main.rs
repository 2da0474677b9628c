use std::sync::Arc;

use anyhow::Context;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

use advert_core::app::AppBuilder;
use advert_core::config::AdvertConfig;
use advert_core::domain::{AdvertId, NewAdvert};
use advert_core::impls::{InMemoryAdvertStore, InMemoryTopic};
use advert_core::ports::{SystemClock, UlidGenerator};

/// JSON logs by default, `ADVERT_LOG_FORMAT=text` for humans. Filter via RUST_LOG.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let text = std::env::var("ADVERT_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("text"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);
    let _ = if text {
        builder.try_init()
    } else {
        builder.json().try_init()
    };
}

/// topic を購読して表示。遅れて取りこぼした分は warn を出して読み続ける。
async fn consume(mut rx: broadcast::Receiver<String>) -> usize {
    let mut received = 0;
    loop {
        match rx.recv().await {
            Ok(message) => {
                received += 1;
                println!("consumer received: {message}");
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "consumer fell behind the topic");
            }
            Err(RecvError::Closed) => break,
        }
    }
    received
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    // (A) 設定と依存を用意（起動時に一度だけ作る）
    let config = AdvertConfig::from_env().context("invalid ADVERT_* configuration")?;
    let store = Arc::new(InMemoryAdvertStore::with_parts(
        Arc::new(SystemClock),
        Arc::new(UlidGenerator::new(SystemClock)),
        config.store.page_size,
    ));
    let topic = Arc::new(InMemoryTopic::new(config.topic.clone()));

    let app = AppBuilder::new(config)
        .store(store.clone())
        .publisher(topic.clone())
        .build()?;

    // (B) 下流サービスの代わりに topic を購読して表示
    let consumer = tokio::spawn(consume(topic.subscribe()));

    // (C) health probe（起動時に 1 回 + health_interval ごとにバックグラウンドで）
    let health = app.health.check().await;
    println!("health: {health:?}");
    let (health_rx, health_task) = app.spawn_health();

    // (D) create -> get -> confirm -> get
    let id = app
        .lifecycle
        .create(
            NewAdvert::new("Bike", 100.0)
                .with_description("Barely used road bike")
                .with_category("sports"),
        )
        .await?;
    println!("created: {id}");

    let pending = app.lifecycle.get(id).await?;
    println!("before confirm: {}", serde_json::to_string(&pending)?);

    app.lifecycle
        .confirm(id, Some(format!("adverts/{id}/photo.jpg")))
        .await?;
    let confirmed = app.lifecycle.get(id).await?;
    println!("after confirm: {}", serde_json::to_string(&confirmed)?);

    // (E) 存在しない id は 404 になる
    let missing = "advert-01ARZ3NDEKTSV4RRFFQ69G5FAV"
        .parse::<AdvertId>()
        .context("demo id must parse")?;
    if let Err(err) = app.lifecycle.get(missing).await {
        println!("lookup of {missing}: {} ({err})", err.status_code());
    }

    let all = app.lifecycle.list_all().await?;
    println!("all adverts: {}", all.len());
    println!("counts: {:?}", app.lifecycle.counts());
    println!("latest periodic health: {:?}", *health_rx.borrow());

    // (F) サンプルなので health probe と consumer を止める
    drop(health_rx);
    health_task.await.context("health task panicked")?;
    drop(app);
    drop(topic);
    drop(store);
    let received = consumer.await.context("consumer task panicked")?;
    tracing::info!(received, "consumer stopped");
    tracing::info!("demo finished");
    Ok(())
}
