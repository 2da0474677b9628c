//! InMemoryAdvertStore - 開発用・テスト用の advert store
//!
//! # 実装詳細
//! - BTreeMap<AdvertId, Advert> を tokio::sync::Mutex で保護
//! - confirm はロック内で read-modify-write するので、同じ id への並行 confirm
//!   でも Confirmed になるのは 1 回だけ
//! - get_all はページ単位のスキャン（id 順のカーソル）で、全件を一度に
//!   コピーしない

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use tokio::sync::Mutex;

use super::fault::FaultSwitch;
use crate::domain::{Advert, AdvertId, ConfirmOutcome, NewAdvert, StoreError};
use crate::ports::{AdvertStore, AdvertStream, Clock, IdGenerator, SystemClock, UlidGenerator};

pub const DEFAULT_PAGE_SIZE: usize = 100;

struct StoreState {
    records: Mutex<BTreeMap<AdvertId, Advert>>,
    faults: FaultSwitch,
    page_size: usize,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl StoreState {
    async fn check(&self) -> Result<(), StoreError> {
        if self.faults.admit().await {
            Ok(())
        } else {
            Err(StoreError::Unavailable("in-memory store is offline".to_string()))
        }
    }

    async fn scan_page(&self, after: Option<AdvertId>) -> Result<Vec<Advert>, StoreError> {
        self.check().await?;
        let records = self.records.lock().await;
        let lower = match after {
            Some(id) => Bound::Excluded(id),
            None => Bound::Unbounded,
        };
        Ok(records
            .range((lower, Bound::Unbounded))
            .take(self.page_size)
            .map(|(_, advert)| advert.clone())
            .collect())
    }
}

/// ページ間のスキャン位置
enum Cursor {
    Start,
    After(AdvertId),
    Done,
}

/// InMemoryAdvertStore はメモリ上の advert store
///
/// clone は安価で、clone 同士は同じレコードを共有する。
#[derive(Clone)]
pub struct InMemoryAdvertStore {
    state: Arc<StoreState>,
}

impl InMemoryAdvertStore {
    pub fn new() -> Self {
        Self::with_parts(
            Arc::new(SystemClock),
            Arc::new(UlidGenerator::new(SystemClock)),
            DEFAULT_PAGE_SIZE,
        )
    }

    /// clock / id generator / スキャンのページサイズを指定して作成
    pub fn with_parts(clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>, page_size: usize) -> Self {
        Self {
            state: Arc::new(StoreState {
                records: Mutex::new(BTreeMap::new()),
                faults: FaultSwitch::new(),
                page_size: page_size.max(1),
                clock,
                ids,
            }),
        }
    }

    pub fn with_page_size(page_size: usize) -> Self {
        Self::with_parts(
            Arc::new(SystemClock),
            Arc::new(UlidGenerator::new(SystemClock)),
            page_size,
        )
    }

    /// 障害・遅延の切り替え
    pub fn faults(&self) -> &FaultSwitch {
        &self.state.faults
    }

    pub async fn len(&self) -> usize {
        self.state.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for InMemoryAdvertStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AdvertStore for InMemoryAdvertStore {
    async fn add(&self, advert: NewAdvert) -> Result<AdvertId, StoreError> {
        self.state.check().await?;
        let mut records = self.state.records.lock().await;
        let mut id = self.state.ids.generate_advert_id();
        while records.contains_key(&id) {
            id = self.state.ids.generate_advert_id();
        }
        records.insert(id, Advert::new(id, advert, self.state.clock.now()));
        Ok(id)
    }

    async fn confirm(
        &self,
        id: AdvertId,
        file_path: Option<String>,
    ) -> Result<ConfirmOutcome, StoreError> {
        self.state.check().await?;
        let mut records = self.state.records.lock().await;
        let advert = records.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        Ok(advert.confirm(file_path, self.state.clock.now()))
    }

    async fn get_by_id(&self, id: AdvertId) -> Result<Advert, StoreError> {
        self.state.check().await?;
        let records = self.state.records.lock().await;
        records.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }

    fn get_all(&self) -> AdvertStream {
        let state = self.state.clone();
        stream::unfold(Cursor::Start, move |cursor| {
            let state = state.clone();
            async move {
                let after = match cursor {
                    Cursor::Done => return None,
                    Cursor::Start => None,
                    Cursor::After(id) => Some(id),
                };
                match state.scan_page(after).await {
                    Ok(page) => {
                        let next = match page.last() {
                            Some(last) if page.len() == state.page_size => Cursor::After(last.id),
                            Some(_) => Cursor::Done,
                            None => return None,
                        };
                        Some((Ok(page), next))
                    }
                    Err(err) => Some((Err(err), Cursor::Done)),
                }
            }
        })
        .map_ok(|page| stream::iter(page.into_iter().map(Ok::<Advert, StoreError>)))
        .try_flatten()
        .boxed()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.state.check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AdvertStatus;
    use crate::ports::FixedClock;
    use chrono::{TimeZone, Utc};
    use rstest::rstest;
    use std::collections::HashSet;
    use ulid::Ulid;

    #[tokio::test]
    async fn add_then_get_returns_pending_record() {
        let store = InMemoryAdvertStore::new();
        let id = store
            .add(NewAdvert::new("Bike", 100.0).with_description("red"))
            .await
            .unwrap();

        let advert = store.get_by_id(id).await.unwrap();
        assert_eq!(advert.id, id);
        assert_eq!(advert.title, "Bike");
        assert_eq!(advert.price, 100.0);
        assert_eq!(advert.description.as_deref(), Some("red"));
        assert_eq!(advert.status, AdvertStatus::Pending);
    }

    #[tokio::test]
    async fn timestamps_come_from_clock() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let clock = Arc::new(FixedClock::new(t0));
        let store = InMemoryAdvertStore::with_parts(
            clock.clone(),
            Arc::new(UlidGenerator::new(SystemClock)),
            DEFAULT_PAGE_SIZE,
        );

        let id = store.add(NewAdvert::new("Bike", 100.0)).await.unwrap();
        clock.set(t1);
        store.confirm(id, None).await.unwrap();

        let advert = store.get_by_id(id).await.unwrap();
        assert_eq!(advert.created_at, t0);
        assert_eq!(advert.confirmed_at, Some(t1));
    }

    #[tokio::test]
    async fn confirm_twice_is_idempotent() {
        let store = InMemoryAdvertStore::new();
        let id = store.add(NewAdvert::new("Bike", 100.0)).await.unwrap();

        let first = store.confirm(id, Some("a.jpg".into())).await.unwrap();
        let second = store.confirm(id, Some("b.jpg".into())).await.unwrap();

        assert_eq!(first, ConfirmOutcome::Confirmed);
        assert_eq!(second, ConfirmOutcome::AlreadyConfirmed);
        let advert = store.get_by_id(id).await.unwrap();
        assert_eq!(advert.status, AdvertStatus::Confirmed);
        assert_eq!(advert.file_path.as_deref(), Some("a.jpg"));
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let store = InMemoryAdvertStore::new();
        let id = AdvertId::from_ulid(Ulid::new());

        assert_eq!(store.get_by_id(id).await, Err(StoreError::NotFound(id)));
        assert_eq!(store.confirm(id, None).await, Err(StoreError::NotFound(id)));
    }

    #[tokio::test]
    async fn outage_is_unavailable_not_not_found() {
        let store = InMemoryAdvertStore::new();
        let id = store.add(NewAdvert::new("Bike", 100.0)).await.unwrap();
        store.faults().set_available(false);

        assert!(matches!(
            store.add(NewAdvert::new("Car", 1.0)).await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(matches!(store.get_by_id(id).await, Err(StoreError::Unavailable(_))));
        assert!(matches!(store.confirm(id, None).await, Err(StoreError::Unavailable(_))));
        assert!(matches!(store.ping().await, Err(StoreError::Unavailable(_))));
    }

    #[rstest]
    #[case(1, 0)]
    #[case(1, 5)]
    #[case(3, 7)]
    #[case(4, 8)]
    #[case(100, 42)]
    #[tokio::test]
    async fn get_all_pages_through_every_record(#[case] page_size: usize, #[case] count: usize) {
        let store = InMemoryAdvertStore::with_page_size(page_size);
        let mut created = HashSet::new();
        for i in 0..count {
            created.insert(store.add(NewAdvert::new(format!("ad {i}"), 1.0)).await.unwrap());
        }

        let listed: Vec<Advert> = store.get_all().try_collect().await.unwrap();
        let ids: HashSet<AdvertId> = listed.iter().map(|a| a.id).collect();

        assert_eq!(listed.len(), count);
        assert_eq!(ids, created);
    }

    #[tokio::test]
    async fn get_all_includes_every_status() {
        let store = InMemoryAdvertStore::new();
        let a = store.add(NewAdvert::new("A", 1.0)).await.unwrap();
        store.add(NewAdvert::new("B", 1.0)).await.unwrap();
        store.confirm(a, None).await.unwrap();

        let listed: Vec<Advert> = store.get_all().try_collect().await.unwrap();
        let confirmed = listed
            .iter()
            .filter(|ad| ad.status == AdvertStatus::Confirmed)
            .count();
        assert_eq!(listed.len(), 2);
        assert_eq!(confirmed, 1);
    }

    #[tokio::test]
    async fn get_all_during_outage_yields_error() {
        let store = InMemoryAdvertStore::new();
        store.add(NewAdvert::new("A", 1.0)).await.unwrap();
        store.faults().set_available(false);

        let items: Vec<Result<Advert, StoreError>> = store.get_all().collect().await;
        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], Err(StoreError::Unavailable(_))));
    }

    #[tokio::test]
    async fn concurrent_adds_never_collide() {
        let store = InMemoryAdvertStore::new();
        let mut handles = Vec::new();
        for i in 0..50 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.add(NewAdvert::new(format!("ad {i}"), 1.0)).await.unwrap()
            }));
        }
        let mut ids = HashSet::new();
        for handle in handles {
            ids.insert(handle.await.unwrap());
        }
        assert_eq!(ids.len(), 50);
        assert_eq!(store.len().await, 50);
    }

    #[tokio::test]
    async fn concurrent_confirms_flip_once() {
        let store = InMemoryAdvertStore::new();
        let id = store.add(NewAdvert::new("Bike", 100.0)).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..20 {
            let store = store.clone();
            handles.push(tokio::spawn(async move { store.confirm(id, None).await.unwrap() }));
        }
        let mut confirmed = 0;
        for handle in handles {
            if handle.await.unwrap() == ConfirmOutcome::Confirmed {
                confirmed += 1;
            }
        }
        assert_eq!(confirmed, 1);
        assert_eq!(
            store.get_by_id(id).await.unwrap().status,
            AdvertStatus::Confirmed
        );
    }
}
