//! Shared harness for service-level tests: real SQLite (in-memory) and
//! memory cache, with counting/failing doubles at the trait seams.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, Utc};
use sqlx::sqlite::SqlitePoolOptions;

use matchbook::cache::{CacheStore, MemoryCache};
use matchbook::config::AppConfig;
use matchbook::database::{schema, CandidateQuery, ProfileStore, SqliteProfileStore};
use matchbook::error::{CacheError, Error, EventError};
use matchbook::events::EventSink;
use matchbook::models::{years_before, Gender, GeoPoint, Preferences, Profile};
use matchbook::services::profile_service::NewProfile;
use matchbook::state::AppState;

#[derive(Default)]
pub struct StoreCalls {
    pub find_by_id: AtomicUsize,
    pub find_candidates: AtomicUsize,
    pub total: AtomicUsize,
}

impl StoreCalls {
    pub fn total(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    pub fn finds(&self) -> usize {
        self.find_by_id.load(Ordering::SeqCst)
    }
}

/// Wraps the real SQLite store and counts every call that reaches it.
pub struct CountingStore {
    inner: SqliteProfileStore,
    calls: Arc<StoreCalls>,
}

impl CountingStore {
    pub fn new(inner: SqliteProfileStore) -> (Arc<Self>, Arc<StoreCalls>) {
        let calls = Arc::new(StoreCalls::default());
        (
            Arc::new(Self {
                inner,
                calls: calls.clone(),
            }),
            calls,
        )
    }
}

#[async_trait]
impl ProfileStore for CountingStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<Profile>, Error> {
        self.calls.find_by_id.fetch_add(1, Ordering::SeqCst);
        self.calls.total.fetch_add(1, Ordering::SeqCst);
        self.inner.find_by_id(id).await
    }

    async fn email_exists(&self, email: &str) -> Result<bool, Error> {
        self.calls.total.fetch_add(1, Ordering::SeqCst);
        self.inner.email_exists(email).await
    }

    async fn insert(&self, profile: &Profile) -> Result<(), Error> {
        self.calls.total.fetch_add(1, Ordering::SeqCst);
        self.inner.insert(profile).await
    }

    async fn update(&self, profile: &Profile, expected_version: i64) -> Result<(), Error> {
        self.calls.total.fetch_add(1, Ordering::SeqCst);
        self.inner.update(profile, expected_version).await
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool, Error> {
        self.calls.total.fetch_add(1, Ordering::SeqCst);
        self.inner.delete_by_id(id).await
    }

    async fn find_candidates(&self, query: &CandidateQuery) -> Result<Vec<Profile>, Error> {
        self.calls.find_candidates.fetch_add(1, Ordering::SeqCst);
        self.calls.total.fetch_add(1, Ordering::SeqCst);
        self.inner.find_candidates(query).await
    }

    async fn touch_last_active(&self, id: &str, at: DateTime<Utc>) -> Result<(), Error> {
        self.calls.total.fetch_add(1, Ordering::SeqCst);
        self.inner.touch_last_active(id, at).await
    }
}

/// Cache that is always down; every operation must degrade gracefully.
pub struct FailingCache;

#[async_trait]
impl CacheStore for FailingCache {
    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Err(CacheError::Unavailable("cache down".to_string()))
    }

    async fn set(&self, _key: &str, _value: &[u8], _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("cache down".to_string()))
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("cache down".to_string()))
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub published: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl EventSink for RecordingSink {
    async fn publish(&self, topic: &str, key: &str, _payload: &[u8]) -> Result<(), EventError> {
        self.published
            .lock()
            .unwrap()
            .push((topic.to_string(), key.to_string()));
        Ok(())
    }
}

pub fn test_config(cache_ttl: Duration) -> AppConfig {
    AppConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: "sqlite::memory:".to_string(),
        redis_url: None,
        cache_ttl,
        candidate_scan_limit: 500,
        default_page_size: 20,
        max_page_size: 100,
    }
}

pub async fn sqlite_store() -> SqliteProfileStore {
    // One connection, or each checkout would see a fresh empty :memory: db.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    schema::ensure_schema(&pool).await.unwrap();
    SqliteProfileStore::new(pool)
}

pub struct TestHarness {
    pub state: AppState,
    pub calls: Arc<StoreCalls>,
    pub cache: Arc<MemoryCache>,
    pub events: Arc<RecordingSink>,
}

pub async fn harness() -> TestHarness {
    harness_with_ttl(Duration::from_secs(1800)).await
}

pub async fn harness_with_ttl(cache_ttl: Duration) -> TestHarness {
    let (store, calls) = CountingStore::new(sqlite_store().await);
    let cache = Arc::new(MemoryCache::new());
    let events = Arc::new(RecordingSink::default());
    let state = AppState {
        config: test_config(cache_ttl),
        store,
        cache: cache.clone(),
        events: events.clone(),
    };
    TestHarness {
        state,
        calls,
        cache,
        events,
    }
}

pub async fn failing_cache_harness() -> TestHarness {
    let (store, calls) = CountingStore::new(sqlite_store().await);
    let events = Arc::new(RecordingSink::default());
    let state = AppState {
        config: test_config(Duration::from_secs(1800)),
        store,
        cache: Arc::new(FailingCache),
        events: events.clone(),
    };
    TestHarness {
        state,
        calls,
        // Unused handle so the harness shape stays uniform.
        cache: Arc::new(MemoryCache::new()),
        events,
    }
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Birth date for someone whose `age`th birthday was exactly
/// `days_past_birthday` days ago (negative: birthday still ahead, so
/// their current age is `age - 1`).
pub fn born_aged(age: i32, days_past_birthday: i64) -> NaiveDate {
    years_before(today(), age) - ChronoDuration::days(days_past_birthday)
}

pub fn new_profile(email: &str, name: &str, gender: Gender, birth_date: NaiveDate) -> NewProfile {
    NewProfile {
        email: email.to_string(),
        name: name.to_string(),
        birth_date,
        gender,
        bio: None,
        interests: vec![],
        photos: vec![],
        // Amsterdam
        location: GeoPoint {
            longitude: 4.9041,
            latitude: 52.3676,
        },
        preferences: None,
    }
}

pub fn prefs(genders: Vec<Gender>, min_age: i32, max_age: i32) -> Preferences {
    Preferences {
        genders,
        min_age,
        max_age,
        max_distance_km: None,
        show_me: true,
    }
}
