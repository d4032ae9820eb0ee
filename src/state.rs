use std::sync::Arc;

use sqlx::sqlite::SqlitePoolOptions;
use tracing::warn;

use crate::cache::{self, CacheStore, MemoryCache, RedisCache};
use crate::config::AppConfig;
use crate::database::{schema, ProfileStore, SqliteProfileStore};
use crate::events::{EventSink, LogEventSink, RedisEventSink};

/// All shared handles, built once at startup and passed by reference.
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<dyn ProfileStore>,
    pub cache: Arc<dyn CacheStore>,
    pub events: Arc<dyn EventSink>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> Arc<Self> {
        let pool = SqlitePoolOptions::new()
            .connect(&config.database_url)
            .await
            .expect("Cannot connect to database");
        schema::ensure_schema(&pool)
            .await
            .expect("Cannot apply database schema");

        let (cache, events): (Arc<dyn CacheStore>, Arc<dyn EventSink>) =
            match config.redis_url.as_deref() {
                Some(url) => {
                    let conn = cache::redis::connect_manager(url)
                        .await
                        .expect("Cannot connect to Redis");
                    (
                        Arc::new(RedisCache::new(conn.clone())),
                        Arc::new(RedisEventSink::new(conn)),
                    )
                }
                None => {
                    warn!("REDIS_URL not set, using in-process cache and log-only event sink");
                    (Arc::new(MemoryCache::new()), Arc::new(LogEventSink))
                }
            };

        Arc::new(Self {
            config,
            store: Arc::new(SqliteProfileStore::new(pool)),
            cache,
            events,
        })
    }
}
