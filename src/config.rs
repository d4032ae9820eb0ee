use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use tracing::info;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub redis_url: Option<String>,
    /// Fixed TTL applied to every cache entry at write time.
    pub cache_ttl: Duration,
    /// Upper bound on rows a single candidate query scans.
    pub candidate_scan_limit: i64,
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: try_load("PORT", "3000"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            redis_url: env::var("REDIS_URL").ok(),
            cache_ttl: Duration::from_secs(try_load("CACHE_TTL_SECS", "1800")),
            candidate_scan_limit: try_load("CANDIDATE_SCAN_LIMIT", "500"),
            default_page_size: try_load("DEFAULT_PAGE_SIZE", "20"),
            max_page_size: try_load("MAX_PAGE_SIZE", "100"),
        }
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{} not set, using default: {}", key, default);
        default.to_string()
    });
    match raw.parse() {
        Ok(value) => value,
        Err(e) => panic!("Invalid {} value '{}': {}", key, raw, e),
    }
}
