pub mod log;
pub mod redis;

use async_trait::async_trait;

use crate::error::EventError;

pub use self::log::LogEventSink;
pub use self::redis::RedisEventSink;

/// Stream that profile lifecycle events are announced on.
pub const PROFILES_TOPIC: &str = "profiles";

/// Fire-and-forget event publication. Callers log failures and move on;
/// a publish error never fails the triggering request.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn publish(&self, topic: &str, key: &str, payload: &[u8]) -> Result<(), EventError>;
}
