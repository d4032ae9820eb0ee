use async_trait::async_trait;
use redis::aio::ConnectionManager;

use crate::error::EventError;
use crate::events::EventSink;

/// Publishes events as Redis Stream entries, one stream per topic.
pub struct RedisEventSink {
    conn: ConnectionManager,
}

impl RedisEventSink {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl EventSink for RedisEventSink {
    async fn publish(&self, topic: &str, key: &str, payload: &[u8]) -> Result<(), EventError> {
        let mut conn = self.conn.clone();
        let _id: String = redis::cmd("XADD")
            .arg(topic)
            .arg("*")
            .arg("key")
            .arg(key)
            .arg("payload")
            .arg(payload)
            .query_async(&mut conn)
            .await?;
        Ok(())
    }
}
