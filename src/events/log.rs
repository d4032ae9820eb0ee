use async_trait::async_trait;
use tracing::debug;

use crate::error::EventError;
use crate::events::EventSink;

/// Sink used when no Redis is configured: events only show up in the log.
pub struct LogEventSink;

#[async_trait]
impl EventSink for LogEventSink {
    async fn publish(&self, topic: &str, key: &str, payload: &[u8]) -> Result<(), EventError> {
        debug!(
            "event on topic {} for key {} ({} bytes), log-only sink",
            topic,
            key,
            payload.len()
        );
        Ok(())
    }
}
