use async_trait::async_trait;
use tracing::info;

use super::ChatSink;
use super::error::ChatResult;

/// Writes outbound messages to the log. Useful with the local cloud provider.
pub struct ConsoleSink;

impl ConsoleSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatSink for ConsoleSink {
    async fn send(&self, channel_id: &str, content: &str) -> ChatResult<()> {
        info!(channel_id, content, "Chat message");
        Ok(())
    }
}
