use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::ChatSink;
use super::error::{ChatError, ChatResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub channel_id: String,
    pub content: String,
}

/// Captures outbound messages for assertions.
#[derive(Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<SentMessage>>,
    reject: AtomicBool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later `send` fail after recording the message.
    pub fn reject_sends(&self) {
        self.reject.store(true, Ordering::SeqCst);
    }

    pub fn messages(&self) -> Vec<SentMessage> {
        self.sent.lock().clone()
    }

    /// Contents of every message, in send order.
    pub fn contents(&self) -> Vec<String> {
        self.sent.lock().iter().map(|m| m.content.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.sent.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sent.lock().is_empty()
    }
}

#[async_trait]
impl ChatSink for RecordingSink {
    async fn send(&self, channel_id: &str, content: &str) -> ChatResult<()> {
        self.sent.lock().push(SentMessage {
            channel_id: channel_id.to_string(),
            content: content.to_string(),
        });
        if self.reject.load(Ordering::SeqCst) {
            return Err(ChatError::Rejected {
                status: 429,
                body: "rate limited".to_string(),
            });
        }
        Ok(())
    }
}
