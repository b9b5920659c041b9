//! Chat transport seam.
//!
//! Inbound messages arrive as [`InboundMessage`] values (see the gateway); replies go out
//! through a [`ChatSink`].

pub mod console;
pub mod discord;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;


use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use console::ConsoleSink;
pub use discord::{DEFAULT_DISCORD_API_URL, DiscordSink};
pub use error::{ChatError, ChatResult};
#[cfg(any(test, feature = "mock"))]
pub use mock::RecordingSink;

use crate::config::Config;

#[async_trait]
/// Outbound side of the chat transport.
pub trait ChatSink: Send + Sync {
    /// Posts plain `content` to `channel_id`.
    async fn send(&self, channel_id: &str, content: &str) -> ChatResult<()>;

    /// User id the transport posts as, when the transport can tell.
    async fn current_user_id(&self) -> ChatResult<Option<String>> {
        Ok(None)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageAuthor {
    pub id: String,
    /// Set by the transport for bot accounts.
    #[serde(default)]
    pub bot: bool,
}

/// A chat message as delivered by the transport (subset of a Discord `MESSAGE_CREATE`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub channel_id: String,
    pub author: MessageAuthor,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// Chat transport selection.
pub enum ChatTransportType {
    #[default]
    /// Discord REST API.
    Discord,
    /// Messages are written to the log.
    Console,
}

impl std::str::FromStr for ChatTransportType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "discord" => Ok(Self::Discord),
            "console" | "stdout" => Ok(Self::Console),
            _ => Err(format!("Unknown chat transport: {}", s)),
        }
    }
}

/// Builds the [`ChatSink`] selected by the config.
pub fn build_chat_sink(config: &Config) -> ChatResult<Arc<dyn ChatSink>> {
    match config.chat_transport {
        ChatTransportType::Discord => {
            let token = config.discord_token.as_deref().ok_or_else(|| {
                ChatError::Config("a Discord bot token is required".to_string())
            })?;
            Ok(Arc::new(DiscordSink::new(
                config.discord_api_url.clone(),
                token,
            )?))
        }
        ChatTransportType::Console => Ok(Arc::new(ConsoleSink::new())),
    }
}
