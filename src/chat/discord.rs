//! Discord REST implementation of [`ChatSink`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use tracing::debug;

use super::ChatSink;
use super::error::{ChatError, ChatResult};

/// Default Discord REST base URL.
pub const DEFAULT_DISCORD_API_URL: &str = "https://discord.com/api/v10";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Posts messages with `POST {api_url}/channels/{channel_id}/messages`.
pub struct DiscordSink {
    http: HttpClient,
    api_url: String,
    authorization: String,
}

#[derive(serde::Serialize)]
struct CreateMessage<'a> {
    content: &'a str,
}

#[derive(serde::Deserialize)]
struct CurrentUser {
    id: String,
}

impl DiscordSink {
    /// Creates a sink authenticating as the bot owning `token`.
    pub fn new(api_url: impl Into<String>, token: &str) -> ChatResult<Self> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ChatError::Config("Discord bot token is empty".to_string()));
        }
        let http = HttpClient::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            authorization: format!("Bot {token}"),
        })
    }

    fn message_url(&self, channel_id: &str) -> String {
        format!("{}/channels/{}/messages", self.api_url, channel_id)
    }

    /// Looks up the bot's own user id with `GET {api_url}/users/@me`.
    pub async fn fetch_current_user_id(&self) -> ChatResult<String> {
        let resp = self
            .http
            .get(format!("{}/users/@me", self.api_url))
            .header(reqwest::header::AUTHORIZATION, &self.authorization)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ChatError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let user: CurrentUser = resp.json().await?;
        debug!(user_id = %user.id, "Resolved bot user id");
        Ok(user.id)
    }
}

#[async_trait]
impl ChatSink for DiscordSink {
    async fn send(&self, channel_id: &str, content: &str) -> ChatResult<()> {
        let resp = self
            .http
            .post(self.message_url(channel_id))
            .header(reqwest::header::AUTHORIZATION, &self.authorization)
            .json(&CreateMessage { content })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ChatError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!(channel_id, "Message delivered");
        Ok(())
    }

    async fn current_user_id(&self) -> ChatResult<Option<String>> {
        self.fetch_current_user_id().await.map(Some)
    }
}
