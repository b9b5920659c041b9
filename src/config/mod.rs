//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `RELAY_*` environment variables. Instance and
//! provider settings live in [`LifecycleConfig`](crate::lifecycle::LifecycleConfig).

pub mod error;

#[cfg(test)]
mod tests;

pub use error::ConfigError;

use std::env;
use std::net::IpAddr;

use crate::chat::{ChatTransportType, DEFAULT_DISCORD_API_URL};

/// Server and chat configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `RELAY_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP port for inbound chat events. Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Outbound chat transport. Default: Discord.
    pub chat_transport: ChatTransportType,

    /// Discord bot token (required for the Discord transport).
    pub discord_token: Option<String>,

    /// Discord REST base URL.
    pub discord_api_url: String,

    /// User id of the bot itself; its own messages are ignored.
    pub bot_user_id: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            chat_transport: ChatTransportType::default(),
            discord_token: None,
            discord_api_url: DEFAULT_DISCORD_API_URL.to_string(),
            bot_user_id: None,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "RELAY_PORT";
    const ENV_BIND_ADDR: &'static str = "RELAY_BIND_ADDR";
    const ENV_CHAT_TRANSPORT: &'static str = "RELAY_CHAT_TRANSPORT";
    const ENV_DISCORD_TOKEN: &'static str = "RELAY_DISCORD_TOKEN";
    const ENV_DISCORD_API_URL: &'static str = "RELAY_DISCORD_API_URL";
    const ENV_BOT_USER_ID: &'static str = "RELAY_BOT_USER_ID";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let chat_transport = Self::parse_transport_from_env(defaults.chat_transport)?;
        let discord_token = Self::parse_optional_string_from_env(Self::ENV_DISCORD_TOKEN);
        let discord_api_url =
            Self::parse_string_from_env(Self::ENV_DISCORD_API_URL, defaults.discord_api_url);
        let bot_user_id = Self::parse_optional_string_from_env(Self::ENV_BOT_USER_ID);

        Ok(Self {
            port,
            bind_addr,
            chat_transport,
            discord_token,
            discord_api_url,
            bot_user_id,
        })
    }

    /// Checks that the selected transport has what it needs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chat_transport == ChatTransportType::Discord && self.discord_token.is_none() {
            return Err(ConfigError::MissingEnvVar {
                name: Self::ENV_DISCORD_TOKEN,
            });
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_transport_from_env(
        default: ChatTransportType,
    ) -> Result<ChatTransportType, ConfigError> {
        match env::var(Self::ENV_CHAT_TRANSPORT) {
            Ok(value) => value
                .parse()
                .map_err(|_| ConfigError::UnknownChatTransport { value }),
            Err(_) => Ok(default),
        }
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name).unwrap_or(default)
    }
}
