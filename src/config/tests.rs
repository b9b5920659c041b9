use super::*;
use serial_test::serial;
use std::env;
use std::net::IpAddr;

fn with_env_vars<F, R>(vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, value) in vars {
        unsafe { env::set_var(key, value) };
    }

    let result = f();

    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, _) in vars {
        unsafe { env::remove_var(key) };
    }

    result
}

fn clear_relay_env() {
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    unsafe {
        env::remove_var("RELAY_PORT");
        env::remove_var("RELAY_BIND_ADDR");
        env::remove_var("RELAY_CHAT_TRANSPORT");
        env::remove_var("RELAY_DISCORD_TOKEN");
        env::remove_var("RELAY_DISCORD_API_URL");
        env::remove_var("RELAY_BOT_USER_ID");
    }
}

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.port, 8080);
    assert_eq!(
        config.bind_addr,
        IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1))
    );
    assert_eq!(config.chat_transport, ChatTransportType::Discord);
    assert!(config.discord_token.is_none());
    assert_eq!(config.discord_api_url, "https://discord.com/api/v10");
    assert!(config.bot_user_id.is_none());
}

#[test]
fn test_socket_addr() {
    let config = Config::default();
    assert_eq!(config.socket_addr(), "127.0.0.1:8080");

    let config = Config {
        port: 3000,
        bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(0, 0, 0, 0)),
        ..Default::default()
    };
    assert_eq!(config.socket_addr(), "0.0.0.0:3000");
}

#[test]
#[serial]
fn test_from_env_with_defaults() {
    clear_relay_env();

    let config = Config::from_env().expect("should parse with defaults");

    assert_eq!(config.port, 8080);
    assert_eq!(config.chat_transport, ChatTransportType::Discord);
}

#[test]
#[serial]
fn test_from_env_overrides() {
    clear_relay_env();

    let config = with_env_vars(
        &[
            ("RELAY_PORT", "9090"),
            ("RELAY_BIND_ADDR", "0.0.0.0"),
            ("RELAY_CHAT_TRANSPORT", "console"),
            ("RELAY_DISCORD_TOKEN", "  token-value  "),
            ("RELAY_BOT_USER_ID", "555"),
        ],
        Config::from_env,
    )
    .expect("should parse overrides");

    assert_eq!(config.port, 9090);
    assert_eq!(config.bind_addr.to_string(), "0.0.0.0");
    assert_eq!(config.chat_transport, ChatTransportType::Console);
    assert_eq!(config.discord_token.as_deref(), Some("token-value"));
    assert_eq!(config.bot_user_id.as_deref(), Some("555"));
}

#[test]
#[serial]
fn test_from_env_rejects_port_zero() {
    clear_relay_env();

    let result = with_env_vars(&[("RELAY_PORT", "0")], Config::from_env);
    assert!(matches!(result, Err(ConfigError::InvalidPort { .. })));
}

#[test]
#[serial]
fn test_from_env_rejects_bad_port_and_addr() {
    clear_relay_env();

    let result = with_env_vars(&[("RELAY_PORT", "eighty")], Config::from_env);
    assert!(matches!(result, Err(ConfigError::PortParseError { .. })));

    let result = with_env_vars(&[("RELAY_BIND_ADDR", "localhost:80")], Config::from_env);
    assert!(matches!(result, Err(ConfigError::InvalidBindAddr { .. })));
}

#[test]
#[serial]
fn test_from_env_rejects_unknown_transport() {
    clear_relay_env();

    let result = with_env_vars(&[("RELAY_CHAT_TRANSPORT", "irc")], Config::from_env);
    assert!(matches!(
        result,
        Err(ConfigError::UnknownChatTransport { ref value }) if value == "irc"
    ));
}

#[test]
#[serial]
fn test_blank_token_is_treated_as_missing() {
    clear_relay_env();

    let config = with_env_vars(&[("RELAY_DISCORD_TOKEN", "   ")], Config::from_env)
        .expect("should parse");
    assert!(config.discord_token.is_none());
    assert!(matches!(
        config.validate(),
        Err(ConfigError::MissingEnvVar {
            name: "RELAY_DISCORD_TOKEN"
        })
    ));
}

#[test]
fn test_validate_console_without_token() {
    let config = Config {
        chat_transport: ChatTransportType::Console,
        ..Default::default()
    };
    assert!(config.validate().is_ok());
}
