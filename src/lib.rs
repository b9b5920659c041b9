//! Relay library crate (used by the `relay` binary and integration tests).
//!
//! # Public API Surface
//!
//! ## Lifecycle (core)
//! - [`InstanceState`], [`describe_state_code`] - provider state codes and their text
//! - [`InstanceInspector`], [`InstanceActuator`] - queries and start/stop requests
//! - [`ConvergencePoller`] - waits for a transition to finish
//! - [`CloudOps`] with [`AwsCliCloudOps`] and [`LocalCloudOps`] - provider adapters
//!
//! ## Commands
//! - [`Command`], [`CommandDispatcher`] - chat command parsing and handling
//!
//! ## Transport
//! - [`ChatSink`] with [`DiscordSink`] and [`ConsoleSink`] - outbound replies
//! - [`gateway`] - HTTP endpoint receiving inbound chat events
//!
//! ## Test/Mock Support
//! [`MockCloudOps`] and [`RecordingSink`] are available behind
//! `#[cfg(any(test, feature = "mock"))]`.

pub mod chat;
pub mod config;
pub mod dispatcher;
pub mod gateway;
pub mod lifecycle;

pub use chat::{
    ChatError, ChatResult, ChatSink, ChatTransportType, ConsoleSink, DiscordSink,
    InboundMessage, MessageAuthor, build_chat_sink,
};
#[cfg(any(test, feature = "mock"))]
pub use chat::RecordingSink;
pub use config::{Config, ConfigError};
pub use dispatcher::{Command, CommandDispatcher};
pub use lifecycle::{
    AwsCliCloudOps, CloudOps, CloudProviderType, ConvergencePoller, ConvergenceSettings,
    InstanceActuator, InstanceId, InstanceInspector, InstanceState, LifecycleConfig,
    LifecycleError, LifecycleResult, LocalCloudOps, build_cloud_ops, describe_state_code,
};
#[cfg(any(test, feature = "mock"))]
pub use lifecycle::MockCloudOps;
