//! Chat command handling.
//!
//! [`CommandDispatcher`] turns one recognised command into provider calls and a sequence of
//! chat replies. Every failure becomes a reply; nothing here is fatal to the process.
//! Commands are not serialised against each other: two overlapping requests may race.

pub mod command;
pub mod messages;


pub use command::{COMMAND_PREFIX, Command};

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::chat::{ChatSink, InboundMessage};
use crate::lifecycle::{
    CloudOps, ConvergencePoller, ConvergenceSettings, InstanceActuator, InstanceId,
    InstanceInspector, InstanceState, describe_state_code,
};

/// Routes chat commands to the lifecycle components of a single instance.
#[derive(Clone)]
pub struct CommandDispatcher {
    inspector: InstanceInspector,
    actuator: InstanceActuator,
    poller: ConvergencePoller,
    convergence: ConvergenceSettings,
    sink: Arc<dyn ChatSink>,
    bot_user_id: Option<String>,
}

impl CommandDispatcher {
    /// Creates a dispatcher for `instance_id`, replying through `sink`.
    pub fn new(
        ops: Arc<dyn CloudOps>,
        instance_id: InstanceId,
        convergence: ConvergenceSettings,
        sink: Arc<dyn ChatSink>,
    ) -> Self {
        let inspector = InstanceInspector::new(Arc::clone(&ops), instance_id.clone());
        let actuator = InstanceActuator::new(ops, instance_id);
        let poller = ConvergencePoller::new(inspector.clone());
        Self {
            inspector,
            actuator,
            poller,
            convergence,
            sink,
            bot_user_id: None,
        }
    }

    /// Messages authored by `bot_user_id` are ignored. Without one, every message flagged as
    /// bot-authored is ignored instead.
    pub fn with_bot_user_id(mut self, bot_user_id: Option<String>) -> Self {
        self.bot_user_id = bot_user_id;
        self
    }

    pub fn instance_id(&self) -> &InstanceId {
        self.inspector.instance_id()
    }

    /// Returns the command carried by `message`, or `None` if it should be ignored.
    pub fn accept(&self, message: &InboundMessage) -> Option<Command> {
        let own_message = match &self.bot_user_id {
            Some(id) => message.author.id == *id,
            None => message.author.bot,
        };
        if own_message {
            return None;
        }
        Command::parse(&message.content)
    }

    /// Handles `message` to completion. Returns the command that ran, if any.
    pub async fn handle_message(&self, message: &InboundMessage) -> Option<Command> {
        let command = self.accept(message)?;
        self.dispatch(command, &message.channel_id).await;
        Some(command)
    }

    #[instrument(skip(self), fields(instance_id = %self.instance_id()))]
    pub async fn dispatch(&self, command: Command, channel_id: &str) {
        info!("Handling command");
        match command {
            Command::Status => self.status(channel_id).await,
            Command::Ip => self.ip(channel_id).await,
            Command::Start => self.start(channel_id).await,
            Command::Stop => self.stop(channel_id).await,
        }
    }

    async fn emit(&self, channel_id: &str, content: &str) {
        debug!(channel_id, content, "Reply");
        if let Err(e) = self.sink.send(channel_id, content).await {
            warn!(channel_id, error = %e, "Failed to deliver chat message");
        }
    }

    async fn status(&self, channel_id: &str) {
        let code = match self.inspector.state_code().await {
            Ok(code) => code,
            Err(e) => return self.emit(channel_id, &messages::state_query_failed(&e)).await,
        };
        match describe_state_code(code) {
            Ok(description) => self.emit(channel_id, description).await,
            Err(e) => {
                self.emit(channel_id, &messages::state_convert_failed(&e))
                    .await
            }
        }
    }

    async fn ip(&self, channel_id: &str) {
        match self.inspector.public_address().await {
            Ok(Some(addr)) => self.emit(channel_id, &addr).await,
            Ok(None) => self.emit(channel_id, messages::NO_PUBLIC_ADDRESS).await,
            Err(e) => {
                self.emit(channel_id, &messages::address_query_failed(&e))
                    .await
            }
        }
    }

    async fn start(&self, channel_id: &str) {
        let code = match self.inspector.state_code().await {
            Ok(code) => code,
            Err(e) => return self.emit(channel_id, &messages::state_query_failed(&e)).await,
        };

        // Unknown codes fall through to the start request.
        if let Ok(state) = InstanceState::from_code(code) {
            let refusal = match state {
                InstanceState::Pending => Some(messages::JUST_STARTING),
                InstanceState::Running => Some(messages::ALREADY_RUNNING),
                InstanceState::ShuttingDown | InstanceState::Terminated => Some(messages::DELETED),
                InstanceState::Stopping => Some(messages::STOPPING_RETRY_LATER),
                InstanceState::Stopped => None,
            };
            if let Some(refusal) = refusal {
                info!(%state, "Start refused");
                return self.emit(channel_id, refusal).await;
            }
        }

        let requested = self.actuator.start().await;
        self.emit(channel_id, messages::STARTING).await;
        if let Err(e) = requested {
            return self.emit(channel_id, &messages::start_failed(&e)).await;
        }

        if let Err(e) = self
            .poller
            .wait_for_state(
                InstanceState::Running,
                self.convergence.poll_interval,
                self.convergence.start_timeout,
            )
            .await
        {
            return self.emit(channel_id, &messages::start_failed(&e)).await;
        }
        self.emit(channel_id, messages::RUNNING).await;

        match self.inspector.public_address().await {
            Ok(Some(addr)) => self.emit(channel_id, &messages::ip_address(&addr)).await,
            Ok(None) => self.emit(channel_id, messages::NO_PUBLIC_ADDRESS).await,
            Err(e) => {
                self.emit(channel_id, &messages::address_query_failed(&e))
                    .await
            }
        }
    }

    async fn stop(&self, channel_id: &str) {
        let code = match self.inspector.state_code().await {
            Ok(code) => code,
            Err(e) => return self.emit(channel_id, &messages::state_query_failed(&e)).await,
        };

        match InstanceState::from_code(code) {
            Ok(InstanceState::Pending) => {
                return self.emit(channel_id, messages::JUST_STARTING).await;
            }
            Ok(state) if state.is_terminal() => {
                return self.emit(channel_id, messages::DELETED).await;
            }
            Ok(InstanceState::Stopping) => {
                return self.emit(channel_id, messages::JUST_STOPPING).await;
            }
            // Reported, but the stop request is still issued.
            Ok(InstanceState::Stopped) => self.emit(channel_id, messages::ALREADY_STOPPED).await,
            _ => {}
        }

        let requested = self.actuator.stop().await;
        self.emit(channel_id, messages::STOPPING).await;
        if let Err(e) = requested {
            return self.emit(channel_id, &messages::stop_failed(&e)).await;
        }

        if let Err(e) = self
            .poller
            .wait_for_state(
                InstanceState::Stopped,
                self.convergence.poll_interval,
                self.convergence.stop_timeout,
            )
            .await
        {
            return self.emit(channel_id, &messages::stop_failed(&e)).await;
        }
        self.emit(channel_id, messages::STOPPED).await;
    }
}
