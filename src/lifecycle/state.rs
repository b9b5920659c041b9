//! Provider lifecycle codes and their user-facing descriptions.

use std::fmt;

use super::error::{LifecycleError, LifecycleResult};

/// The provider packs internal data into the high byte of a state code.
pub const STATE_CODE_MASK: i32 = 0xFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Run state of the managed instance, keyed by the provider's numeric code.
pub enum InstanceState {
    Pending,
    Running,
    ShuttingDown,
    Terminated,
    Stopping,
    Stopped,
}

impl InstanceState {
    /// Every defined state, in ascending code order.
    pub const ALL: [InstanceState; 6] = [
        Self::Pending,
        Self::Running,
        Self::ShuttingDown,
        Self::Terminated,
        Self::Stopping,
        Self::Stopped,
    ];

    /// Returns the provider's numeric code.
    pub const fn code(self) -> i32 {
        match self {
            Self::Pending => 0,
            Self::Running => 16,
            Self::ShuttingDown => 32,
            Self::Terminated => 48,
            Self::Stopping => 64,
            Self::Stopped => 80,
        }
    }

    /// Parses a numeric code, failing with [`LifecycleError::UnknownStateCode`].
    pub fn from_code(code: i32) -> LifecycleResult<Self> {
        Self::ALL
            .into_iter()
            .find(|state| state.code() == code)
            .ok_or(LifecycleError::UnknownStateCode { code })
    }

    /// Provider name of the state (e.g. `shutting-down`).
    pub const fn name(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::ShuttingDown => "shutting-down",
            Self::Terminated => "terminated",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
        }
    }

    /// Canonical chat description.
    pub const fn description(self) -> &'static str {
        match self {
            Self::Pending => "Instance is pending",
            Self::Running => "Instance is running",
            Self::ShuttingDown => "Instance is shutting down",
            Self::Terminated => "Instance is terminated",
            Self::Stopping => "Instance is stopping",
            Self::Stopped => "Instance is stopped",
        }
    }

    /// Shutting-down and terminated instances are treated as deleted.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::ShuttingDown | Self::Terminated)
    }
}

impl fmt::Display for InstanceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Maps a raw lifecycle code to its description.
pub fn describe_state_code(code: i32) -> LifecycleResult<&'static str> {
    InstanceState::from_code(code).map(InstanceState::description)
}
