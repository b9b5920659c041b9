//! Lifecycle control for the single managed cloud instance.
//!
//! Leaves first: [`state`] maps provider codes to text, [`InstanceInspector`] and
//! [`InstanceActuator`] wrap the provider calls, and [`ConvergencePoller`] waits for a
//! transition to finish.

pub mod actuator;
pub mod cloud;
pub mod config;
pub mod error;
pub mod factory;
pub mod inspector;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod poller;
pub mod state;
pub mod types;

#[cfg(test)]
mod tests;

pub use actuator::InstanceActuator;
pub use cloud::{AwsCliCloudOps, CloudOps, LOCAL_PUBLIC_ADDRESS, LocalCloudOps};
pub use config::{
    CloudProviderType, ConvergenceSettings, DEFAULT_POLL_INTERVAL_SECS,
    DEFAULT_START_TIMEOUT_SECS, DEFAULT_STOP_TIMEOUT_SECS, LifecycleConfig,
};
pub use error::{LifecycleError, LifecycleResult};
pub use factory::build_cloud_ops;
pub use inspector::InstanceInspector;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockCloudOps;
pub use poller::ConvergencePoller;
pub use state::{InstanceState, STATE_CODE_MASK, describe_state_code};
pub use types::{InstanceId, InstanceStatusList, ReservationList};
