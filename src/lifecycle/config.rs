use std::env;
use std::path::PathBuf;
use std::time::Duration;

use super::error::{LifecycleError, LifecycleResult};

/// Default spacing between convergence checks.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
/// Default deadline for an instance to reach `running` after a start request.
pub const DEFAULT_START_TIMEOUT_SECS: u64 = 60;
/// Default deadline for an instance to reach `stopped` after a stop request.
pub const DEFAULT_STOP_TIMEOUT_SECS: u64 = 120;
/// Default delay before a simulated local instance finishes a transition.
pub const DEFAULT_LOCAL_TRANSITION_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// Cloud provider selection for lifecycle operations.
pub enum CloudProviderType {
    #[default]
    /// Amazon EC2 through the `aws` CLI.
    Aws,
    /// In-memory simulated instance.
    Local,
}

impl std::str::FromStr for CloudProviderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "aws" | "ec2" => Ok(Self::Aws),
            "local" => Ok(Self::Local),
            _ => Err(format!("Unknown cloud provider: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Poll spacing and deadlines used while waiting for a transition to finish.
pub struct ConvergenceSettings {
    pub poll_interval: Duration,
    pub start_timeout: Duration,
    pub stop_timeout: Duration,
}

impl Default for ConvergenceSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            start_timeout: Duration::from_secs(DEFAULT_START_TIMEOUT_SECS),
            stop_timeout: Duration::from_secs(DEFAULT_STOP_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone)]
/// Which instance to manage, through which provider, and how long to wait on it.
pub struct LifecycleConfig {
    /// Identity of the managed instance (required).
    pub instance_id: String,
    /// Cloud provider selection.
    pub cloud_provider: CloudProviderType,
    /// Optional cloud region passed to the provider.
    pub cloud_region: Option<String>,
    /// Path to the `aws` executable.
    pub aws_cli_path: PathBuf,
    /// Transition delay of the simulated local instance.
    pub local_transition_delay: Duration,
    /// Convergence polling settings.
    pub convergence: ConvergenceSettings,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            instance_id: String::new(),
            cloud_provider: CloudProviderType::default(),
            cloud_region: None,
            aws_cli_path: PathBuf::from("aws"),
            local_transition_delay: Duration::from_secs(DEFAULT_LOCAL_TRANSITION_SECS),
            convergence: ConvergenceSettings::default(),
        }
    }
}

impl LifecycleConfig {
    const ENV_INSTANCE_ID: &'static str = "RELAY_INSTANCE_ID";
    const ENV_CLOUD_PROVIDER: &'static str = "RELAY_CLOUD_PROVIDER";
    const ENV_CLOUD_REGION: &'static str = "RELAY_CLOUD_REGION";
    const ENV_AWS_CLI_PATH: &'static str = "RELAY_AWS_CLI_PATH";
    const ENV_LOCAL_TRANSITION_SECS: &'static str = "RELAY_LOCAL_TRANSITION_SECS";
    const ENV_POLL_INTERVAL_SECS: &'static str = "RELAY_POLL_INTERVAL_SECS";
    const ENV_START_TIMEOUT_SECS: &'static str = "RELAY_START_TIMEOUT_SECS";
    const ENV_STOP_TIMEOUT_SECS: &'static str = "RELAY_STOP_TIMEOUT_SECS";

    /// Loads config from environment variables (with defaults) and validates it.
    pub fn from_env() -> LifecycleResult<Self> {
        let defaults = Self::default();

        let instance_id = env::var(Self::ENV_INSTANCE_ID)
            .map(|s| s.trim().to_string())
            .map_err(|_| {
                LifecycleError::Config(format!("{} is not set", Self::ENV_INSTANCE_ID))
            })?;

        let cloud_provider = match env::var(Self::ENV_CLOUD_PROVIDER) {
            Ok(value) => value.parse().map_err(LifecycleError::Config)?,
            Err(_) => defaults.cloud_provider,
        };

        let cloud_region = env::var(Self::ENV_CLOUD_REGION)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let aws_cli_path = env::var(Self::ENV_AWS_CLI_PATH)
            .map(PathBuf::from)
            .unwrap_or(defaults.aws_cli_path);

        let local_transition_delay = secs_from_env(
            Self::ENV_LOCAL_TRANSITION_SECS,
            defaults.local_transition_delay,
        );

        let convergence = ConvergenceSettings {
            poll_interval: secs_from_env(
                Self::ENV_POLL_INTERVAL_SECS,
                defaults.convergence.poll_interval,
            ),
            start_timeout: secs_from_env(
                Self::ENV_START_TIMEOUT_SECS,
                defaults.convergence.start_timeout,
            ),
            stop_timeout: secs_from_env(
                Self::ENV_STOP_TIMEOUT_SECS,
                defaults.convergence.stop_timeout,
            ),
        };

        let config = Self {
            instance_id,
            cloud_provider,
            cloud_region,
            aws_cli_path,
            local_transition_delay,
            convergence,
        };
        config.validate()?;
        Ok(config)
    }

    /// Rejects an empty instance id and zero poll/timeout durations.
    pub fn validate(&self) -> LifecycleResult<()> {
        if self.instance_id.is_empty() {
            return Err(LifecycleError::Config(
                "instance id must not be empty".to_string(),
            ));
        }

        let ConvergenceSettings {
            poll_interval,
            start_timeout,
            stop_timeout,
        } = self.convergence;
        for (name, value) in [
            ("poll interval", poll_interval),
            ("start timeout", start_timeout),
            ("stop timeout", stop_timeout),
        ] {
            if value.is_zero() {
                return Err(LifecycleError::Config(format!("{name} must be non-zero")));
            }
        }

        Ok(())
    }

    #[cfg(test)]
    pub fn for_testing(instance_id: &str) -> Self {
        Self {
            instance_id: instance_id.to_string(),
            cloud_provider: CloudProviderType::Local,
            local_transition_delay: Duration::from_secs(1),
            ..Default::default()
        }
    }
}

fn secs_from_env(var_name: &str, default: Duration) -> Duration {
    env::var(var_name)
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(default)
}
