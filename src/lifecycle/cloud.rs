//! Provider operations used by lifecycle management.
//!
//! `AwsCliCloudOps` shells out to the `aws` CLI. `LocalCloudOps` simulates an instance in memory.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use tokio::process::Command;
use tokio::time::Instant;
use tracing::debug;

use super::error::{LifecycleError, LifecycleResult};
use super::state::InstanceState;
use super::types::{
    InstanceDescription, InstanceStateRecord, InstanceStatus, InstanceStatusList, Reservation,
    ReservationList,
};

const CMD_TIMEOUT: Duration = Duration::from_secs(30);

#[async_trait]
/// Raw provider calls, each scoped to a single instance id. None of them are retried.
pub trait CloudOps: Send + Sync {
    /// Describes the status of `instance_id`, including non-running instances.
    async fn describe_instance_status(&self, instance_id: &str)
    -> LifecycleResult<InstanceStatusList>;
    /// Describes `instance_id` in full (reservations and network details).
    async fn describe_instances(&self, instance_id: &str) -> LifecycleResult<ReservationList>;
    /// Requests a start transition without waiting for it.
    async fn start_instances(&self, instance_id: &str) -> LifecycleResult<()>;
    /// Requests a stop transition without waiting for it.
    async fn stop_instances(&self, instance_id: &str) -> LifecycleResult<()>;
}

/// Amazon EC2 implementation backed by the `aws` CLI.
pub struct AwsCliCloudOps {
    aws_path: PathBuf,
    region: Option<String>,
}

impl AwsCliCloudOps {
    /// Creates a new implementation using `aws` from `PATH`.
    pub fn new() -> Self {
        Self {
            aws_path: PathBuf::from("aws"),
            region: None,
        }
    }

    pub fn with_cli_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.aws_path = path.into();
        self
    }

    pub fn with_region(mut self, region: Option<String>) -> Self {
        self.region = region;
        self
    }

    fn ec2_args(&self, subcommand: &str, instance_id: &str) -> Vec<String> {
        let mut args = vec![
            "ec2".to_string(),
            subcommand.to_string(),
            "--instance-ids".to_string(),
            instance_id.to_string(),
            "--output".to_string(),
            "json".to_string(),
        ];
        if let Some(region) = &self.region {
            args.push("--region".to_string());
            args.push(region.clone());
        }
        args
    }

    /// Runs one CLI invocation and returns its stdout, or a message describing the failure.
    async fn run_command(
        program: &Path,
        args: Vec<String>,
        label: &str,
    ) -> Result<Vec<u8>, String> {
        let mut cmd = Command::new(program);
        cmd.args(&args)
            .kill_on_drop(true)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let child = cmd
            .spawn()
            .map_err(|e| format!("Failed to spawn {label}: {e}"))?;

        let output = match tokio::time::timeout(CMD_TIMEOUT, child.wait_with_output()).await {
            Ok(res) => res.map_err(|e| format!("Failed waiting for {label}: {e}"))?,
            Err(_) => return Err(format!("{label} timed out after {:?}", CMD_TIMEOUT)),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(format!("{label} failed: {stderr}"));
        }

        Ok(output.stdout)
    }

    async fn query<T: DeserializeOwned>(
        &self,
        subcommand: &str,
        instance_id: &str,
        extra: &[&str],
    ) -> LifecycleResult<T> {
        let mut args = self.ec2_args(subcommand, instance_id);
        args.extend(extra.iter().map(|s| s.to_string()));
        let label = format!("aws ec2 {subcommand}");

        let stdout = Self::run_command(&self.aws_path, args, &label)
            .await
            .map_err(LifecycleError::ProviderQuery)?;

        serde_json::from_slice(&stdout).map_err(|e| {
            LifecycleError::ProviderQuery(format!("Failed to parse {label} output: {e}"))
        })
    }

    async fn act(
        &self,
        subcommand: &str,
        action: &'static str,
        instance_id: &str,
    ) -> LifecycleResult<()> {
        let label = format!("aws ec2 {subcommand}");
        Self::run_command(&self.aws_path, self.ec2_args(subcommand, instance_id), &label)
            .await
            .map(|_| ())
            .map_err(|message| LifecycleError::ProviderAction { action, message })
    }
}

impl Default for AwsCliCloudOps {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CloudOps for AwsCliCloudOps {
    async fn describe_instance_status(
        &self,
        instance_id: &str,
    ) -> LifecycleResult<InstanceStatusList> {
        self.query(
            "describe-instance-status",
            instance_id,
            &["--include-all-instances"],
        )
        .await
    }

    async fn describe_instances(&self, instance_id: &str) -> LifecycleResult<ReservationList> {
        self.query("describe-instances", instance_id, &[]).await
    }

    async fn start_instances(&self, instance_id: &str) -> LifecycleResult<()> {
        self.act("start-instances", "start", instance_id).await
    }

    async fn stop_instances(&self, instance_id: &str) -> LifecycleResult<()> {
        self.act("stop-instances", "stop", instance_id).await
    }
}

/// Address handed out by the simulated instance while it runs.
pub const LOCAL_PUBLIC_ADDRESS: &str = "127.0.0.1";

struct LocalInstance {
    state: InstanceState,
    pending: Option<(Instant, InstanceState)>,
}

impl LocalInstance {
    fn settle(&mut self) {
        if let Some((due, target)) = self.pending
            && Instant::now() >= due
        {
            self.state = target;
            self.pending = None;
        }
    }
}

/// In-memory simulation of one instance. Boots `stopped`; start and stop
/// requests pass through `pending`/`stopping` for `transition_delay`.
pub struct LocalCloudOps {
    instance_id: String,
    transition_delay: Duration,
    inner: Arc<Mutex<LocalInstance>>,
}

impl LocalCloudOps {
    /// Creates a stopped simulated instance.
    pub fn new(instance_id: impl Into<String>, transition_delay: Duration) -> Self {
        Self {
            instance_id: instance_id.into(),
            transition_delay,
            inner: Arc::new(Mutex::new(LocalInstance {
                state: InstanceState::Stopped,
                pending: None,
            })),
        }
    }

    /// Current simulated state (after applying any finished transition).
    pub fn state(&self) -> InstanceState {
        let mut inner = self.inner.lock();
        inner.settle();
        inner.state
    }

    /// Forces the simulated state, cancelling any transition in flight.
    pub fn set_state(&self, state: InstanceState) {
        let mut inner = self.inner.lock();
        inner.state = state;
        inner.pending = None;
    }

    fn is_managed(&self, instance_id: &str) -> bool {
        self.instance_id == instance_id
    }

    fn transition(
        &self,
        action: &'static str,
        instance_id: &str,
        from: InstanceState,
        via: InstanceState,
        target: InstanceState,
    ) -> LifecycleResult<()> {
        if !self.is_managed(instance_id) {
            return Err(LifecycleError::ProviderAction {
                action,
                message: format!("InvalidInstanceID.NotFound: {instance_id}"),
            });
        }

        let mut inner = self.inner.lock();
        inner.settle();
        if inner.state == target || inner.state == via {
            return Ok(());
        }
        if inner.state != from {
            return Err(LifecycleError::ProviderAction {
                action,
                message: format!("IncorrectInstanceState: instance is {}", inner.state),
            });
        }

        debug!(from = %inner.state, to = %target, "Simulated transition");
        inner.state = via;
        inner.pending = Some((Instant::now() + self.transition_delay, target));
        Ok(())
    }
}

#[async_trait]
impl CloudOps for LocalCloudOps {
    async fn describe_instance_status(
        &self,
        instance_id: &str,
    ) -> LifecycleResult<InstanceStatusList> {
        if !self.is_managed(instance_id) {
            return Ok(InstanceStatusList::default());
        }
        let state = self.state();
        Ok(InstanceStatusList {
            instance_statuses: vec![InstanceStatus {
                instance_id: self.instance_id.clone(),
                instance_state: InstanceStateRecord {
                    code: state.code(),
                    name: state.name().to_string(),
                },
            }],
        })
    }

    async fn describe_instances(&self, instance_id: &str) -> LifecycleResult<ReservationList> {
        if !self.is_managed(instance_id) {
            return Ok(ReservationList::default());
        }
        let public_ip_address = (self.state() == InstanceState::Running)
            .then(|| LOCAL_PUBLIC_ADDRESS.to_string());
        Ok(ReservationList {
            reservations: vec![Reservation {
                instances: vec![InstanceDescription {
                    instance_id: self.instance_id.clone(),
                    public_ip_address,
                }],
            }],
        })
    }

    async fn start_instances(&self, instance_id: &str) -> LifecycleResult<()> {
        self.transition(
            "start",
            instance_id,
            InstanceState::Stopped,
            InstanceState::Pending,
            InstanceState::Running,
        )
    }

    async fn stop_instances(&self, instance_id: &str) -> LifecycleResult<()> {
        self.transition(
            "stop",
            instance_id,
            InstanceState::Running,
            InstanceState::Stopping,
            InstanceState::Stopped,
        )
    }
}
