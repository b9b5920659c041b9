use std::sync::Arc;

use tracing::{debug, instrument};

use super::cloud::CloudOps;
use super::error::{LifecycleError, LifecycleResult};
use super::state::STATE_CODE_MASK;
use super::types::InstanceId;

/// Read-only queries against the managed instance. Nothing is cached.
#[derive(Clone)]
pub struct InstanceInspector {
    ops: Arc<dyn CloudOps>,
    instance_id: InstanceId,
}

impl InstanceInspector {
    pub fn new(ops: Arc<dyn CloudOps>, instance_id: InstanceId) -> Self {
        Self { ops, instance_id }
    }

    pub fn instance_id(&self) -> &InstanceId {
        &self.instance_id
    }

    /// Returns the current lifecycle code (low byte of the provider code).
    ///
    /// Fails with [`LifecycleError::AmbiguousInstance`] unless the provider
    /// reports exactly one matching instance.
    #[instrument(skip(self), fields(instance_id = %self.instance_id))]
    pub async fn state_code(&self) -> LifecycleResult<i32> {
        let list = self
            .ops
            .describe_instance_status(self.instance_id.as_str())
            .await?;

        let [status] = list.instance_statuses.as_slice() else {
            return Err(LifecycleError::AmbiguousInstance {
                what: "instance status",
                count: list.instance_statuses.len(),
            });
        };

        let code = status.instance_state.code & STATE_CODE_MASK;
        debug!(code, "Observed instance state");
        Ok(code)
    }

    /// Returns the public address, or `None` if the instance has none assigned.
    #[instrument(skip(self), fields(instance_id = %self.instance_id))]
    pub async fn public_address(&self) -> LifecycleResult<Option<String>> {
        let list = self.ops.describe_instances(self.instance_id.as_str()).await?;

        let [reservation] = list.reservations.as_slice() else {
            return Err(LifecycleError::AmbiguousInstance {
                what: "reservation",
                count: list.reservations.len(),
            });
        };
        let [instance] = reservation.instances.as_slice() else {
            return Err(LifecycleError::AmbiguousInstance {
                what: "instance",
                count: reservation.instances.len(),
            });
        };

        Ok(instance
            .public_ip_address
            .as_deref()
            .map(str::trim)
            .filter(|addr| !addr.is_empty())
            .map(str::to_string))
    }
}
