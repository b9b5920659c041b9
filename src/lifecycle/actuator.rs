use std::sync::Arc;

use tracing::{info, instrument};

use super::cloud::CloudOps;
use super::error::LifecycleResult;
use super::types::InstanceId;

/// Issues start/stop requests. Returns as soon as the provider accepts the request.
#[derive(Clone)]
pub struct InstanceActuator {
    ops: Arc<dyn CloudOps>,
    instance_id: InstanceId,
}

impl InstanceActuator {
    pub fn new(ops: Arc<dyn CloudOps>, instance_id: InstanceId) -> Self {
        Self { ops, instance_id }
    }

    #[instrument(skip(self), fields(instance_id = %self.instance_id))]
    pub async fn start(&self) -> LifecycleResult<()> {
        self.ops.start_instances(self.instance_id.as_str()).await?;
        info!("Start requested");
        Ok(())
    }

    #[instrument(skip(self), fields(instance_id = %self.instance_id))]
    pub async fn stop(&self) -> LifecycleResult<()> {
        self.ops.stop_instances(self.instance_id.as_str()).await?;
        info!("Stop requested");
        Ok(())
    }
}
