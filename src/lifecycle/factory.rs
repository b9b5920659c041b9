use std::sync::Arc;

use super::cloud::{AwsCliCloudOps, CloudOps, LocalCloudOps};
use super::config::{CloudProviderType, LifecycleConfig};

/// Builds the appropriate [`CloudOps`] implementation for the config.
pub fn build_cloud_ops(config: &LifecycleConfig) -> Arc<dyn CloudOps> {
    match config.cloud_provider {
        CloudProviderType::Aws => Arc::new(
            AwsCliCloudOps::new()
                .with_cli_path(config.aws_cli_path.clone())
                .with_region(config.cloud_region.clone()),
        ),
        CloudProviderType::Local => Arc::new(LocalCloudOps::new(
            config.instance_id.clone(),
            config.local_transition_delay,
        )),
    }
}
