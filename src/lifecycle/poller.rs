use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, instrument, warn};

use super::error::{LifecycleError, LifecycleResult};
use super::inspector::InstanceInspector;
use super::state::InstanceState;

/// Waits for the managed instance to reach a target state.
#[derive(Clone)]
pub struct ConvergencePoller {
    inspector: InstanceInspector,
}

impl ConvergencePoller {
    pub fn new(inspector: InstanceInspector) -> Self {
        Self { inspector }
    }

    /// Polls until the instance reports `expected`, an inspection fails, or `timeout` elapses.
    /// A zero `poll_interval` is rejected with [`LifecycleError::Config`].
    ///
    /// The first check runs immediately, then every `poll_interval`. Polling runs on its own
    /// task and reports once through a oneshot channel; if the timer wins the race the task
    /// is aborted.
    #[instrument(skip(self), fields(instance_id = %self.inspector.instance_id()))]
    pub async fn wait_for_state(
        &self,
        expected: InstanceState,
        poll_interval: Duration,
        timeout: Duration,
    ) -> LifecycleResult<()> {
        if poll_interval.is_zero() {
            return Err(LifecycleError::Config(
                "poll interval must be non-zero".to_string(),
            ));
        }

        let (tx, rx) = oneshot::channel();
        let inspector = self.inspector.clone();

        let handle = tokio::spawn(async move {
            let outcome = poll_until(&inspector, expected, poll_interval).await;
            let _ = tx.send(outcome);
        });

        tokio::select! {
            outcome = rx => match outcome {
                Ok(outcome) => outcome,
                Err(_) => Err(LifecycleError::ProviderQuery(
                    "polling task ended without reporting".to_string(),
                )),
            },
            _ = time::sleep(timeout) => {
                handle.abort();
                warn!(%expected, ?timeout, "Convergence timed out");
                Err(LifecycleError::Timeout { expected, timeout })
            }
        }
    }
}

async fn poll_until(
    inspector: &InstanceInspector,
    expected: InstanceState,
    poll_interval: Duration,
) -> LifecycleResult<()> {
    let mut interval = time::interval(poll_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        let code = inspector.state_code().await?;
        if code == expected.code() {
            return Ok(());
        }
        debug!(code, expected = expected.code(), "Not converged yet");
    }
}
