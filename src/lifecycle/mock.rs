use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::cloud::CloudOps;
use super::error::{LifecycleError, LifecycleResult};
use super::types::{
    InstanceDescription, InstanceStateRecord, InstanceStatus, InstanceStatusList, Reservation,
    ReservationList,
};

#[derive(Debug, Clone)]
enum ScriptedStatus {
    Code(i32),
    QueryError(String),
}

#[derive(Default)]
struct MockState {
    statuses: VecDeque<ScriptedStatus>,
    public_ip: Option<String>,
    instance_count: usize,
    reservation_count: usize,
    describe_error: Option<String>,
    start_error: Option<String>,
    stop_error: Option<String>,
}

/// Scripted [`CloudOps`] for tests.
///
/// Each describe-instance-status call consumes the next scripted status; the
/// last one repeats forever.
pub struct MockCloudOps {
    state: Mutex<MockState>,
    status_calls: AtomicUsize,
    describe_calls: AtomicUsize,
    start_calls: AtomicUsize,
    stop_calls: AtomicUsize,
}

impl Default for MockCloudOps {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCloudOps {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                instance_count: 1,
                reservation_count: 1,
                ..Default::default()
            }),
            status_calls: AtomicUsize::new(0),
            describe_calls: AtomicUsize::new(0),
            start_calls: AtomicUsize::new(0),
            stop_calls: AtomicUsize::new(0),
        }
    }

    /// Creates a mock reporting `codes` in order.
    pub fn with_codes(codes: impl IntoIterator<Item = i32>) -> Self {
        let mock = Self::new();
        for code in codes {
            mock.push_code(code);
        }
        mock
    }

    pub fn push_code(&self, code: i32) {
        self.state
            .lock()
            .statuses
            .push_back(ScriptedStatus::Code(code));
    }

    pub fn push_query_error(&self, message: &str) {
        self.state
            .lock()
            .statuses
            .push_back(ScriptedStatus::QueryError(message.to_string()));
    }

    pub fn set_public_ip(&self, ip: Option<&str>) {
        self.state.lock().public_ip = ip.map(str::to_string);
    }

    /// Number of matching instances reported by both describe calls.
    pub fn set_instance_count(&self, count: usize) {
        self.state.lock().instance_count = count;
    }

    pub fn set_reservation_count(&self, count: usize) {
        self.state.lock().reservation_count = count;
    }

    pub fn fail_describe_instances(&self, message: &str) {
        self.state.lock().describe_error = Some(message.to_string());
    }

    pub fn fail_start(&self, message: &str) {
        self.state.lock().start_error = Some(message.to_string());
    }

    pub fn fail_stop(&self, message: &str) {
        self.state.lock().stop_error = Some(message.to_string());
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn describe_calls(&self) -> usize {
        self.describe_calls.load(Ordering::SeqCst)
    }

    pub fn start_calls(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    pub fn stop_calls(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }

    fn next_status(&self) -> ScriptedStatus {
        let mut state = self.state.lock();
        if state.statuses.len() > 1 {
            state
                .statuses
                .pop_front()
                .unwrap_or_else(|| ScriptedStatus::QueryError("no scripted status".to_string()))
        } else {
            state
                .statuses
                .front()
                .cloned()
                .unwrap_or_else(|| ScriptedStatus::QueryError("no scripted status".to_string()))
        }
    }
}

#[async_trait]
impl CloudOps for MockCloudOps {
    async fn describe_instance_status(
        &self,
        instance_id: &str,
    ) -> LifecycleResult<InstanceStatusList> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let code = match self.next_status() {
            ScriptedStatus::Code(code) => code,
            ScriptedStatus::QueryError(message) => {
                return Err(LifecycleError::ProviderQuery(message));
            }
        };
        let count = self.state.lock().instance_count;
        let instance_statuses = (0..count)
            .map(|_| InstanceStatus {
                instance_id: instance_id.to_string(),
                instance_state: InstanceStateRecord {
                    code,
                    name: String::new(),
                },
            })
            .collect();
        Ok(InstanceStatusList { instance_statuses })
    }

    async fn describe_instances(&self, instance_id: &str) -> LifecycleResult<ReservationList> {
        self.describe_calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock();
        if let Some(message) = &state.describe_error {
            return Err(LifecycleError::ProviderQuery(message.clone()));
        }
        let instances: Vec<InstanceDescription> = (0..state.instance_count)
            .map(|_| InstanceDescription {
                instance_id: instance_id.to_string(),
                public_ip_address: state.public_ip.clone(),
            })
            .collect();
        let reservations = (0..state.reservation_count)
            .map(|_| Reservation {
                instances: instances.clone(),
            })
            .collect();
        Ok(ReservationList { reservations })
    }

    async fn start_instances(&self, _instance_id: &str) -> LifecycleResult<()> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        match &self.state.lock().start_error {
            Some(message) => Err(LifecycleError::ProviderAction {
                action: "start",
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }

    async fn stop_instances(&self, _instance_id: &str) -> LifecycleResult<()> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        match &self.state.lock().stop_error {
            Some(message) => Err(LifecycleError::ProviderAction {
                action: "stop",
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}
