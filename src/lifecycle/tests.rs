use super::cloud::{CloudOps, LOCAL_PUBLIC_ADDRESS, LocalCloudOps};
use super::config::{CloudProviderType, ConvergenceSettings, LifecycleConfig};
use super::error::LifecycleError;
use super::mock::MockCloudOps;
use super::state::{InstanceState, describe_state_code};
use super::types::{InstanceId, InstanceStatusList, ReservationList};
use super::{ConvergencePoller, InstanceActuator, InstanceInspector};

use serial_test::serial;
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

const INSTANCE: &str = "i-0123456789abcdef0";
const POLL: Duration = Duration::from_secs(5);

fn inspector_for(ops: &Arc<MockCloudOps>) -> InstanceInspector {
    InstanceInspector::new(ops.clone(), InstanceId::new(INSTANCE))
}

#[test]
fn test_describe_defined_codes() {
    assert_eq!(describe_state_code(0).unwrap(), "Instance is pending");
    assert_eq!(describe_state_code(16).unwrap(), "Instance is running");
    assert_eq!(describe_state_code(32).unwrap(), "Instance is shutting down");
    assert_eq!(describe_state_code(48).unwrap(), "Instance is terminated");
    assert_eq!(describe_state_code(64).unwrap(), "Instance is stopping");
    assert_eq!(describe_state_code(80).unwrap(), "Instance is stopped");
}

#[test]
fn test_describe_unknown_codes() {
    for code in [-1, 1, 15, 17, 33, 79, 81, 96, 272, i32::MAX] {
        let err = describe_state_code(code).unwrap_err();
        assert!(
            matches!(err, LifecycleError::UnknownStateCode { code: c } if c == code),
            "code {code} should be unknown"
        );
    }
}

#[test]
fn test_state_round_trips_and_terminal_set() {
    for state in InstanceState::ALL {
        assert_eq!(InstanceState::from_code(state.code()).unwrap(), state);
    }
    let terminal: Vec<_> = InstanceState::ALL
        .into_iter()
        .filter(|s| s.is_terminal())
        .collect();
    assert_eq!(
        terminal,
        vec![InstanceState::ShuttingDown, InstanceState::Terminated]
    );
    assert_eq!(InstanceState::ShuttingDown.to_string(), "shutting-down");
}

#[test]
fn test_provider_json_shapes() {
    let status: InstanceStatusList = serde_json::from_str(
        r#"{"InstanceStatuses":[{"InstanceId":"i-1","AvailabilityZone":"ap-northeast-1a",
            "InstanceState":{"Code":80,"Name":"stopped"}}]}"#,
    )
    .unwrap();
    assert_eq!(status.instance_statuses[0].instance_state.code, 80);

    let described: ReservationList = serde_json::from_str(
        r#"{"Reservations":[{"ReservationId":"r-1","Instances":[{"InstanceId":"i-1"}]}]}"#,
    )
    .unwrap();
    assert!(described.reservations[0].instances[0]
        .public_ip_address
        .is_none());
}

#[tokio::test]
async fn test_inspector_reads_single_status() {
    let ops = Arc::new(MockCloudOps::with_codes([16]));
    assert_eq!(inspector_for(&ops).state_code().await.unwrap(), 16);
    assert_eq!(ops.status_calls(), 1);
}

#[tokio::test]
async fn test_inspector_masks_high_byte() {
    let ops = Arc::new(MockCloudOps::with_codes([0x0100 | 80]));
    assert_eq!(inspector_for(&ops).state_code().await.unwrap(), 80);
}

#[tokio::test]
async fn test_inspector_rejects_zero_or_many_statuses() {
    for count in [0, 2] {
        let ops = Arc::new(MockCloudOps::with_codes([16]));
        ops.set_instance_count(count);
        let err = inspector_for(&ops).state_code().await.unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::AmbiguousInstance { count: c, .. } if c == count
        ));
    }
}

#[tokio::test]
async fn test_inspector_propagates_query_error() {
    let ops = Arc::new(MockCloudOps::new());
    ops.push_query_error("UnauthorizedOperation");
    let err = inspector_for(&ops).state_code().await.unwrap_err();
    assert!(matches!(err, LifecycleError::ProviderQuery(ref m) if m == "UnauthorizedOperation"));
}

#[tokio::test]
async fn test_public_address_present_and_absent() {
    let ops = Arc::new(MockCloudOps::new());
    ops.set_public_ip(Some("203.0.113.10"));
    let inspector = inspector_for(&ops);
    assert_eq!(
        inspector.public_address().await.unwrap().as_deref(),
        Some("203.0.113.10")
    );

    ops.set_public_ip(None);
    assert_eq!(inspector.public_address().await.unwrap(), None);

    ops.set_public_ip(Some("  "));
    assert_eq!(inspector.public_address().await.unwrap(), None);
}

#[tokio::test]
async fn test_public_address_requires_one_reservation_and_instance() {
    let ops = Arc::new(MockCloudOps::new());
    ops.set_reservation_count(2);
    let err = inspector_for(&ops).public_address().await.unwrap_err();
    assert!(matches!(
        err,
        LifecycleError::AmbiguousInstance {
            what: "reservation",
            count: 2
        }
    ));

    ops.set_reservation_count(1);
    ops.set_instance_count(0);
    let err = inspector_for(&ops).public_address().await.unwrap_err();
    assert!(matches!(
        err,
        LifecycleError::AmbiguousInstance {
            what: "instance",
            count: 0
        }
    ));

    ops.set_instance_count(1);
    ops.fail_describe_instances("RequestLimitExceeded");
    let err = inspector_for(&ops).public_address().await.unwrap_err();
    assert!(matches!(err, LifecycleError::ProviderQuery(_)));
}

#[tokio::test]
async fn test_actuator_issues_single_requests() {
    let ops = Arc::new(MockCloudOps::new());
    let actuator = InstanceActuator::new(ops.clone(), InstanceId::new(INSTANCE));

    actuator.start().await.unwrap();
    actuator.stop().await.unwrap();
    assert_eq!(ops.start_calls(), 1);
    assert_eq!(ops.stop_calls(), 1);

    ops.fail_start("IncorrectInstanceState");
    let err = actuator.start().await.unwrap_err();
    assert!(matches!(
        err,
        LifecycleError::ProviderAction { action: "start", .. }
    ));
    assert_eq!(ops.start_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_poller_returns_once_target_reached() {
    let ops = Arc::new(MockCloudOps::with_codes([0, 0, 16]));
    let poller = ConvergencePoller::new(inspector_for(&ops));
    let timeout = Duration::from_secs(60);

    let started = Instant::now();
    poller
        .wait_for_state(InstanceState::Running, POLL, timeout)
        .await
        .unwrap();
    let elapsed = started.elapsed();

    assert_eq!(ops.status_calls(), 3);
    assert_eq!(elapsed, POLL * 2);
    assert!(elapsed < timeout);
}

#[tokio::test(start_paused = true)]
async fn test_poller_first_check_is_immediate() {
    let ops = Arc::new(MockCloudOps::with_codes([80]));
    let poller = ConvergencePoller::new(inspector_for(&ops));

    let started = Instant::now();
    poller
        .wait_for_state(InstanceState::Stopped, POLL, Duration::from_secs(120))
        .await
        .unwrap();

    assert_eq!(started.elapsed(), Duration::ZERO);
    assert_eq!(ops.status_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_poller_times_out_at_deadline() {
    let ops = Arc::new(MockCloudOps::with_codes([64]));
    let poller = ConvergencePoller::new(inspector_for(&ops));
    let timeout = Duration::from_secs(120);

    let started = Instant::now();
    let err = poller
        .wait_for_state(InstanceState::Stopped, POLL, timeout)
        .await
        .unwrap_err();

    assert_eq!(started.elapsed(), timeout);
    assert!(matches!(
        err,
        LifecycleError::Timeout {
            expected: InstanceState::Stopped,
            timeout: t
        } if t == timeout
    ));
}

#[tokio::test(start_paused = true)]
async fn test_poller_stops_polling_after_timeout() {
    let ops = Arc::new(MockCloudOps::with_codes([0]));
    let poller = ConvergencePoller::new(inspector_for(&ops));

    let _ = poller
        .wait_for_state(InstanceState::Running, POLL, Duration::from_secs(12))
        .await;
    let calls_at_timeout = ops.status_calls();

    tokio::time::sleep(POLL * 4).await;
    assert_eq!(ops.status_calls(), calls_at_timeout);
}

#[tokio::test(start_paused = true)]
async fn test_poller_returns_inspection_error_immediately() {
    let ops = Arc::new(MockCloudOps::with_codes([0]));
    ops.push_query_error("Throttling");
    let poller = ConvergencePoller::new(inspector_for(&ops));
    let timeout = Duration::from_secs(60);

    let started = Instant::now();
    let err = poller
        .wait_for_state(InstanceState::Running, POLL, timeout)
        .await
        .unwrap_err();

    assert!(matches!(err, LifecycleError::ProviderQuery(ref m) if m == "Throttling"));
    assert_eq!(started.elapsed(), POLL);
    assert_eq!(ops.status_calls(), 2);
}

#[tokio::test]
async fn test_poller_rejects_zero_interval() {
    let ops = Arc::new(MockCloudOps::with_codes([0]));
    let poller = ConvergencePoller::new(inspector_for(&ops));

    let err = poller
        .wait_for_state(InstanceState::Running, Duration::ZERO, Duration::from_secs(60))
        .await
        .unwrap_err();

    assert!(matches!(err, LifecycleError::Config(_)));
    assert_eq!(ops.status_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_local_ops_simulates_transitions() {
    let ops = LocalCloudOps::new(INSTANCE, Duration::from_secs(10));
    assert_eq!(ops.state(), InstanceState::Stopped);

    ops.start_instances(INSTANCE).await.unwrap();
    assert_eq!(ops.state(), InstanceState::Pending);
    let described = ops.describe_instances(INSTANCE).await.unwrap();
    assert!(described.reservations[0].instances[0]
        .public_ip_address
        .is_none());

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(ops.state(), InstanceState::Running);
    let described = ops.describe_instances(INSTANCE).await.unwrap();
    assert_eq!(
        described.reservations[0].instances[0]
            .public_ip_address
            .as_deref(),
        Some(LOCAL_PUBLIC_ADDRESS)
    );

    ops.stop_instances(INSTANCE).await.unwrap();
    let err = ops.start_instances(INSTANCE).await.unwrap_err();
    assert!(matches!(err, LifecycleError::ProviderAction { .. }));

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(ops.state(), InstanceState::Stopped);
}

#[tokio::test]
async fn test_local_ops_unknown_instance() {
    let ops = LocalCloudOps::new(INSTANCE, Duration::from_secs(1));
    let statuses = ops.describe_instance_status("i-other").await.unwrap();
    assert!(statuses.instance_statuses.is_empty());
    assert!(ops.stop_instances("i-other").await.is_err());

    ops.set_state(InstanceState::Terminated);
    assert!(ops.start_instances(INSTANCE).await.is_err());
}

fn clear_lifecycle_env() {
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    unsafe {
        env::remove_var("RELAY_INSTANCE_ID");
        env::remove_var("RELAY_CLOUD_PROVIDER");
        env::remove_var("RELAY_CLOUD_REGION");
        env::remove_var("RELAY_AWS_CLI_PATH");
        env::remove_var("RELAY_LOCAL_TRANSITION_SECS");
        env::remove_var("RELAY_POLL_INTERVAL_SECS");
        env::remove_var("RELAY_START_TIMEOUT_SECS");
        env::remove_var("RELAY_STOP_TIMEOUT_SECS");
    }
}

#[test]
#[serial]
fn test_lifecycle_config_requires_instance_id() {
    clear_lifecycle_env();
    let err = LifecycleConfig::from_env().unwrap_err();
    assert!(matches!(err, LifecycleError::Config(ref m) if m.contains("RELAY_INSTANCE_ID")));
}

#[test]
#[serial]
fn test_lifecycle_config_from_env() {
    clear_lifecycle_env();
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    unsafe {
        env::set_var("RELAY_INSTANCE_ID", " i-abc ");
        env::set_var("RELAY_CLOUD_PROVIDER", "LOCAL");
        env::set_var("RELAY_CLOUD_REGION", "ap-northeast-1");
        env::set_var("RELAY_START_TIMEOUT_SECS", "90");
        env::set_var("RELAY_POLL_INTERVAL_SECS", "not-a-number");
    }

    let config = LifecycleConfig::from_env().expect("config should load");
    clear_lifecycle_env();

    assert_eq!(config.instance_id, "i-abc");
    assert_eq!(config.cloud_provider, CloudProviderType::Local);
    assert_eq!(config.cloud_region.as_deref(), Some("ap-northeast-1"));
    assert_eq!(config.convergence.start_timeout, Duration::from_secs(90));
    assert_eq!(config.convergence.poll_interval, Duration::from_secs(5));
    assert_eq!(config.convergence.stop_timeout, Duration::from_secs(120));
}

#[test]
#[serial]
fn test_lifecycle_config_rejects_unknown_provider() {
    clear_lifecycle_env();
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    unsafe {
        env::set_var("RELAY_INSTANCE_ID", "i-abc");
        env::set_var("RELAY_CLOUD_PROVIDER", "azure");
    }
    let result = LifecycleConfig::from_env();
    clear_lifecycle_env();
    assert!(matches!(result, Err(LifecycleError::Config(_))));
}

#[test]
fn test_lifecycle_config_validation() {
    let config = LifecycleConfig::for_testing(INSTANCE);
    assert!(config.validate().is_ok());

    let config = LifecycleConfig {
        instance_id: String::new(),
        ..LifecycleConfig::for_testing(INSTANCE)
    };
    assert!(config.validate().is_err());

    let config = LifecycleConfig {
        convergence: ConvergenceSettings {
            stop_timeout: Duration::ZERO,
            ..Default::default()
        },
        ..LifecycleConfig::for_testing(INSTANCE)
    };
    assert!(config.validate().is_err());
}
