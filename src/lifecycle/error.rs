use std::time::Duration;
use thiserror::Error;

use super::state::InstanceState;

#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("provider query failed: {0}")]
    ProviderQuery(String),

    #[error("expected exactly one {what}, provider returned {count}")]
    AmbiguousInstance { what: &'static str, count: usize },

    #[error("{action} request rejected: {message}")]
    ProviderAction {
        action: &'static str,
        message: String,
    },

    #[error("instance is abnormal. StateCode: {code}")]
    UnknownStateCode { code: i32 },

    #[error("timed out after {timeout:?} waiting for instance to be {expected}")]
    Timeout {
        expected: InstanceState,
        timeout: Duration,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;
