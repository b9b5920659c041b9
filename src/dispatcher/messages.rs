//! User-visible chat replies.

use crate::lifecycle::LifecycleError;

pub const JUST_STARTING: &str = "Instance is just starting up.";
pub const ALREADY_RUNNING: &str = "Instance is already running.";
pub const DELETED: &str = "Error: Instance has been deleted.";
pub const STOPPING_RETRY_LATER: &str =
    "Instance is stopping. Wait a few minutes and start it up again.";
pub const JUST_STOPPING: &str = "Instance is just stopping.";
pub const ALREADY_STOPPED: &str = "Instance is already stopped.";
pub const STARTING: &str = "Instance starting... Wait few second.";
pub const STOPPING: &str = "Instance stopping... Wait few second.";
pub const RUNNING: &str = "Instance is running.";
pub const STOPPED: &str = "Instance is stopped.";
pub const NO_PUBLIC_ADDRESS: &str = "Instance has no public IP address.";

pub fn state_query_failed(err: &LifecycleError) -> String {
    format!("Error: Fail to get instance state. {err}")
}

pub fn state_convert_failed(err: &LifecycleError) -> String {
    format!("Error: Fail to convert state. {err}")
}

pub fn address_query_failed(err: &LifecycleError) -> String {
    format!("Error: Fail to get instance public ip address. {err}")
}

pub fn start_failed(err: &LifecycleError) -> String {
    format!("Start instance is error. {err}")
}

pub fn stop_failed(err: &LifecycleError) -> String {
    format!("Stop instance is error. {err}")
}

pub fn ip_address(addr: &str) -> String {
    format!("IP Address: {addr}")
}
