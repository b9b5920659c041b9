use serde::{Deserialize, Serialize};

/// Body of a `202 Accepted` reply: the command is running in the background.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchAccepted {
    pub status: String,
    pub command: String,
    pub request_id: String,
}
