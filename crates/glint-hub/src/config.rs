//! Hub configuration

use std::time::Duration;

/// Hub configuration
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Hub name (logging only)
    pub name: String,
    /// How long one broadcast recipient may stall a send before it is
    /// dropped from the registry as if disconnected
    pub send_stall_timeout: Duration,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            name: "GLINT Hub".to_string(),
            send_stall_timeout: Duration::from_secs(5),
        }
    }
}
