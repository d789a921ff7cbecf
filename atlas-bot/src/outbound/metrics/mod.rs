use crate::domain::ports::CommandMetrics;

use tracing::{info, warn};

/// Reports command outcomes as log events.
#[derive(Debug, Clone)]
pub struct TracingMetrics;

impl CommandMetrics for TracingMetrics {
    async fn record_command_success(&self, command: &'static str) {
        info!(command, outcome = "success", "Command handled");
    }

    async fn record_command_failure(&self, command: &'static str) {
        warn!(command, outcome = "failure", "Command failed");
    }
}
