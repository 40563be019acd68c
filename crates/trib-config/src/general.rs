//! General application configuration.

use serde::{Deserialize, Serialize};

/// Default number of retained pipeline events.
const fn default_log_capacity() -> usize {
    500
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Maximum events kept in a pipeline run's event log.
    #[serde(default = "default_log_capacity")]
    pub log_capacity: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_capacity: default_log_capacity(),
        }
    }
}
