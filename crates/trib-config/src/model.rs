//! Hydrologic model generation settings.

use serde::{Deserialize, Serialize};

fn default_project_name() -> String {
    "Project".to_string()
}

fn default_project_version() -> String {
    "v1".to_string()
}

const fn default_max_discharge_points() -> u32 {
    20
}

const fn default_id_max_len() -> usize {
    31
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelConfig {
    /// Project label written into the model header.
    #[serde(default = "default_project_name")]
    pub project_name: String,

    /// Version tag used in the exported file name.
    #[serde(default = "default_project_version")]
    pub project_version: String,

    /// Highest `DP-NN` index; also the cycle length of the fallback outflow.
    #[serde(default = "default_max_discharge_points")]
    pub max_discharge_points: u32,

    /// Maximum length of a sanitized subcatchment id.
    #[serde(default = "default_id_max_len")]
    pub id_max_len: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            project_name: default_project_name(),
            project_version: default_project_version(),
            max_discharge_points: default_max_discharge_points(),
            id_max_len: default_id_max_len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = ModelConfig::default();
        assert_eq!(config.project_name, "Project");
        assert_eq!(config.project_version, "v1");
        assert_eq!(config.max_discharge_points, 20);
        assert_eq!(config.id_max_len, 31);
    }
}
