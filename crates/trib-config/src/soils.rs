//! Soil Data Access lookup settings.

use serde::{Deserialize, Serialize};

fn default_endpoint() -> String {
    "https://sdmdataaccess.sc.egov.usda.gov/Tabular/post.rest".to_string()
}

const fn default_timeout_secs() -> u64 {
    90
}

const fn default_chunk_size() -> usize {
    50
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SoilsConfig {
    /// Tabular REST endpoint accepting `{"query": ..., "format": ...}` posts.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Map-unit symbols per SQL query.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Soil survey area symbol (e.g. `NY103`). Empty = not configured.
    #[serde(default)]
    pub area_symbol: String,
}

impl Default for SoilsConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
            chunk_size: default_chunk_size(),
            area_symbol: String::new(),
        }
    }
}

impl SoilsConfig {
    /// Returns `true` if a survey area symbol has been set.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.area_symbol.trim().is_empty()
    }
}
