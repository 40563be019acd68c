//! Polygon-algebra thresholds.

use serde::{Deserialize, Serialize};

const fn default_area_tolerance_sq_m() -> f64 {
    0.01
}

const fn default_min_complement_sq_ft() -> f64 {
    100.0
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeometryConfig {
    /// Results at or below this area (square meters) count as empty.
    #[serde(default = "default_area_tolerance_sq_m")]
    pub area_tolerance_sq_m: f64,

    /// Residual parts must exceed this area (square feet) to become complements.
    #[serde(default = "default_min_complement_sq_ft")]
    pub min_complement_sq_ft: f64,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            area_tolerance_sq_m: default_area_tolerance_sq_m(),
            min_complement_sq_ft: default_min_complement_sq_ft(),
        }
    }
}
