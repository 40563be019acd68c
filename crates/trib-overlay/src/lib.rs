//! # trib-overlay
//!
//! Geometric stages of the hydrologic model pipeline:
//! - [`overall`]: dissolve drainage boundaries into one reference boundary
//! - [`validate`]: aggregated data-completeness check before geometry work
//! - [`subarea`]: clip declared subareas to their parent boundary and
//!   materialize the uncovered remainder as complements
//! - [`overlay`]: soils x land cover x (subareas | overall) intersection
//!
//! Every stage is a pure function of its inputs. Geometry failures never
//! surface as errors; they are counted in stage reports and logged.

pub mod overall;
pub mod overlay;
pub mod subarea;
pub mod validate;

mod error;

pub use error::OverlayError;
pub use overlay::{CurveNumbers, OverlayOutput, OverlayReport};
pub use subarea::{SubareaOutput, SubareaReport};
pub use validate::{CompletenessIssue, CompletenessReport, ValidationInputs, ValidationMode, check_completeness};

use trib_config::GeometryConfig;
use trib_core::Area;

/// Area thresholds shared by all geometric stages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlaySettings {
    /// Results at or below this area are treated as empty.
    pub area_tolerance: Area,
    /// Residual parts must exceed this area to become complements.
    pub min_complement: Area,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self::from(&GeometryConfig::default())
    }
}

impl From<&GeometryConfig> for OverlaySettings {
    fn from(config: &GeometryConfig) -> Self {
        Self {
            area_tolerance: Area::from_sq_m(config.area_tolerance_sq_m),
            min_complement: Area::from_sq_ft(config.min_complement_sq_ft),
        }
    }
}
