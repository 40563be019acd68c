//! Data-completeness checks.
//!
//! All problems are collected into one report so the operator sees every
//! missing attribute at once, and nothing geometric runs until the report is
//! clean.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use trib_core::attributes;
use trib_core::{LayerRole, NamedLayer, PolygonFeature};

use crate::error::OverlayError;

/// Which pipeline path the inputs are checked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// soils x land cover x overall boundary.
    Preview,
    /// subareas x soils x land cover.
    Final,
}

/// One completeness problem. Feature numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CompletenessIssue {
    MissingLayer { role: LayerRole },
    MissingOverall,
    MissingDischargePoint { feature: usize },
    MissingSubareaParent { feature: usize },
    OrphanedSubarea { feature: usize, parent: String },
    MissingHsg { feature: usize },
    MissingLandCover { feature: usize },
}

impl fmt::Display for CompletenessIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingLayer { role } => write!(f, "layer '{}' is missing or empty", role.layer_name()),
            Self::MissingOverall => f.write_str("no overall drainage boundary (drainage areas dissolve to nothing)"),
            Self::MissingDischargePoint { feature } => {
                write!(f, "drainage area #{feature} has no discharge point name ({})", attributes::DA_NAME)
            }
            Self::MissingSubareaParent { feature } => {
                write!(f, "subarea #{feature} has no parent discharge point ({})", attributes::PARENT_DA)
            }
            Self::OrphanedSubarea { feature, parent } => {
                write!(f, "subarea #{feature} references unknown discharge point '{parent}'")
            }
            Self::MissingHsg { feature } => {
                write!(f, "soil polygon #{feature} has no hydrologic soil group ({})", attributes::HSG)
            }
            Self::MissingLandCover { feature } => {
                write!(f, "land cover polygon #{feature} has no land cover ({})", attributes::LAND_COVER)
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompletenessReport {
    pub issues: Vec<CompletenessIssue>,
}

impl CompletenessReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// `Ok(())` when clean, otherwise [`OverlayError::Incomplete`].
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::Incomplete`] carrying this report.
    pub fn into_result(self) -> Result<(), OverlayError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(OverlayError::Incomplete(self))
        }
    }
}

impl fmt::Display for CompletenessReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, issue) in self.issues.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "  - {issue}")?;
        }
        Ok(())
    }
}

/// Normalized inputs to check, one per role. `None` means "not supplied".
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationInputs<'a> {
    pub boundaries: Option<&'a NamedLayer>,
    pub subareas: Option<&'a NamedLayer>,
    pub soils: Option<&'a NamedLayer>,
    pub land_cover: Option<&'a NamedLayer>,
    pub overall: Option<&'a PolygonFeature>,
}

/// Check every input needed by `mode` and report all gaps together.
#[must_use]
pub fn check_completeness(inputs: &ValidationInputs<'_>, mode: ValidationMode) -> CompletenessReport {
    fn present(layer: Option<&NamedLayer>) -> Option<&NamedLayer> {
        layer.filter(|l| !l.is_empty())
    }

    let mut issues = Vec::new();

    match present(inputs.boundaries) {
        Some(boundaries) => {
            for (i, feature) in boundaries.features.iter().enumerate() {
                if feature.text(attributes::DA_NAME).is_none() {
                    issues.push(CompletenessIssue::MissingDischargePoint { feature: i + 1 });
                }
            }
            if inputs.overall.is_none() {
                issues.push(CompletenessIssue::MissingOverall);
            }
        }
        None => issues.push(CompletenessIssue::MissingLayer {
            role: LayerRole::DrainageBoundaries,
        }),
    }

    if mode == ValidationMode::Final {
        if let (Some(subareas), Some(boundaries)) = (inputs.subareas, inputs.boundaries) {
            let known: HashSet<String> = boundaries
                .features
                .iter()
                .filter_map(|f| f.text(attributes::DA_NAME))
                .map(|name| name.to_uppercase())
                .collect();
            for (i, feature) in subareas.features.iter().enumerate() {
                match feature.text(attributes::PARENT_DA) {
                    None => issues.push(CompletenessIssue::MissingSubareaParent { feature: i + 1 }),
                    Some(parent) if !known.contains(&parent.to_uppercase()) => {
                        issues.push(CompletenessIssue::OrphanedSubarea {
                            feature: i + 1,
                            parent,
                        });
                    }
                    Some(_) => {}
                }
            }
        }
    }

    match present(inputs.soils) {
        Some(soils) => {
            for (i, feature) in soils.features.iter().enumerate() {
                if feature.text(attributes::HSG).is_none() {
                    issues.push(CompletenessIssue::MissingHsg { feature: i + 1 });
                }
            }
        }
        None => issues.push(CompletenessIssue::MissingLayer { role: LayerRole::Soils }),
    }

    match present(inputs.land_cover) {
        Some(land_cover) => {
            for (i, feature) in land_cover.features.iter().enumerate() {
                if feature.text(attributes::LAND_COVER).is_none() {
                    issues.push(CompletenessIssue::MissingLandCover { feature: i + 1 });
                }
            }
        }
        None => issues.push(CompletenessIssue::MissingLayer {
            role: LayerRole::LandCover,
        }),
    }

    CompletenessReport { issues }
}
