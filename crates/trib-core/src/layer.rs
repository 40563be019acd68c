//! Named layers and their roles in the pipeline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::feature::PolygonFeature;
use crate::naming;

/// Well-known layer names exchanged with the map surface.
pub mod names {
    pub const DRAINAGE_AREAS: &str = "Drainage Areas";
    pub const DRAINAGE_SUBAREAS: &str = "Drainage Subareas";
    pub const LAND_COVER: &str = "Land Cover";
    pub const SOILS: &str = "Soil Layer from Web Soil Survey";
    pub const OVERALL: &str = "Overall";
    pub const COMPUTED_SUBAREAS: &str = "Drainage Subareas (Computed)";
    pub const OVERLAY: &str = "Overlay";
    pub const OVERLAY_PREVIEW: &str = "Overlay (Preview)";
}

// ---------------------------------------------------------------------------
// LayerCategory
// ---------------------------------------------------------------------------

/// Whether a layer was supplied by the caller or produced by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerCategory {
    Raw,
    Derived,
}

// ---------------------------------------------------------------------------
// LayerRole
// ---------------------------------------------------------------------------

/// The part an input layer plays in the overlay pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerRole {
    DrainageBoundaries,
    Subareas,
    Soils,
    LandCover,
}

impl LayerRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DrainageBoundaries => "drainage_boundaries",
            Self::Subareas => "subareas",
            Self::Soils => "soils",
            Self::LandCover => "land_cover",
        }
    }

    /// Display name of the raw layer playing this role.
    #[must_use]
    pub const fn layer_name(self) -> &'static str {
        match self {
            Self::DrainageBoundaries => names::DRAINAGE_AREAS,
            Self::Subareas => names::DRAINAGE_SUBAREAS,
            Self::Soils => names::SOILS,
            Self::LandCover => names::LAND_COVER,
        }
    }
}

impl fmt::Display for LayerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayerRole {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "drainage_boundaries" | "drainage_areas" | "da" | "boundaries" => {
                Ok(Self::DrainageBoundaries)
            }
            "subareas" | "drainage_subareas" | "sub_da" => Ok(Self::Subareas),
            "soils" | "soil" | "wss" => Ok(Self::Soils),
            "land_cover" | "landcover" | "lc" => Ok(Self::LandCover),
            _ => Err(CoreError::UnknownLayerRole(s.to_string())),
        }
    }
}

/// Result of guessing a layer's role from its file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDetection {
    pub role: LayerRole,
    /// Discharge point encoded in the file name (`da_to_dp_03` → `DP-03`).
    pub discharge_point: Option<String>,
}

/// Guess a layer role from a file stem such as `da_to_dp_03` or `sub-da`.
///
/// Extensions (`.zip`, `.geojson`, ...) are ignored.
#[must_use]
pub fn detect_role(file_name: &str, max_discharge_points: u32) -> Option<RoleDetection> {
    let stem = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name)
        .split('.')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    let tokens: Vec<&str> = stem
        .split(['-', '_', ' '])
        .filter(|t| !t.is_empty())
        .collect();

    let trailing_dp = |prefix_len: usize| {
        match tokens.get(prefix_len..) {
            Some([number]) => {
                let dp = naming::canonicalize_discharge_point(number, max_discharge_points);
                naming::is_discharge_point_name(&dp).then_some(dp)
            }
            _ => None,
        }
    };

    match tokens.as_slice() {
        ["da", "to", "dp", ..] if tokens.len() <= 4 => Some(RoleDetection {
            role: LayerRole::DrainageBoundaries,
            discharge_point: trailing_dp(3),
        }),
        ["sub", "da", ..] if tokens.len() <= 3 => Some(RoleDetection {
            role: LayerRole::Subareas,
            discharge_point: trailing_dp(2),
        }),
        ["da"] => Some(RoleDetection {
            role: LayerRole::DrainageBoundaries,
            discharge_point: None,
        }),
        ["subareas"] => Some(RoleDetection {
            role: LayerRole::Subareas,
            discharge_point: None,
        }),
        ["landcover", ..] | ["land", "cover", ..] => Some(RoleDetection {
            role: LayerRole::LandCover,
            discharge_point: None,
        }),
        [first, ..] if first.starts_with("soil") || first.starts_with("wss") => {
            Some(RoleDetection {
                role: LayerRole::Soils,
                discharge_point: None,
            })
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// NamedLayer
// ---------------------------------------------------------------------------

/// A named, ordered collection of polygon features.
///
/// Layers are never mutated in place by the pipeline; every stage returns a
/// new layer.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedLayer {
    pub name: String,
    pub category: LayerCategory,
    pub features: Vec<PolygonFeature>,
}

impl NamedLayer {
    #[must_use]
    pub fn raw(name: impl Into<String>, features: Vec<PolygonFeature>) -> Self {
        Self {
            name: name.into(),
            category: LayerCategory::Raw,
            features,
        }
    }

    #[must_use]
    pub fn derived(name: impl Into<String>, features: Vec<PolygonFeature>) -> Self {
        Self {
            name: name.into(),
            category: LayerCategory::Derived,
            features,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_drainage_files_with_discharge_point() {
        let d = detect_role("da_to_dp_03.zip", 20).expect("detected");
        assert_eq!(d.role, LayerRole::DrainageBoundaries);
        assert_eq!(d.discharge_point.as_deref(), Some("DP-03"));

        let d = detect_role("DA-TO-DP.geojson", 20).expect("detected");
        assert_eq!(d.role, LayerRole::DrainageBoundaries);
        assert_eq!(d.discharge_point, None);
    }

    #[test]
    fn detects_other_roles() {
        assert_eq!(
            detect_role("sub_da_2.geojson", 20).map(|d| d.role),
            Some(LayerRole::Subareas)
        );
        assert_eq!(
            detect_role("data/Land Cover Post.geojson", 20).map(|d| d.role),
            Some(LayerRole::LandCover)
        );
        assert_eq!(
            detect_role("wss_aoi_soils.geojson", 20).map(|d| d.role),
            Some(LayerRole::Soils)
        );
        assert_eq!(detect_role("pipes.geojson", 20), None);
    }

    #[test]
    fn role_parses_aliases() {
        assert_eq!("land-cover".parse::<LayerRole>().ok(), Some(LayerRole::LandCover));
        assert_eq!("DA".parse::<LayerRole>().ok(), Some(LayerRole::DrainageBoundaries));
        assert!("pipes".parse::<LayerRole>().is_err());
    }
}
