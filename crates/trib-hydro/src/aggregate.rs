//! Subcatchment aggregation.
//!
//! Overlay polygons are grouped by owning subarea name (case-insensitive),
//! then by `(cn, description)` within each subarea. Subcatchments are seeded
//! from the subarea layer so a subarea without any overlay area still shows
//! up, empty, and can be reported as incomplete.

use std::collections::BTreeSet;
use std::collections::HashSet;

use serde::Serialize;
use trib_core::attributes;
use trib_core::{Area, AreaGroup, HydrologicSoilGroup, NamedLayer, PolygonFeature, Subcatchment};
use trib_geometry as geometry;

/// Default identifier length limit, matching common model-file tools.
pub const DEFAULT_ID_MAX_LEN: usize = 31;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateOutput {
    /// Subcatchments in first-appearance order.
    pub subcatchments: Vec<Subcatchment>,
    /// Names of subcatchments with no CN bucket.
    pub incomplete: Vec<String>,
    /// Overlay polygons skipped because they had no CN or no subarea name.
    pub skipped_polygons: usize,
}

impl AggregateOutput {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.incomplete.is_empty()
    }
}

struct Bucket {
    cn: f64,
    description: Option<String>,
    area: Area,
}

struct Pending {
    key: String,
    name: String,
    parents: BTreeSet<String>,
    buckets: Vec<Bucket>,
}

impl Pending {
    fn add(&mut self, cn: f64, description: Option<String>, area: Area) {
        let existing = self
            .buckets
            .iter_mut()
            .find(|b| b.cn.total_cmp(&cn).is_eq() && b.description == description);
        match existing {
            Some(bucket) => bucket.area += area,
            None => self.buckets.push(Bucket {
                cn,
                description,
                area,
            }),
        }
    }
}

/// Build subcatchments from the final overlay and the subarea layer.
#[must_use]
pub fn aggregate(overlay: &NamedLayer, subareas: &NamedLayer, id_max_len: usize) -> AggregateOutput {
    let mut pending: Vec<Pending> = Vec::new();
    let mut skipped_polygons = 0;

    for feature in &subareas.features {
        entry(&mut pending, feature);
    }

    for feature in &overlay.features {
        let Some(cn) = feature.number(attributes::CN) else {
            skipped_polygons += 1;
            continue;
        };
        let Some(index) = entry(&mut pending, feature) else {
            skipped_polygons += 1;
            continue;
        };
        let area = feature
            .number(attributes::AREA_SF)
            .map_or_else(|| geometry::area(&feature.geometry), Area::from_sq_ft);
        pending[index].add(cn, describe(feature), area);
    }

    let mut ids = IdAllocator::new(id_max_len);
    let subcatchments: Vec<Subcatchment> = pending
        .into_iter()
        .map(|p| {
            let parent = (!p.parents.is_empty())
                .then(|| p.parents.iter().cloned().collect::<Vec<_>>().join(", "));
            let base = parent
                .as_ref()
                .map_or_else(|| p.name.clone(), |parent| format!("{parent}_{}", p.name));
            Subcatchment {
                id: ids.allocate(&base),
                name: p.name,
                parent_discharge_point: parent,
                areas: p
                    .buckets
                    .into_iter()
                    .map(|b| AreaGroup {
                        cn: b.cn,
                        description: b.description,
                        area_sq_ft: b.area.sq_ft(),
                    })
                    .collect(),
            }
        })
        .collect();

    let incomplete: Vec<String> = subcatchments
        .iter()
        .filter(|s| !s.is_complete())
        .map(|s| s.name.clone())
        .collect();

    tracing::info!(
        subcatchments = subcatchments.len(),
        incomplete = incomplete.len(),
        skipped = skipped_polygons,
        "subcatchments aggregated"
    );

    AggregateOutput {
        subcatchments,
        incomplete,
        skipped_polygons,
    }
}

/// Find or create the pending subcatchment a feature belongs to, recording
/// its parent label. `None` when the feature has no subarea name.
fn entry(pending: &mut Vec<Pending>, feature: &PolygonFeature) -> Option<usize> {
    let name = feature.text(attributes::SUBAREA_NAME)?;
    let key = name.to_lowercase();
    let index = if let Some(i) = pending.iter().position(|p| p.key == key) {
        i
    } else {
        pending.push(Pending {
            key,
            name,
            parents: BTreeSet::new(),
            buckets: Vec::new(),
        });
        pending.len() - 1
    };
    if let Some(parent) = feature.text(attributes::PARENT_DA) {
        pending[index].parents.insert(parent);
    }
    Some(index)
}

/// `"<land cover>[, HSG <letter>]"`, or `None` without a land cover.
fn describe(feature: &PolygonFeature) -> Option<String> {
    let land_cover = feature.text(attributes::LAND_COVER)?;
    let group = feature
        .text(attributes::HSG)
        .and_then(|raw| HydrologicSoilGroup::parse(&raw));
    Some(match group {
        Some(g) => format!("{land_cover}, HSG {g}"),
        None => land_cover,
    })
}

/// Identifier-safe form: anything outside `[A-Za-z0-9_-]` becomes `_`, runs
/// of `_` collapse, and the result is cut to `max_len` characters.
#[must_use]
pub fn sanitize_id(raw: &str, max_len: usize) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        let c = if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' };
        if c == '_' && out.ends_with('_') {
            continue;
        }
        out.push(c);
    }
    out.truncate(max_len);
    out
}

/// Hands out unique sanitized ids within one run.
struct IdAllocator {
    max_len: usize,
    used: HashSet<String>,
}

impl IdAllocator {
    fn new(max_len: usize) -> Self {
        Self {
            max_len,
            used: HashSet::new(),
        }
    }

    fn allocate(&mut self, raw: &str) -> String {
        let base = sanitize_id(raw, self.max_len);
        let base = if base.is_empty() { "SUB".to_string() } else { base };
        if self.used.insert(base.clone()) {
            return base;
        }
        let mut n = 1_u64;
        loop {
            n += 1;
            let suffix = format!("_{n}");
            let keep = self.max_len.saturating_sub(suffix.len());
            let candidate = format!("{}{suffix}", &base[..keep.min(base.len())]);
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use geo::{MultiPolygon, polygon};
    use pretty_assertions::assert_eq;
    use trib_core::attributes::Properties;
    use trib_core::layer::names;

    use super::*;

    fn feature(pairs: &[(&str, &str)]) -> PolygonFeature {
        let mut f = PolygonFeature::new(
            MultiPolygon::new(vec![polygon![
                (x: 0.0, y: 0.0),
                (x: 10.0, y: 0.0),
                (x: 10.0, y: 10.0),
                (x: 0.0, y: 10.0),
            ]]),
            Properties::new(),
        );
        for (k, v) in pairs {
            f.set(k, *v);
        }
        f
    }

    #[test]
    fn sanitizes_like_model_identifiers() {
        assert_eq!(sanitize_id("DP-01_North Lot #2", 31), "DP-01_North_Lot_2");
        assert_eq!(sanitize_id("a  b", 31), "a_b");
        assert_eq!(sanitize_id(&"x".repeat(40), 31).len(), 31);
    }

    #[test]
    fn collisions_get_numeric_suffixes_within_limit() {
        let mut ids = IdAllocator::new(10);
        assert_eq!(ids.allocate("ABCDEFGHIJKL"), "ABCDEFGHIJ");
        assert_eq!(ids.allocate("ABCDEFGHIJxx"), "ABCDEFGH_2");
        assert_eq!(ids.allocate("ABCDEFGHIJ"), "ABCDEFGH_3");
        assert_eq!(ids.allocate(""), "SUB");
    }

    #[test]
    fn seeds_from_subareas_and_reports_empty_ones() {
        let subareas = NamedLayer::derived(
            names::COMPUTED_SUBAREAS,
            vec![
                feature(&[("SUBAREA_NAME", "North"), ("PARENT_DA", "DP-01")]),
                feature(&[("SUBAREA_NAME", "South"), ("PARENT_DA", "DP-01")]),
            ],
        );
        let mut lawn = feature(&[
            ("SUBAREA_NAME", "north"),
            ("PARENT_DA", "DP-01"),
            ("LAND_COVER", "Lawn"),
            ("HSG", "B"),
        ]);
        lawn.set(attributes::CN, 61.0);
        let overlay = NamedLayer::derived(names::OVERLAY, vec![lawn]);

        let out = aggregate(&overlay, &subareas, DEFAULT_ID_MAX_LEN);
        assert_eq!(out.subcatchments.len(), 2);
        assert_eq!(out.subcatchments[0].id, "DP-01_North");
        assert_eq!(out.subcatchments[0].areas.len(), 1);
        assert_eq!(
            out.subcatchments[0].areas[0].description.as_deref(),
            Some("Lawn, HSG B")
        );
        assert_eq!(out.incomplete, vec!["South".to_string()]);
        assert!(!out.is_complete());
    }

    #[test]
    fn multiple_parent_labels_are_sorted_and_joined() {
        let subareas = NamedLayer::derived(
            names::COMPUTED_SUBAREAS,
            vec![
                feature(&[("SUBAREA_NAME", "Shared"), ("PARENT_DA", "DP-02")]),
                feature(&[("SUBAREA_NAME", "SHARED"), ("PARENT_DA", "DP-01")]),
            ],
        );
        let out = aggregate(&NamedLayer::derived(names::OVERLAY, Vec::new()), &subareas, 31);
        assert_eq!(out.subcatchments.len(), 1);
        assert_eq!(
            out.subcatchments[0].parent_discharge_point.as_deref(),
            Some("DP-01, DP-02")
        );
        assert_eq!(out.subcatchments[0].id, "DP-01_DP-02_Shared");
    }

    #[test]
    fn area_falls_back_to_geometry() {
        let subareas = NamedLayer::derived(names::COMPUTED_SUBAREAS, Vec::new());
        let mut f = feature(&[("SUBAREA_NAME", "Lot"), ("LAND_COVER", "Woods")]);
        f.set(attributes::CN, 55.0);
        let out = aggregate(&NamedLayer::derived(names::OVERLAY, vec![f]), &subareas, 31);
        let group = &out.subcatchments[0].areas[0];
        assert_eq!(group.description.as_deref(), Some("Woods"));
        assert!((group.area_sq_ft - 1_076.391).abs() < 1e-2);
        assert_eq!(out.subcatchments[0].parent_discharge_point, None);
        assert_eq!(out.subcatchments[0].id, "Lot");
    }
}
