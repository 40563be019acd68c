//! Subarea clipping and complement generation.
//!
//! Boundaries are grouped by discharge point. Each group is clipped to the
//! overall boundary, every declared subarea is clipped to its group, and
//! whatever the subareas leave uncovered becomes one complement feature per
//! remaining polygon part.

use geo::MultiPolygon;
use serde::Serialize;
use trib_core::attributes::{self, Properties};
use trib_core::layer::names;
use trib_core::{Area, NamedLayer, PolygonFeature};
use trib_geometry as geometry;

use crate::OverlaySettings;

/// Operator-facing tallies for one subarea run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SubareaReport {
    pub complements_generated: usize,
    /// Declared subareas that fell outside their clipped parent.
    pub subareas_skipped: usize,
    /// Discharge-point groups entirely outside the overall boundary.
    pub parents_skipped: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubareaOutput {
    /// Normalized subareas and complements, parent by parent.
    pub layer: NamedLayer,
    pub report: SubareaReport,
}

/// Boundary polygons sharing one discharge-point name.
struct ParentGroup<'a> {
    name: String,
    features: Vec<&'a PolygonFeature>,
}

fn group_boundaries(boundaries: &NamedLayer) -> Vec<ParentGroup<'_>> {
    let mut groups: Vec<ParentGroup<'_>> = Vec::new();
    for feature in &boundaries.features {
        let Some(name) = feature.text(attributes::DA_NAME) else {
            continue;
        };
        match groups.iter_mut().find(|g| g.name.eq_ignore_ascii_case(&name)) {
            Some(group) => group.features.push(feature),
            None => groups.push(ParentGroup {
                name,
                features: vec![feature],
            }),
        }
    }
    groups
}

/// Clip subareas to their parents and materialize complements.
///
/// `subareas` may be empty, in which case every clipped parent becomes one or
/// more complements. Subareas whose parent does not match any boundary group
/// are ignored here; completeness validation reports them beforehand.
#[must_use]
pub fn process_subareas(
    boundaries: &NamedLayer,
    subareas: &NamedLayer,
    overall: &PolygonFeature,
    settings: &OverlaySettings,
) -> SubareaOutput {
    let mut report = SubareaReport::default();
    let mut features = Vec::new();

    for group in group_boundaries(boundaries) {
        let union = geometry::union_all(group.features.iter().map(|f| &f.geometry));
        let Some(clipped) = geometry::clip(&union, &overall.geometry, settings.area_tolerance)
        else {
            report.parents_skipped += 1;
            tracing::warn!(parent = %group.name, "drainage area lies outside the overall boundary");
            continue;
        };
        let parent_props = group
            .features
            .first()
            .map(|f| f.properties.clone())
            .unwrap_or_default();

        let declared = subareas.features.iter().filter(|s| {
            s.text(attributes::PARENT_DA)
                .is_some_and(|p| p.eq_ignore_ascii_case(&group.name))
        });

        let mut kept: Vec<MultiPolygon<f64>> = Vec::new();
        for (position, subarea) in declared.enumerate() {
            let Some(geom) =
                geometry::clip(&subarea.geometry, &clipped, settings.area_tolerance)
            else {
                report.subareas_skipped += 1;
                tracing::debug!(parent = %group.name, position = position + 1, "subarea trimmed away");
                continue;
            };
            let name = subarea
                .text(attributes::SUBAREA_NAME)
                .unwrap_or_else(|| format!("{} - Subarea {}", group.name, position + 1));
            let acres = geometry::area(&geom).acres();
            let props = attributes::merged(&parent_props, &subarea.properties);
            kept.push(geom.clone());
            features.push(
                PolygonFeature::new(geom, props)
                    .with(attributes::SUBAREA_NAME, name)
                    .with(attributes::PARENT_DA, group.name.as_str())
                    .with(attributes::IS_COMPLEMENT, false)
                    .with(attributes::SUBAREA_AC, acres),
            );
        }

        let remainder = remainder_after(&clipped, &kept);
        for part in geometry::flatten(&remainder) {
            let part = MultiPolygon::new(vec![part]);
            let area = geometry::area(&part);
            if !area.exceeds(settings.min_complement) {
                continue;
            }
            report.complements_generated += 1;
            features.push(complement(&group.name, &parent_props, part, area));
        }
    }

    tracing::info!(
        features = features.len(),
        complements = report.complements_generated,
        subareas_skipped = report.subareas_skipped,
        parents_skipped = report.parents_skipped,
        "subareas processed"
    );

    SubareaOutput {
        layer: NamedLayer::derived(names::COMPUTED_SUBAREAS, features),
        report,
    }
}

/// Subtract each subarea in turn. An unusable intermediate result empties
/// the remainder so no complement is produced from a broken difference.
fn remainder_after(clipped: &MultiPolygon<f64>, subareas: &[MultiPolygon<f64>]) -> MultiPolygon<f64> {
    let mut remainder = clipped.clone();
    for subarea in subareas {
        let next = geometry::difference(&remainder, subarea);
        if !geometry::is_usable(&next) {
            return MultiPolygon::new(Vec::new());
        }
        remainder = next;
    }
    remainder
}

fn complement(
    parent: &str,
    parent_props: &Properties,
    geometry: MultiPolygon<f64>,
    area: Area,
) -> PolygonFeature {
    PolygonFeature::new(geometry, parent_props.clone())
        .with(attributes::SUBAREA_NAME, format!("{parent} - Complement"))
        .with(attributes::PARENT_DA, parent)
        .with(attributes::IS_COMPLEMENT, true)
        .with(attributes::SUBAREA_AC, area.acres())
}
