//! Overall drainage boundary.

use trib_core::attributes;
use trib_core::layer::names;
use trib_core::{Area, NamedLayer, PolygonFeature};
use trib_geometry as geometry;

/// Dissolve every drainage-boundary polygon into one reference boundary.
///
/// Returns `None` ("absent") when nothing usable remains or the union is not
/// above `tolerance`; callers must then drop any previously derived overall
/// layer. Unusable input geometries are skipped.
#[must_use]
pub fn build_overall(boundaries: &NamedLayer, tolerance: Area) -> Option<PolygonFeature> {
    let union = geometry::union_all(boundaries.features.iter().map(|f| &f.geometry));
    let Some(union) = geometry::significant(union, tolerance) else {
        tracing::debug!(inputs = boundaries.len(), "overall boundary is absent");
        return None;
    };

    let area = geometry::area(&union);
    tracing::debug!(parts = union.0.len(), acres = area.acres(), "overall boundary built");
    Some(
        PolygonFeature::new(union, attributes::Properties::new())
            .with("NAME", names::OVERALL)
            .with(attributes::AREA_SF, area.sq_ft())
            .with(attributes::AREA_AC, area.acres()),
    )
}

/// The overall boundary wrapped as a derived layer (empty when absent).
#[must_use]
pub fn overall_layer(overall: Option<&PolygonFeature>) -> NamedLayer {
    NamedLayer::derived(names::OVERALL, overall.cloned().into_iter().collect())
}
