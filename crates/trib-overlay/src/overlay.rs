//! Soils x land cover x (subareas | overall) intersection.
//!
//! Every input layer is first clipped to the overall boundary, then layers
//! are intersected pairwise in order. A candidate pair is only intersected
//! when the bounding rectangles overlap. Results at or below the area
//! tolerance are discarded. Attributes of later layers win on collision.

use serde::Serialize;
use trib_core::attributes;
use trib_core::layer::names;
use trib_core::{NamedLayer, PolygonFeature};
use trib_geometry as geometry;

use crate::OverlaySettings;

/// Curve-number lookup used to tag overlay polygons.
///
/// Implementations must never synthesize a value: an unknown land cover or a
/// soil group outside `A`..`D` yields `None`.
pub trait CurveNumbers {
    fn curve_number(&self, land_cover: &str, hsg: &str) -> Option<f64>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OverlayReport {
    /// Pairs whose bounding rectangles overlapped.
    pub candidates_tested: usize,
    /// Intersections with no area above tolerance.
    pub empty_discarded: usize,
    pub features: usize,
    /// Output polygons without a resolved curve number.
    pub unresolved_cn: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayOutput {
    pub layer: NamedLayer,
    pub report: OverlayReport,
}

/// Early-feedback overlay: soils x land cover within the overall boundary.
#[must_use]
pub fn preview_overlay<C>(
    soils: &NamedLayer,
    land_cover: &NamedLayer,
    overall: &PolygonFeature,
    curve_numbers: &C,
    settings: &OverlaySettings,
) -> OverlayOutput
where
    C: CurveNumbers + ?Sized,
{
    run(
        names::OVERLAY_PREVIEW,
        &[std::slice::from_ref(overall), &soils.features, &land_cover.features],
        overall,
        curve_numbers,
        settings,
    )
}

/// Final overlay: subareas -> soils -> land cover, so every polygon carries
/// its owning subarea's name and parent.
#[must_use]
pub fn final_overlay<C>(
    subareas: &NamedLayer,
    soils: &NamedLayer,
    land_cover: &NamedLayer,
    overall: &PolygonFeature,
    curve_numbers: &C,
    settings: &OverlaySettings,
) -> OverlayOutput
where
    C: CurveNumbers + ?Sized,
{
    run(
        names::OVERLAY,
        &[&subareas.features, &soils.features, &land_cover.features],
        overall,
        curve_numbers,
        settings,
    )
}

fn run<C>(
    name: &str,
    layers: &[&[PolygonFeature]],
    overall: &PolygonFeature,
    curve_numbers: &C,
    settings: &OverlaySettings,
) -> OverlayOutput
where
    C: CurveNumbers + ?Sized,
{
    let mut report = OverlayReport::default();
    let clipped: Vec<Vec<PolygonFeature>> = layers
        .iter()
        .map(|layer| clip_to(layer, overall, settings))
        .collect();

    let mut current = clipped.first().cloned().unwrap_or_default();
    for next in clipped.iter().skip(1) {
        current = intersect(&current, next, settings, &mut report);
    }

    let features: Vec<PolygonFeature> = current
        .into_iter()
        .map(|feature| tag(feature, curve_numbers, &mut report))
        .collect();
    report.features = features.len();

    tracing::info!(
        layer = name,
        features = report.features,
        candidates = report.candidates_tested,
        discarded = report.empty_discarded,
        unresolved_cn = report.unresolved_cn,
        "overlay computed"
    );

    OverlayOutput {
        layer: NamedLayer::derived(name, features),
        report,
    }
}

/// Area filter against the overall boundary; attributes are untouched.
fn clip_to(
    features: &[PolygonFeature],
    overall: &PolygonFeature,
    settings: &OverlaySettings,
) -> Vec<PolygonFeature> {
    features
        .iter()
        .filter_map(|f| {
            geometry::clip(&f.geometry, &overall.geometry, settings.area_tolerance)
                .map(|geom| PolygonFeature::new(geom, f.properties.clone()))
        })
        .collect()
}

fn intersect(
    left: &[PolygonFeature],
    right: &[PolygonFeature],
    settings: &OverlaySettings,
    report: &mut OverlayReport,
) -> Vec<PolygonFeature> {
    let mut out = Vec::new();
    for a in left {
        for b in right {
            if !geometry::bbox_overlaps(&a.geometry, &b.geometry) {
                continue;
            }
            report.candidates_tested += 1;
            let piece = geometry::intersection(&a.geometry, &b.geometry);
            match geometry::significant(piece, settings.area_tolerance) {
                Some(geom) => out.push(PolygonFeature::new(
                    geom,
                    attributes::merged(&a.properties, &b.properties),
                )),
                None => report.empty_discarded += 1,
            }
        }
    }
    out
}

fn tag<C>(mut feature: PolygonFeature, curve_numbers: &C, report: &mut OverlayReport) -> PolygonFeature
where
    C: CurveNumbers + ?Sized,
{
    let area = geometry::area(&feature.geometry);
    feature.set(attributes::AREA_SF, area.sq_ft());
    feature.set(attributes::AREA_AC, area.acres());

    let cn = match (
        feature.text(attributes::LAND_COVER),
        feature.text(attributes::HSG),
    ) {
        (Some(lc), Some(hsg)) => curve_numbers.curve_number(&lc, &hsg),
        _ => None,
    };
    match cn {
        Some(cn) => feature.set(attributes::CN, cn),
        None => {
            feature.properties.remove(attributes::CN);
            report.unresolved_cn += 1;
        }
    }
    feature
}

#[cfg(test)]
mod tests {
    use geo::{MultiPolygon, polygon};
    use pretty_assertions::assert_eq;
    use trib_core::attributes::Properties;

    use super::*;

    struct Lawn;

    impl CurveNumbers for Lawn {
        fn curve_number(&self, land_cover: &str, hsg: &str) -> Option<f64> {
            match (land_cover, hsg) {
                ("Lawn", "B") => Some(61.0),
                ("Lawn", "C") => Some(74.0),
                _ => None,
            }
        }
    }

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64, props: &[(&str, &str)]) -> PolygonFeature {
        let mut f = PolygonFeature::new(
            MultiPolygon::new(vec![polygon![
                (x: x0, y: y0),
                (x: x1, y: y0),
                (x: x1, y: y1),
                (x: x0, y: y1),
            ]]),
            Properties::new(),
        );
        for (k, v) in props {
            f.set(k, *v);
        }
        f
    }

    #[test]
    fn preview_splits_by_soil_and_tags_cn() {
        let overall = rect(0.0, 0.0, 100.0, 100.0, &[]);
        let soils = NamedLayer::raw(
            names::SOILS,
            vec![
                rect(0.0, 0.0, 50.0, 100.0, &[("HSG", "B")]),
                rect(50.0, 0.0, 100.0, 100.0, &[("HSG", "C")]),
            ],
        );
        let lc = NamedLayer::raw(
            names::LAND_COVER,
            vec![rect(-10.0, -10.0, 110.0, 110.0, &[("LAND_COVER", "Lawn")])],
        );

        let out = preview_overlay(&soils, &lc, &overall, &Lawn, &OverlaySettings::default());
        let cns: Vec<_> = out
            .layer
            .features
            .iter()
            .filter_map(|f| f.number(attributes::CN))
            .collect();
        assert_eq!(cns, vec![61.0, 74.0]);
        assert_eq!(out.report.features, 2);
        assert_eq!(out.report.unresolved_cn, 0);
        let total: f64 = out
            .layer
            .features
            .iter()
            .map(|f| geometry::area(&f.geometry).sq_m())
            .sum();
        assert!((total - 10_000.0).abs() < 1e-6);
    }

    #[test]
    fn final_overlay_carries_subarea_attributes() {
        let overall = rect(0.0, 0.0, 10.0, 10.0, &[]);
        let subareas = NamedLayer::derived(
            names::COMPUTED_SUBAREAS,
            vec![rect(0.0, 0.0, 10.0, 10.0, &[("SUBAREA_NAME", "North"), ("PARENT_DA", "DP-01")])],
        );
        let soils = NamedLayer::raw(names::SOILS, vec![rect(0.0, 0.0, 10.0, 10.0, &[("HSG", "E")])]);
        let lc = NamedLayer::raw(
            names::LAND_COVER,
            vec![rect(0.0, 0.0, 10.0, 10.0, &[("LAND_COVER", "Lawn")])],
        );

        let out = final_overlay(&subareas, &soils, &lc, &overall, &Lawn, &OverlaySettings::default());
        assert_eq!(out.layer.len(), 1);
        let f = &out.layer.features[0];
        assert_eq!(f.text(attributes::SUBAREA_NAME).as_deref(), Some("North"));
        assert_eq!(f.number(attributes::CN), None);
        assert_eq!(out.report.unresolved_cn, 1);
        assert!((f.number(attributes::AREA_SF).unwrap_or_default() - 1_076.391).abs() < 1e-2);
    }

    #[test]
    fn touching_polygons_are_discarded() {
        let overall = rect(0.0, 0.0, 20.0, 10.0, &[]);
        let soils = NamedLayer::raw(names::SOILS, vec![rect(0.0, 0.0, 10.0, 10.0, &[("HSG", "B")])]);
        let lc = NamedLayer::raw(
            names::LAND_COVER,
            vec![rect(10.0, 0.0, 20.0, 10.0, &[("LAND_COVER", "Lawn")])],
        );
        let out = preview_overlay(&soils, &lc, &overall, &Lawn, &OverlaySettings::default());
        assert!(out.layer.is_empty());
        assert_eq!(out.report.empty_discarded, 1);
    }

    #[test]
    fn later_layers_win_attribute_collisions() {
        let overall = rect(0.0, 0.0, 10.0, 10.0, &[]);
        let soils = NamedLayer::raw(
            names::SOILS,
            vec![rect(0.0, 0.0, 10.0, 10.0, &[("HSG", "B"), ("SOURCE", "soils")])],
        );
        let lc = NamedLayer::raw(
            names::LAND_COVER,
            vec![rect(0.0, 0.0, 10.0, 10.0, &[("LAND_COVER", "Lawn"), ("SOURCE", "lc")])],
        );
        let out = preview_overlay(&soils, &lc, &overall, &Lawn, &OverlaySettings::default());
        assert_eq!(out.layer.features[0].text("SOURCE").as_deref(), Some("lc"));
    }
}
