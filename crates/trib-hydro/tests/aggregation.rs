use std::collections::HashSet;

use geo::{MultiPolygon, polygon};
use pretty_assertions::assert_eq;
use trib_core::attributes::{self, Properties};
use trib_core::layer::names;
use trib_core::{NamedLayer, PolygonFeature};
use trib_hydro::aggregate;

fn feature(pairs: &[(&str, &str)], cn: Option<f64>, area_sf: Option<f64>) -> PolygonFeature {
    let mut f = PolygonFeature::new(
        MultiPolygon::new(vec![polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0)]]),
        Properties::new(),
    );
    for (k, v) in pairs {
        f.set(k, *v);
    }
    if let Some(cn) = cn {
        f.set(attributes::CN, cn);
    }
    if let Some(area) = area_sf {
        f.set(attributes::AREA_SF, area);
    }
    f
}

#[test]
fn matching_buckets_sum_their_area() {
    let lawn = [
        (attributes::SUBAREA_NAME, "North"),
        (attributes::PARENT_DA, "DP-01"),
        (attributes::LAND_COVER, "Lawn"),
        (attributes::HSG, "B"),
    ];
    let overlay = NamedLayer::derived(
        names::OVERLAY,
        vec![
            feature(&lawn, Some(61.0), Some(1_000.0)),
            feature(&lawn, Some(61.0), Some(250.0)),
        ],
    );
    let subareas = NamedLayer::derived(names::COMPUTED_SUBAREAS, Vec::new());

    let out = aggregate(&overlay, &subareas, 31);
    assert_eq!(out.subcatchments.len(), 1);
    let areas = &out.subcatchments[0].areas;
    assert_eq!(areas.len(), 1);
    assert_eq!(areas[0].cn, 61.0);
    assert_eq!(areas[0].description.as_deref(), Some("Lawn, HSG B"));
    assert!((areas[0].area_sq_ft - 1_250.0).abs() < 1e-6);
}

#[test]
fn different_cn_or_description_stay_separate() {
    let overlay = NamedLayer::derived(
        names::OVERLAY,
        vec![
            feature(
                &[(attributes::SUBAREA_NAME, "A"), (attributes::LAND_COVER, "Lawn"), (attributes::HSG, "B")],
                Some(61.0),
                Some(10.0),
            ),
            feature(
                &[(attributes::SUBAREA_NAME, "A"), (attributes::LAND_COVER, "Lawn"), (attributes::HSG, "C")],
                Some(74.0),
                Some(10.0),
            ),
            feature(&[(attributes::SUBAREA_NAME, "A")], Some(61.0), Some(10.0)),
            // No CN: skipped.
            feature(&[(attributes::SUBAREA_NAME, "A")], None, Some(10.0)),
        ],
    );
    let out = aggregate(&overlay, &NamedLayer::derived(names::COMPUTED_SUBAREAS, Vec::new()), 31);
    assert_eq!(out.subcatchments[0].areas.len(), 3);
    assert_eq!(out.skipped_polygons, 1);
}

#[test]
fn ids_are_unique_after_sanitizing_and_truncation() {
    let long = "Drainage Area Number One Northern Half";
    let long_b = format!("{long} B");
    let subareas = NamedLayer::derived(
        names::COMPUTED_SUBAREAS,
        vec![
            feature(&[(attributes::SUBAREA_NAME, long), (attributes::PARENT_DA, "DP-01")], None, None),
            feature(&[(attributes::SUBAREA_NAME, long_b.as_str()), (attributes::PARENT_DA, "DP-01")], None, None),
            feature(&[(attributes::SUBAREA_NAME, "Lot 1"), (attributes::PARENT_DA, "DP-02")], None, None),
            feature(&[(attributes::SUBAREA_NAME, "Lot#1"), (attributes::PARENT_DA, "DP-02")], None, None),
        ],
    );
    let out = aggregate(&NamedLayer::derived(names::OVERLAY, Vec::new()), &subareas, 31);

    let ids: Vec<&str> = out.subcatchments.iter().map(|s| s.id.as_str()).collect();
    let unique: HashSet<&str> = ids.iter().copied().collect();
    assert_eq!(unique.len(), ids.len(), "{ids:?}");
    assert!(ids.iter().all(|id| id.len() <= 31));
    assert_eq!(ids[2], "DP-02_Lot_1");
    assert_eq!(ids[3], "DP-02_Lot_1_2");
    assert_eq!(out.incomplete.len(), 4);
}
