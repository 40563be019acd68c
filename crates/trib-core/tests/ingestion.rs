use geo::polygon;
use pretty_assertions::assert_eq;
use trib_core::attributes::{self, Properties};
use trib_core::layer::detect_role;
use trib_core::schema::{NormalizeOptions, normalize_layer};
use trib_core::{AttrValue, LayerRole, NamedLayer, PolygonFeature};

fn feature(pairs: &[(&str, AttrValue)]) -> PolygonFeature {
    let properties: Properties = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect();
    PolygonFeature::from_polygon(
        polygon![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0), (x: 10.0, y: 10.0), (x: 0.0, y: 10.0)],
        properties,
    )
}

#[test]
fn file_name_implies_discharge_point_for_unlabeled_boundaries() {
    let detected = detect_role("exports/DA_TO_DP_7.geojson", 20).expect("role");
    assert_eq!(detected.role, LayerRole::DrainageBoundaries);

    let layer = NamedLayer::raw(
        "DA_TO_DP_7",
        vec![
            feature(&[("Area", AttrValue::Number(1.0))]),
            feature(&[("dp", AttrValue::from("dp2"))]),
        ],
    );
    let opts = NormalizeOptions {
        implied_discharge_point: detected.discharge_point.as_deref(),
        ..NormalizeOptions::default()
    };
    let normalized = normalize_layer(&layer, detected.role, &opts);

    let names: Vec<_> = normalized
        .features
        .iter()
        .map(|f| f.text(attributes::DA_NAME))
        .collect();
    assert_eq!(names, vec![Some("DP-07".to_string()), Some("DP-02".to_string())]);
    // Unrelated attributes survive, and the source layer is untouched.
    assert_eq!(normalized.features[0].number("Area"), Some(1.0));
    assert_eq!(layer.features[0].text(attributes::DA_NAME), None);
}

#[test]
fn soils_and_land_cover_use_canonical_keys() {
    let soils = NamedLayer::raw(
        "soils",
        vec![
            feature(&[("hydgrp", AttrValue::from("b/d")), ("musym", AttrValue::from("wsb"))]),
            feature(&[("MUSYM", AttrValue::from("Pa"))]),
        ],
    );
    let soils = normalize_layer(&soils, LayerRole::Soils, &NormalizeOptions::default());
    assert_eq!(soils.features[0].text(attributes::HSG).as_deref(), Some("B"));
    assert_eq!(soils.features[0].text(attributes::MUSYM).as_deref(), Some("WSB"));
    assert_eq!(soils.features[1].text(attributes::HSG), None);

    let known = vec!["Woods - Good".to_string()];
    let lc = NamedLayer::raw(
        "lc",
        vec![feature(&[("LandCover", AttrValue::from("woods - GOOD"))])],
    );
    let lc = normalize_layer(
        &lc,
        LayerRole::LandCover,
        &NormalizeOptions {
            land_cover_names: &known,
            ..NormalizeOptions::default()
        },
    );
    assert_eq!(
        lc.features[0].text(attributes::LAND_COVER).as_deref(),
        Some("Woods - Good")
    );
}
