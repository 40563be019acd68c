//! GeoJSON layer files in and out.

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use geojson::{Feature, FeatureCollection, GeoJson, JsonObject};
use trib_core::layer::detect_role;
use trib_core::{AttrValue, NamedLayer, PolygonFeature, Properties};
use trib_hydro::RawLayer;

use crate::cli::root_commands::LayerArgs;

/// Read a GeoJSON file as a raw layer named after the file stem.
pub fn read_layer(path: &Path) -> anyhow::Result<NamedLayer> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read layer {}", path.display()))?;
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("layer");
    parse_layer(name, &text).with_context(|| format!("invalid GeoJSON in {}", path.display()))
}

/// Parse GeoJSON text into a raw layer. Only polygonal features are kept;
/// points and lines belong to unrelated layers and are skipped.
pub fn parse_layer(name: &str, text: &str) -> anyhow::Result<NamedLayer> {
    let features = match text.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(collection) => collection.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(geometry) => vec![Feature::from(geometry)],
    };

    let mut polygons = Vec::with_capacity(features.len());
    let mut skipped = 0usize;
    for feature in features {
        let properties = feature
            .properties
            .as_ref()
            .map(properties_from_json)
            .unwrap_or_default();
        let Some(geometry) = feature.geometry else {
            skipped += 1;
            continue;
        };
        match geo::Geometry::<f64>::try_from(geometry.value)? {
            geo::Geometry::Polygon(polygon) => {
                polygons.push(PolygonFeature::from_polygon(polygon, properties));
            }
            geo::Geometry::MultiPolygon(parts) => {
                polygons.push(PolygonFeature::new(parts, properties));
            }
            _ => skipped += 1,
        }
    }
    if skipped > 0 {
        tracing::debug!(layer = name, skipped, "ignored non-polygon features");
    }
    Ok(NamedLayer::raw(name, polygons))
}

fn properties_from_json(object: &JsonObject) -> Properties {
    object
        .iter()
        .map(|(key, value)| (key.clone(), AttrValue::from(value)))
        .collect()
}

#[must_use]
pub fn to_feature_collection(layer: &NamedLayer) -> FeatureCollection {
    let features = layer
        .features
        .iter()
        .map(|feature| Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(geojson::Value::from(&feature.geometry))),
            id: None,
            properties: Some(
                feature
                    .properties
                    .iter()
                    .map(|(key, value)| (key.clone(), serde_json::Value::from(value)))
                    .collect(),
            ),
            foreign_members: None,
        })
        .collect();
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

pub fn write_layer(path: &Path, layer: &NamedLayer) -> anyhow::Result<()> {
    let text = serde_json::to_string(&to_feature_collection(layer))?;
    std::fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))
}

/// `Drainage Subareas (Computed)` → `drainage_subareas_computed`.
#[must_use]
pub fn file_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('_') {
            slug.push('_');
        }
    }
    let slug = slug.trim_matches('_');
    if slug.is_empty() {
        "layer".to_string()
    } else {
        slug.to_string()
    }
}

/// Write each layer as `<dir>/<slug>.geojson`, creating `dir` if needed.
pub fn write_layers(dir: &Path, layers: &[NamedLayer]) -> anyhow::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;
    layers
        .iter()
        .map(|layer| {
            let path = dir.join(format!("{}.geojson", file_slug(&layer.name)));
            write_layer(&path, layer)?;
            Ok(path)
        })
        .collect()
}

/// Read every input, assigning roles from explicit `ROLE=PATH` specs or
/// from the file name.
pub fn collect_raw_layers(args: &LayerArgs, max_discharge_points: u32) -> anyhow::Result<Vec<RawLayer>> {
    let mut raw = Vec::with_capacity(args.inputs.len() + args.explicit.len());

    for path in &args.inputs {
        let file_name = path.to_string_lossy();
        let Some(detected) = detect_role(&file_name, max_discharge_points) else {
            bail!(
                "cannot tell which layer {} is; pass it as --layer ROLE=PATH",
                path.display()
            );
        };
        let mut layer = RawLayer::new(detected.role, read_layer(path)?);
        if let Some(dp) = detected.discharge_point {
            layer = layer.with_discharge_point(dp);
        }
        tracing::debug!(path = %path.display(), role = %detected.role, "detected layer role");
        raw.push(layer);
    }

    for spec in &args.explicit {
        let implied = detect_role(&spec.path.to_string_lossy(), max_discharge_points)
            .filter(|d| d.role == spec.role)
            .and_then(|d| d.discharge_point);
        let mut layer = RawLayer::new(spec.role, read_layer(&spec.path)?);
        if let Some(dp) = implied {
            layer = layer.with_discharge_point(dp);
        }
        raw.push(layer);
    }

    if raw.is_empty() {
        bail!("no input layers given");
    }
    Ok(raw)
}
