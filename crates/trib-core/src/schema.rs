//! Ingestion normalization onto the canonical attribute schema.
//!
//! Runs once per raw layer. Each canonical key is resolved from an ordered
//! alias list, matched case-insensitively, and written back under its
//! canonical name. Unrelated source attributes are carried through untouched.

use crate::attributes::{self, AttrValue};
use crate::feature::PolygonFeature;
use crate::hsg;
use crate::layer::{LayerRole, NamedLayer};
use crate::naming;

const DA_NAME_ALIASES: &[&str] = &[
    attributes::DA_NAME,
    "DP_NAME",
    "DISCHARGE_POINT",
    "DP",
];
const SUBAREA_NAME_ALIASES: &[&str] = &[attributes::SUBAREA_NAME, "SUBAREA", "SUB_NAME", "NAME"];
const PARENT_ALIASES: &[&str] = &[
    attributes::PARENT_DA,
    "PARENT",
    attributes::DA_NAME,
    "DP",
];
const HSG_ALIASES: &[&str] = &[attributes::HSG, "HYDGRP", "HYDROLOGIC_GROUP"];
const MUSYM_ALIASES: &[&str] = &[attributes::MUSYM, "MU_SYM"];
const MUNAME_ALIASES: &[&str] = &[attributes::MUNAME, "MU_NAME"];
const LAND_COVER_ALIASES: &[&str] = &[
    attributes::LAND_COVER,
    "LANDCOVER",
    "LAND_USE",
    "DESCRIPTION",
];

/// Inputs that steer normalization of a single layer.
#[derive(Debug, Clone, Copy)]
pub struct NormalizeOptions<'a> {
    /// Upper bound for `DP-NN` canonicalization.
    pub max_discharge_points: u32,
    /// Known land-cover spellings (usually the CN table's entries).
    pub land_cover_names: &'a [String],
    /// Discharge point implied by the source file name, used when a drainage
    /// boundary or subarea carries no discharge-point attribute of its own.
    pub implied_discharge_point: Option<&'a str>,
}

impl Default for NormalizeOptions<'_> {
    fn default() -> Self {
        Self {
            max_discharge_points: 20,
            land_cover_names: &[],
            implied_discharge_point: None,
        }
    }
}

/// Return a copy of `layer` whose features use canonical attribute keys.
#[must_use]
pub fn normalize_layer(layer: &NamedLayer, role: LayerRole, opts: &NormalizeOptions<'_>) -> NamedLayer {
    let features = layer
        .features
        .iter()
        .map(|feature| normalize_feature(feature, role, opts))
        .collect();
    NamedLayer {
        name: layer.name.clone(),
        category: layer.category,
        features,
    }
}

fn normalize_feature(
    feature: &PolygonFeature,
    role: LayerRole,
    opts: &NormalizeOptions<'_>,
) -> PolygonFeature {
    let mut out = feature.clone();
    let lookup = |aliases: &[&str]| {
        attributes::find_ci(&feature.properties, aliases).and_then(AttrValue::as_text)
    };

    match role {
        LayerRole::DrainageBoundaries => {
            let raw = lookup(DA_NAME_ALIASES).or_else(|| opts.implied_discharge_point.map(str::to_string));
            if let Some(raw) = raw {
                out.set(
                    attributes::DA_NAME,
                    naming::canonicalize_discharge_point(&raw, opts.max_discharge_points),
                );
            }
        }
        LayerRole::Subareas => {
            if let Some(name) = lookup(SUBAREA_NAME_ALIASES) {
                out.set(attributes::SUBAREA_NAME, name);
            }
            let raw = lookup(PARENT_ALIASES).or_else(|| opts.implied_discharge_point.map(str::to_string));
            if let Some(raw) = raw {
                out.set(
                    attributes::PARENT_DA,
                    naming::canonicalize_discharge_point(&raw, opts.max_discharge_points),
                );
            }
        }
        LayerRole::Soils => {
            let group = lookup(HSG_ALIASES).map(|raw| hsg::simplify(&raw)).unwrap_or_default();
            out.set(attributes::HSG, group);
            if let Some(symbol) = lookup(MUSYM_ALIASES) {
                out.set(attributes::MUSYM, symbol.to_ascii_uppercase());
            }
            if let Some(name) = lookup(MUNAME_ALIASES) {
                out.set(attributes::MUNAME, name);
            }
        }
        LayerRole::LandCover => {
            let raw = lookup(LAND_COVER_ALIASES).unwrap_or_default();
            let matched = opts
                .land_cover_names
                .iter()
                .find(|known| known.eq_ignore_ascii_case(&raw))
                .cloned();
            out.set(attributes::LAND_COVER, matched.unwrap_or(raw));
        }
    }

    out
}
