//! Applying looked-up soil groups to a normalized soils layer.

use std::collections::HashMap;

use serde::Serialize;
use trib_core::attributes;
use trib_core::{EventLog, HydrologicSoilGroup, NamedLayer, Stage};

use crate::SoilRecord;
use crate::query::normalize_symbols;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    /// Features whose blank `HSG` was filled.
    pub filled: usize,
    /// Features that already had a valid `HSG`.
    pub kept: usize,
    /// Features still without a soil group.
    pub missing: usize,
}

/// Distinct map unit symbols of features that still need a soil group.
#[must_use]
pub fn symbols_needing_lookup(soils: &NamedLayer) -> Vec<String> {
    normalize_symbols(
        soils
            .features
            .iter()
            .filter(|f| !has_valid_group(f.text(attributes::HSG).as_deref()))
            .filter_map(|f| f.text(attributes::MUSYM)),
    )
}

fn has_valid_group(raw: Option<&str>) -> bool {
    raw.and_then(HydrologicSoilGroup::parse).is_some()
}

/// Return a copy of `soils` with blank or invalid `HSG` values filled from
/// `records` (matched by upper-cased `MUSYM`). Valid existing values and
/// all other attributes are left alone; a blank `MUNAME` is filled too.
/// A summary goes to `events`, with a warning when groups remain missing.
pub fn apply_hsg(
    soils: &NamedLayer,
    records: &[SoilRecord],
    events: &mut EventLog,
) -> (NamedLayer, ApplyReport) {
    let by_symbol: HashMap<String, &SoilRecord> = records
        .iter()
        .map(|r| (r.musym.trim().to_uppercase(), r))
        .collect();
    let mut report = ApplyReport::default();

    let mut out = soils.clone();
    for feature in &mut out.features {
        if has_valid_group(feature.text(attributes::HSG).as_deref()) {
            report.kept += 1;
            continue;
        }
        let record = feature
            .text(attributes::MUSYM)
            .and_then(|s| by_symbol.get(&s.to_uppercase()).copied());
        let group = record.and_then(|r| HydrologicSoilGroup::parse(&r.hsg));
        match (record, group) {
            (Some(record), Some(group)) => {
                feature.set(attributes::HSG, group.as_str());
                if feature.text(attributes::MUNAME).is_none() && !record.muname.is_empty() {
                    feature.set(attributes::MUNAME, record.muname.as_str());
                }
                report.filled += 1;
            }
            _ => {
                feature.set(attributes::HSG, "");
                report.missing += 1;
            }
        }
    }

    events.info(
        Stage::Soils,
        format!(
            "{}: {} soil groups filled, {} kept",
            soils.name, report.filled, report.kept
        ),
    );
    if report.missing > 0 {
        events.warn(
            Stage::Soils,
            format!("{}: {} features without a soil group", soils.name, report.missing),
        );
    }
    (out, report)
}
