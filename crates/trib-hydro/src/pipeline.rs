//! The explicit model pipeline.
//!
//! [`run`] takes a snapshot of the raw layers plus the CN table and returns
//! every derived layer, the aggregated subcatchments and the event log. It
//! never re-triggers itself and never mutates its inputs. A stage that
//! cannot run records its error and stops the stages after it; layers
//! derived before the failure are still returned.

use trib_config::TribConfig;
use trib_core::layer::names;
use trib_core::schema::{NormalizeOptions, normalize_layer};
use trib_core::{EventLog, LayerRole, NamedLayer, PolygonFeature, Stage, Subcatchment};
use trib_overlay::overall::{build_overall, overall_layer};
use trib_overlay::overlay::{final_overlay, preview_overlay};
use trib_overlay::subarea::process_subareas;
use trib_overlay::{
    CurveNumbers, OverlayError, OverlayReport, OverlaySettings, SubareaReport, ValidationInputs,
    ValidationMode, check_completeness,
};

use crate::aggregate::{DEFAULT_ID_MAX_LEN, aggregate};
use crate::cn::CnTable;
use crate::error::HydroError;
use crate::signature::{PreviewMemo, Signature, signature_of};

/// Which path the pipeline takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineMode {
    /// soils x land cover within the overall boundary; no subcatchments.
    Preview,
    /// subareas, complements, final overlay and subcatchments.
    Final,
}

/// One raw input layer and the role it plays.
#[derive(Debug, Clone)]
pub struct RawLayer {
    pub role: LayerRole,
    /// Discharge point implied by the source (e.g. its file name).
    pub implied_discharge_point: Option<String>,
    pub layer: NamedLayer,
}

impl RawLayer {
    #[must_use]
    pub const fn new(role: LayerRole, layer: NamedLayer) -> Self {
        Self {
            role,
            implied_discharge_point: None,
            layer,
        }
    }

    #[must_use]
    pub fn with_discharge_point(mut self, discharge_point: impl Into<String>) -> Self {
        self.implied_discharge_point = Some(discharge_point.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    pub overlay: OverlaySettings,
    pub max_discharge_points: u32,
    pub id_max_len: usize,
    pub log_capacity: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            overlay: OverlaySettings::default(),
            max_discharge_points: 20,
            id_max_len: DEFAULT_ID_MAX_LEN,
            log_capacity: trib_core::events::DEFAULT_CAPACITY,
        }
    }
}

impl From<&TribConfig> for PipelineSettings {
    fn from(config: &TribConfig) -> Self {
        Self {
            overlay: OverlaySettings::from(&config.geometry),
            max_discharge_points: config.model.max_discharge_points,
            id_max_len: config.model.id_max_len,
            log_capacity: config.general.log_capacity,
        }
    }
}

/// Everything a pipeline run needs.
#[derive(Debug, Clone, Copy)]
pub struct PipelineInputs<'a> {
    pub layers: &'a [RawLayer],
    pub cn_table: Option<&'a CnTable>,
    pub mode: PipelineMode,
    /// Signature of the preview emitted last time, if any.
    pub previous_preview: Option<Signature>,
}

#[derive(Debug, Default)]
pub struct PipelineOutput {
    /// Normalized raw layers, one per role present, under their well-known names.
    pub normalized: Vec<NamedLayer>,
    /// Derived layers in stage order. An absent overall boundary yields an
    /// empty `Overall` layer so callers drop any stale one.
    pub derived: Vec<NamedLayer>,
    pub subcatchments: Vec<Subcatchment>,
    pub subarea_report: Option<SubareaReport>,
    pub overlay_report: Option<OverlayReport>,
    pub preview_signature: Option<Signature>,
    /// `false` when the preview equals the previously emitted one.
    pub preview_changed: bool,
    pub events: EventLog,
    pub errors: Vec<HydroError>,
}

impl PipelineOutput {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn derived_layer(&self, name: &str) -> Option<&NamedLayer> {
        self.derived.iter().find(|l| l.name == name)
    }

    #[must_use]
    pub fn normalized_layer(&self, role: LayerRole) -> Option<&NamedLayer> {
        self.normalized.iter().find(|l| l.name == role.layer_name())
    }
}

/// Lookup used when no CN table was supplied: nothing resolves.
struct NoCurveNumbers;

impl CurveNumbers for NoCurveNumbers {
    fn curve_number(&self, _land_cover: &str, _hsg: &str) -> Option<f64> {
        None
    }
}

/// Run the pipeline once over a layer snapshot.
#[must_use]
pub fn run(inputs: &PipelineInputs<'_>, settings: &PipelineSettings) -> PipelineOutput {
    let mut out = PipelineOutput {
        events: EventLog::with_capacity(settings.log_capacity),
        ..PipelineOutput::default()
    };

    out.normalized = ingest(inputs, settings, &mut out.events);
    let layer = |role: LayerRole| {
        out.normalized
            .iter()
            .find(|l| l.name == role.layer_name())
            .cloned()
    };
    let boundaries = layer(LayerRole::DrainageBoundaries);
    let subareas = layer(LayerRole::Subareas)
        .unwrap_or_else(|| NamedLayer::raw(names::DRAINAGE_SUBAREAS, Vec::new()));
    let soils = layer(LayerRole::Soils);
    let land_cover = layer(LayerRole::LandCover);

    let overall = boundaries
        .as_ref()
        .and_then(|b| build_overall(b, settings.overlay.area_tolerance));
    match &overall {
        Some(feature) => out.events.info(
            Stage::Overall,
            format!(
                "overall boundary: {:.3} ac",
                feature.number(trib_core::attributes::AREA_AC).unwrap_or_default()
            ),
        ),
        None => out.events.warn(Stage::Overall, "overall boundary is absent"),
    }
    out.derived.push(overall_layer(overall.as_ref()));

    let mode = match inputs.mode {
        PipelineMode::Preview => ValidationMode::Preview,
        PipelineMode::Final => ValidationMode::Final,
    };
    let report = check_completeness(
        &ValidationInputs {
            boundaries: boundaries.as_ref(),
            subareas: Some(&subareas),
            soils: soils.as_ref(),
            land_cover: land_cover.as_ref(),
            overall: overall.as_ref(),
        },
        mode,
    );
    for issue in &report.issues {
        out.events.error(Stage::Validate, issue.to_string());
    }
    if let Err(err) = report.into_result() {
        out.errors.push(err.into());
        return out;
    }

    let (Some(overall), Some(soils), Some(land_cover)) = (overall, soils, land_cover) else {
        out.errors.push(OverlayError::NoOverallBoundary.into());
        return out;
    };

    let lookup = inputs.cn_table.map(CnTable::lookup);
    let curve_numbers: &dyn CurveNumbers = match &lookup {
        Some(lookup) => lookup,
        None => &NoCurveNumbers,
    };
    if lookup.is_none() {
        out.events.error(Stage::CurveNumbers, "no curve number table loaded");
    }

    match inputs.mode {
        PipelineMode::Preview => {
            let preview = preview_overlay(
                &soils,
                &land_cover,
                &overall,
                curve_numbers,
                &settings.overlay,
            );
            log_overlay(&mut out.events, &preview.report);
            let signature = signature_of(&[&preview.layer]);
            out.preview_changed = PreviewMemo::new(inputs.previous_preview).should_emit(signature);
            if !out.preview_changed {
                out.events.info(Stage::Overlay, "preview unchanged");
            }
            out.preview_signature = Some(signature);
            out.overlay_report = Some(preview.report);
            out.derived.push(preview.layer);
            if lookup.is_none() {
                out.errors.push(HydroError::EmptyCnTable);
            }
        }
        PipelineMode::Final => {
            run_final(
                &mut out,
                &FinalLayers {
                    boundaries: boundaries.as_ref(),
                    subareas: &subareas,
                    soils: &soils,
                    land_cover: &land_cover,
                    overall: &overall,
                },
                curve_numbers,
                lookup.is_some(),
                settings,
            );
        }
    }

    out
}

struct FinalLayers<'a> {
    boundaries: Option<&'a NamedLayer>,
    subareas: &'a NamedLayer,
    soils: &'a NamedLayer,
    land_cover: &'a NamedLayer,
    overall: &'a PolygonFeature,
}

fn run_final(
    out: &mut PipelineOutput,
    layers: &FinalLayers<'_>,
    curve_numbers: &dyn CurveNumbers,
    has_table: bool,
    settings: &PipelineSettings,
) {
    let empty = NamedLayer::raw(names::DRAINAGE_AREAS, Vec::new());
    let subareas = process_subareas(
        layers.boundaries.unwrap_or(&empty),
        layers.subareas,
        layers.overall,
        &settings.overlay,
    );
    let r = subareas.report;
    out.events.info(
        Stage::Subareas,
        format!(
            "{} subarea features, {} complements generated",
            subareas.layer.len(),
            r.complements_generated
        ),
    );
    if r.subareas_skipped > 0 {
        out.events.warn(
            Stage::Subareas,
            format!("{} subareas trimmed away or outside their parent", r.subareas_skipped),
        );
    }
    if r.parents_skipped > 0 {
        out.events.warn(
            Stage::Subareas,
            format!("{} drainage areas lie outside the overall boundary", r.parents_skipped),
        );
    }
    out.subarea_report = Some(r);

    let overlay = final_overlay(
        &subareas.layer,
        layers.soils,
        layers.land_cover,
        layers.overall,
        curve_numbers,
        &settings.overlay,
    );
    log_overlay(&mut out.events, &overlay.report);
    out.overlay_report = Some(overlay.report);

    if !has_table {
        out.derived.push(subareas.layer);
        out.derived.push(overlay.layer);
        out.errors.push(HydroError::EmptyCnTable);
        return;
    }

    let aggregated = aggregate(&overlay.layer, &subareas.layer, settings.id_max_len);
    out.derived.push(subareas.layer);
    out.derived.push(overlay.layer);
    out.events.info(
        Stage::Aggregate,
        format!("{} subcatchments", aggregated.subcatchments.len()),
    );
    for name in &aggregated.incomplete {
        out.events.error(Stage::Aggregate, format!("subcatchment '{name}' has no curve numbers"));
    }
    if !aggregated.is_complete() {
        out.errors.push(HydroError::UnresolvedCurveNumbers {
            names: aggregated.incomplete.clone(),
        });
    }
    out.subcatchments = aggregated.subcatchments;
}

fn log_overlay(events: &mut EventLog, report: &OverlayReport) {
    events.info(
        Stage::Overlay,
        format!(
            "{} overlay polygons from {} candidate pairs",
            report.features, report.candidates_tested
        ),
    );
    if report.unresolved_cn > 0 {
        events.warn(
            Stage::CurveNumbers,
            format!("{} overlay polygons have no curve number", report.unresolved_cn),
        );
    }
}

/// Normalize every raw layer and merge layers sharing a role.
fn ingest(inputs: &PipelineInputs<'_>, settings: &PipelineSettings, events: &mut EventLog) -> Vec<NamedLayer> {
    let land_cover_names = inputs
        .cn_table
        .map(CnTable::land_covers)
        .unwrap_or_default();

    let mut merged: Vec<NamedLayer> = Vec::new();
    for raw in inputs.layers {
        let opts = NormalizeOptions {
            max_discharge_points: settings.max_discharge_points,
            land_cover_names: &land_cover_names,
            implied_discharge_point: raw.implied_discharge_point.as_deref(),
        };
        let normalized = normalize_layer(&raw.layer, raw.role, &opts);
        events.info(
            Stage::Ingest,
            format!(
                "{}: {} features as {}",
                raw.layer.name,
                normalized.len(),
                raw.role.layer_name()
            ),
        );

        let name = raw.role.layer_name();
        match merged.iter_mut().find(|l| l.name == name) {
            Some(existing) => existing.features.extend(normalized.features),
            None => merged.push(NamedLayer::raw(name, normalized.features)),
        }
    }
    merged
}
