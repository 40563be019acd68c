use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use trib_config::TribConfig;
use trib_core::schema::{NormalizeOptions, normalize_layer};
use trib_core::{EventLog, LayerRole, NamedLayer, Stage, Subcatchment};
use trib_hydro::{CnTable, PipelineOutput, RawLayer};
use trib_soils::apply::{ApplyReport, apply_hsg, symbols_needing_lookup};
use trib_soils::scheduler::{LookupScheduler, RequestStatus};
use trib_soils::{HsgSource, SoilDataClient};

use crate::progress::Progress;

pub fn load_cn_table(path: Option<&Path>) -> anyhow::Result<Option<CnTable>> {
    let Some(path) = path else {
        tracing::warn!("no --cn-table given; curve numbers will not resolve");
        return Ok(None);
    };
    let table = CnTable::from_path(path)
        .with_context(|| format!("failed to load curve number table {}", path.display()))?;
    tracing::debug!(records = table.len(), "loaded curve number table");
    Ok(Some(table))
}

/// Result of filling one soils layer.
#[derive(Debug, Serialize)]
pub struct SoilFill {
    #[serde(flatten)]
    pub report: ApplyReport,
    /// Why the lookup did not contribute, if it did not.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Normalize each layer as soils and fill blank groups from `source`.
///
/// The symbols of every layer go out as one request, so a symbol set is
/// looked up once per call however many layers share it. Lookup failures
/// never fail the fill: each layer gets the warning and keeps blank groups
/// for the completeness check to report.
pub async fn fill_soil_groups<S: HsgSource>(
    layers: &[NamedLayer],
    area_symbol: &str,
    source: S,
    events: &mut EventLog,
) -> Vec<(NamedLayer, SoilFill)> {
    let soils: Vec<NamedLayer> = layers
        .iter()
        .map(|layer| normalize_layer(layer, LayerRole::Soils, &NormalizeOptions::default()))
        .collect();
    let symbols: Vec<String> = soils.iter().flat_map(symbols_needing_lookup).collect();

    let mut scheduler = LookupScheduler::new(source);
    let records = match scheduler.request(area_symbol, &symbols) {
        RequestStatus::Started { .. } => match scheduler.finish().await {
            Some(outcome) if !scheduler.is_current(outcome.generation) => {
                tracing::debug!(generation = outcome.generation, "discarding stale soil lookup");
                Err("soil lookup was superseded".to_string())
            }
            Some(outcome) => outcome.result.map_err(|e| e.to_string()),
            None => Ok(Vec::new()),
        },
        RequestStatus::AlreadyRequested | RequestStatus::Nothing => Ok(Vec::new()),
    };

    let (records, warning) = match records {
        Ok(records) => (records, None),
        Err(message) => {
            events.warn(
                Stage::Soils,
                format!("soil lookup failed; soil groups left blank: {message}"),
            );
            (Vec::new(), Some(format!("soil lookup failed: {message}")))
        }
    };
    soils
        .iter()
        .map(|layer| {
            let (filled, report) = apply_hsg(layer, &records, events);
            (
                filled,
                SoilFill {
                    report,
                    warning: warning.clone(),
                },
            )
        })
        .collect()
}

/// Fill every soils input through Soil Data Access with one client.
pub async fn lookup_soils(
    raw: &mut [RawLayer],
    config: &TribConfig,
    events: &mut EventLog,
) -> anyhow::Result<Vec<SoilFill>> {
    let area_symbol = config
        .soils_area_symbol()
        .context("--lookup-soils needs soils.area_symbol (or TRIB_SOILS__AREA_SYMBOL)")?
        .to_string();

    let mut inputs: Vec<&mut RawLayer> = raw.iter_mut().filter(|r| r.role == LayerRole::Soils).collect();
    if inputs.is_empty() {
        return Ok(Vec::new());
    }
    let layers: Vec<NamedLayer> = inputs.iter().map(|input| input.layer.clone()).collect();

    let progress = Progress::spinner(&format!("looking up soil groups for {} layer(s)", layers.len()));
    let client = SoilDataClient::new(&config.soils);
    let filled = fill_soil_groups(&layers, &area_symbol, client, events).await;
    match filled.iter().find_map(|(_, fill)| fill.warning.as_deref()) {
        Some(warning) => progress.finish_err(warning),
        None => progress.finish_clear(),
    }

    let mut fills = Vec::with_capacity(filled.len());
    for (input, (layer, fill)) in inputs.iter_mut().zip(filled) {
        input.layer = NamedLayer::raw(input.layer.name.clone(), layer.features);
        fills.push(fill);
    }
    Ok(fills)
}

/// Names of every subarea the model must account for.
#[must_use]
pub fn subarea_names(output: &PipelineOutput) -> Vec<String> {
    output
        .derived_layer(trib_core::layer::names::COMPUTED_SUBAREAS)
        .map(|layer| {
            layer
                .features
                .iter()
                .filter_map(|f| f.text(trib_core::attributes::SUBAREA_NAME))
                .collect()
        })
        .unwrap_or_default()
}

/// One output row per subcatchment.
#[derive(Debug, Serialize)]
pub struct SubcatchmentRow {
    pub id: String,
    pub name: String,
    pub parent: String,
    pub groups: usize,
    pub area_ac: f64,
}

impl From<&Subcatchment> for SubcatchmentRow {
    fn from(sub: &Subcatchment) -> Self {
        let acres = trib_core::Area::from_sq_ft(sub.total_area_sq_ft()).acres();
        Self {
            id: sub.id.clone(),
            name: sub.name.clone(),
            parent: sub.parent_discharge_point.clone().unwrap_or_default(),
            groups: sub.areas.len(),
            area_ac: (acres * 1000.0).round() / 1000.0,
        }
    }
}

/// Turn pipeline errors into one command failure, one line per error.
pub fn fail_on_errors(output: &PipelineOutput) -> anyhow::Result<()> {
    if output.is_success() {
        return Ok(());
    }
    let messages = output
        .errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>();
    anyhow::bail!("{}", messages.join("\n"))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use geo::polygon;
    use pretty_assertions::assert_eq;
    use trib_core::attributes::{self, Properties};
    use trib_core::{AreaGroup, PolygonFeature};
    use trib_soils::{SoilError, SoilRecord};

    use super::*;

    /// Answers every symbol with group D and counts the requests it sees.
    #[derive(Default)]
    struct Fixed {
        calls: Arc<AtomicUsize>,
    }

    impl HsgSource for Fixed {
        async fn lookup(
            &self,
            _area_symbol: &str,
            symbols: &[String],
        ) -> Result<Vec<SoilRecord>, SoilError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(symbols
                .iter()
                .map(|s| SoilRecord {
                    musym: s.clone(),
                    muname: "Loam".to_string(),
                    hsg: "D".to_string(),
                })
                .collect())
        }
    }

    struct Down;

    impl HsgSource for Down {
        async fn lookup(
            &self,
            _area_symbol: &str,
            _symbols: &[String],
        ) -> Result<Vec<SoilRecord>, SoilError> {
            Err(SoilError::RateLimited {
                retry_after_secs: 60,
            })
        }
    }

    fn raw_soils(name: &str, musym: &str) -> NamedLayer {
        let mut props = Properties::new();
        props.insert("musym".to_string(), musym.into());
        props.insert("hydgrp".to_string(), "".into());
        NamedLayer::raw(
            name,
            vec![PolygonFeature::from_polygon(
                polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0)],
                props,
            )],
        )
    }

    #[tokio::test]
    async fn raw_soil_attributes_are_filled() {
        let mut events = EventLog::default();
        let filled =
            fill_soil_groups(&[raw_soils("wss", "wsb")], "NY103", Fixed::default(), &mut events)
                .await;
        let (layer, fill) = &filled[0];
        assert_eq!(layer.features[0].text(attributes::HSG).as_deref(), Some("D"));
        assert_eq!(layer.features[0].text(attributes::MUSYM).as_deref(), Some("WSB"));
        assert_eq!(fill.report.filled, 1);
        assert!(fill.warning.is_none());
        assert!(events.iter().all(|e| e.stage == Stage::Soils));
    }

    #[tokio::test]
    async fn layers_sharing_symbols_are_looked_up_once() {
        let source = Fixed::default();
        let calls = Arc::clone(&source.calls);
        let layers = [raw_soils("wss north", "WsB"), raw_soils("wss south", "WSB")];

        let filled = fill_soil_groups(&layers, "NY103", source, &mut EventLog::default()).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(filled.len(), 2);
        for (layer, fill) in &filled {
            assert_eq!(layer.features[0].text(attributes::HSG).as_deref(), Some("D"));
            assert_eq!(fill.report.filled, 1);
        }
    }

    #[tokio::test]
    async fn failed_lookup_is_a_warning() {
        let mut events = EventLog::default();
        let filled = fill_soil_groups(&[raw_soils("wss", "wsb")], "NY103", Down, &mut events).await;
        let (layer, fill) = &filled[0];
        assert_eq!(layer.features[0].text(attributes::HSG), None);
        assert_eq!(fill.report.missing, 1);
        assert!(fill.warning.as_deref().expect("warning").contains("rate limited"));
        assert!(!events.has_errors());
        assert!(events.iter().any(|e| e.message.contains("rate limited")));
    }

    #[test]
    fn rows_report_acres() {
        let sub = Subcatchment {
            id: "DP-01_Lot".to_string(),
            name: "Lot".to_string(),
            parent_discharge_point: Some("DP-01".to_string()),
            areas: vec![AreaGroup {
                cn: 98.0,
                description: None,
                area_sq_ft: 43_560.0,
            }],
        };
        let row = SubcatchmentRow::from(&sub);
        assert_eq!(row.area_ac, 1.0);
        assert_eq!(row.parent, "DP-01");
    }

    #[test]
    fn errors_become_one_failure() {
        let output = PipelineOutput {
            errors: vec![
                trib_hydro::HydroError::EmptyCnTable,
                trib_hydro::HydroError::UnresolvedCurveNumbers {
                    names: vec!["Lot 1".to_string()],
                },
            ],
            ..PipelineOutput::default()
        };
        let err = fail_on_errors(&output).unwrap_err();
        assert_eq!(
            err.to_string(),
            "curve number table is empty\nsubcatchments without curve numbers: Lot 1"
        );
    }
}
