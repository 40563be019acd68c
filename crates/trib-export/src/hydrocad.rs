//! HydroCAD `.hcp` project text.
//!
//! Layout of the emitted document:
//!
//! ```text
//! [HydroCAD]          fixed header, RainEvent = first storm
//! [EVENT] x7          fixed SCS Type II 24-hr storm table
//! [NODE] Subcat       one per subcatchment, with [AREA] per CN bucket and [TC]
//! [NODE] Link         one per discharge point, in first-seen order
//! ```
//!
//! Key names and section order are consumed verbatim by HydroCAD; do not
//! reorder them.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use trib_config::ModelConfig;
use trib_core::naming;
use trib_core::{AreaGroup, EventLog, Stage, Subcatchment};

use crate::error::ExportError;

const HEADER: &[(&str, &str)] = &[
    ("FileUnits", "English"),
    ("CalcUnits", "English"),
    ("InputUnits", "English-LowFlow"),
    ("ReportUnits", "English-LowFlow"),
    ("LargeAreas", "False"),
    ("Source", "HydroCAD® 10.20-6a  s/n 07447  © 2024 HydroCAD Software Solutions LLC"),
];

const VIEW: &[(&str, &str)] = &[
    ("Path", ""),
    ("View", "-5.46349942062574 0 15.4634994206257 10"),
    ("GridShow", "True"),
    ("GridSnap", "True"),
    ("TimeSpan", "0 86400"),
    ("TimeInc", "36"),
    ("MaxGraph", "0"),
    ("RunoffMethod", "SCS TR-20"),
    ("ReachMethod", "Stor-Ind+Trans"),
    ("PondMethod", "Stor-Ind"),
    ("UH", "SCS"),
    ("MinTc", "300"),
];

const STORM_TYPE: &str = "Type II 24-hr";

/// Return period and storm depth in feet.
pub const RAIN_EVENTS: [(&str, &str); 7] = [
    ("1-Year", "0.225"),
    ("2-Year", "0.275"),
    ("5-Year", "0.35"),
    ("10-Year", "0.416666666666667"),
    ("25-Year", "0.516666666666667"),
    ("50-Year", "0.591666666666667"),
    ("100-Year", "0.683333333333333"),
];

/// Time of concentration written for every subcatchment, in seconds.
const TC_SECONDS: u32 = 300;

/// Vertical spacing between nodes in the schematic.
const ROW_SPACING: usize = 5;
const LINK_COLUMN: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelOptions {
    pub project_name: String,
    /// Cycle length of the fallback outflow assignment.
    pub max_discharge_points: u32,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self::from(&ModelConfig::default())
    }
}

impl From<&ModelConfig> for ModelOptions {
    fn from(config: &ModelConfig) -> Self {
        Self {
            project_name: config.project_name.clone(),
            max_discharge_points: config.max_discharge_points,
        }
    }
}

/// Discharge points in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DischargePointGraph {
    points: Vec<String>,
}

impl DischargePointGraph {
    /// Row of `name`, registering it on first sight.
    pub fn row(&mut self, name: &str) -> usize {
        if let Some(row) = self.points.iter().position(|p| p == name) {
            return row;
        }
        self.points.push(name.to_string());
        self.points.len() - 1
    }

    #[must_use]
    pub fn points(&self) -> &[String] {
        &self.points
    }
}

/// Outflow discharge point for a subcatchment.
///
/// The parent label is split on commas; a `DP-NN` token wins, otherwise the
/// first token. Without any token the outflow cycles through
/// `DP-01..=DP-<max>` by position.
// NOTE: the positional fallback has not been checked against real drainage
// layouts; it only guarantees every node has an outflow.
#[must_use]
pub fn outflow_for(parent: Option<&str>, index: usize, max_discharge_points: u32) -> String {
    let tokens: Vec<&str> = parent
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();
    tokens
        .iter()
        .find(|t| naming::is_discharge_point_name(t))
        .or_else(|| tokens.first())
        .map_or_else(
            || fallback_discharge_point(index, max_discharge_points),
            |t| (*t).to_string(),
        )
}

fn fallback_discharge_point(index: usize, max_discharge_points: u32) -> String {
    let max = usize::try_from(max_discharge_points.max(1)).unwrap_or(usize::MAX);
    let slot = u32::try_from(index % max).unwrap_or_default();
    naming::format_discharge_point(slot + 1)
}

/// Upper-cased name with `DRAINAGE AREA` shortened to `DA` and every run of
/// other characters turned into one hyphen.
#[must_use]
pub fn node_label(name: &str) -> String {
    let upper = name.to_uppercase().replace("DRAINAGE AREA", "DA");
    let mut out = String::with_capacity(upper.len());
    let mut gap = false;
    for c in upper.chars() {
        if c.is_ascii_alphanumeric() {
            if gap && !out.is_empty() {
                out.push('-');
            }
            gap = false;
            out.push(c);
        } else {
            gap = true;
        }
    }
    out
}

#[derive(Debug, Clone)]
struct SubcatNode<'a> {
    number: String,
    name: &'a str,
    outflow: String,
    areas: &'a [AreaGroup],
}

/// A validated model ready to be written.
#[derive(Debug, Clone)]
pub struct HydroCadModel<'a> {
    project_name: &'a str,
    nodes: Vec<SubcatNode<'a>>,
    graph: DischargePointGraph,
}

impl<'a> HydroCadModel<'a> {
    /// Build the node graph for `subcatchments`.
    ///
    /// `source_subareas` are the subarea names the model must account for;
    /// each must map (case-insensitively) to a subcatchment with at least one
    /// CN bucket.
    ///
    /// # Errors
    ///
    /// - [`ExportError::Empty`] when there are no subcatchments.
    /// - [`ExportError::IncompleteSubcatchments`] naming every subarea that
    ///   is missing or has no CN bucket.
    pub fn build(
        subcatchments: &'a [Subcatchment],
        source_subareas: &[String],
        options: &'a ModelOptions,
    ) -> Result<Self, ExportError> {
        let incomplete = incomplete_names(subcatchments, source_subareas);
        if !incomplete.is_empty() {
            return Err(ExportError::IncompleteSubcatchments { names: incomplete });
        }
        if subcatchments.is_empty() {
            return Err(ExportError::Empty);
        }

        let mut graph = DischargePointGraph::default();
        let mut taken = HashSet::new();
        let nodes = subcatchments
            .iter()
            .enumerate()
            .map(|(i, sub)| {
                let outflow = outflow_for(
                    sub.parent_discharge_point.as_deref(),
                    i,
                    options.max_discharge_points,
                );
                graph.row(&outflow);

                let label = node_label(&sub.name);
                let label = if label.is_empty() {
                    format!("SUB-{}", i + 1)
                } else {
                    label
                };
                let base = format!("{label} TO {outflow}");
                let mut number = base.clone();
                let mut n = 1;
                while !taken.insert(number.clone()) {
                    n += 1;
                    number = format!("{base} ({n})");
                }

                SubcatNode {
                    number,
                    name: &sub.name,
                    outflow,
                    areas: &sub.areas,
                }
            })
            .collect();

        Ok(Self {
            project_name: &options.project_name,
            nodes,
            graph,
        })
    }

    #[must_use]
    pub const fn discharge_points(&self) -> &DischargePointGraph {
        &self.graph
    }

    /// Node numbers in emission order.
    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.number.as_str())
    }
}

fn incomplete_names(subcatchments: &[Subcatchment], source_subareas: &[String]) -> Vec<String> {
    let mut names: Vec<String> = subcatchments
        .iter()
        .filter(|s| !s.is_complete())
        .map(|s| s.name.clone())
        .collect();

    let known: HashSet<String> = subcatchments.iter().map(|s| s.name.to_lowercase()).collect();
    let mut seen = HashSet::new();
    for name in source_subareas {
        let key = name.trim().to_lowercase();
        if key.is_empty() || !seen.insert(key.clone()) {
            continue;
        }
        if !known.contains(&key) {
            names.push(name.trim().to_string());
        }
    }
    names
}

fn key_value(f: &mut fmt::Formatter<'_>, key: &str, value: impl fmt::Display) -> fmt::Result {
    writeln!(f, "{key}={value}")
}

impl fmt::Display for HydroCadModel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let first_event = RAIN_EVENTS[0].0;

        writeln!(f, "[HydroCAD]")?;
        for (key, value) in HEADER {
            key_value(f, key, value)?;
        }
        key_value(f, "Name", self.project_name)?;
        for (key, value) in VIEW {
            key_value(f, key, value)?;
        }
        key_value(f, "RainEvent", first_event)?;

        for (event, depth) in RAIN_EVENTS {
            writeln!(f)?;
            writeln!(f, "[EVENT]")?;
            key_value(f, "RainEvent", event)?;
            key_value(f, "StormType", STORM_TYPE)?;
            key_value(f, "StormDepth", depth)?;
        }

        for (i, node) in self.nodes.iter().enumerate() {
            writeln!(f)?;
            writeln!(f, "[NODE]")?;
            key_value(f, "Number", &node.number)?;
            key_value(f, "Type", "Subcat")?;
            key_value(f, "Name", node.name)?;
            key_value(f, "XYPos", format_args!("0 {}", i * ROW_SPACING))?;
            key_value(f, "Outflow", &node.outflow)?;
            for area in node.areas {
                writeln!(f, "[AREA]")?;
                key_value(f, "Area", area.area_sq_ft)?;
                key_value(f, "CN", area.cn)?;
                if let Some(desc) = &area.description {
                    key_value(f, "Desc", desc)?;
                }
            }
            writeln!(f, "[TC]")?;
            key_value(f, "Method", "Direct")?;
            key_value(f, "Tc", TC_SECONDS)?;
        }

        for (row, point) in self.graph.points().iter().enumerate() {
            writeln!(f)?;
            writeln!(f, "[NODE]")?;
            key_value(f, "Number", point)?;
            key_value(f, "Type", "Link")?;
            key_value(f, "Name", point)?;
            key_value(f, "XYPos", format_args!("{LINK_COLUMN} {}", row * ROW_SPACING))?;
        }
        Ok(())
    }
}

/// Render the full `.hcp` document.
///
/// # Errors
///
/// See [`HydroCadModel::build`].
pub fn render(
    subcatchments: &[Subcatchment],
    source_subareas: &[String],
    options: &ModelOptions,
) -> Result<String, ExportError> {
    let model = HydroCadModel::build(subcatchments, source_subareas, options)?;
    tracing::info!(
        subcatchments = model.nodes.len(),
        discharge_points = model.graph.points().len(),
        "rendered HydroCAD model"
    );
    Ok(model.to_string())
}

/// `<project>_<version>.hcp`, with path separators replaced.
#[must_use]
pub fn export_file_name(project_name: &str, project_version: &str) -> String {
    let project = if project_name.trim().is_empty() {
        "project"
    } else {
        project_name.trim()
    };
    format!("{project}_{}.hcp", project_version.trim()).replace(['/', '\\'], "_")
}

/// Render and write the model into `dir`, returning the written path.
///
/// Nothing is written when rendering fails. The outcome is recorded in
/// `events` either way.
///
/// # Errors
///
/// Returns the errors of [`render`], or [`ExportError::Io`].
pub fn write_model(
    dir: &Path,
    subcatchments: &[Subcatchment],
    source_subareas: &[String],
    config: &ModelConfig,
    events: &mut EventLog,
) -> Result<PathBuf, ExportError> {
    let options = ModelOptions::from(config);
    let written = render(subcatchments, source_subareas, &options).and_then(|text| {
        let path = dir.join(export_file_name(&config.project_name, &config.project_version));
        std::fs::write(&path, text)?;
        Ok(path)
    });
    match &written {
        Ok(path) => events.info(
            Stage::Export,
            format!("wrote {} subcatchments to {}", subcatchments.len(), path.display()),
        ),
        Err(err) => events.error(Stage::Export, format!("model not written: {err}")),
    }
    written
}
