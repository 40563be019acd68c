use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Subcommand};
use trib_core::LayerRole;

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Run the full pipeline and write every derived layer.
    Compute(ComputeArgs),
    /// Preview soils x land cover within the overall boundary.
    Preview(PreviewArgs),
    /// Run the full pipeline and write a HydroCAD `.hcp` model.
    Export(ComputeArgs),
    /// Fill blank hydrologic soil groups from Soil Data Access.
    Soils(SoilsArgs),
    /// Curve number table utilities.
    Cn {
        #[command(subcommand)]
        action: CnCommands,
    },
}

/// A layer file with an explicit role, written `ROLE=PATH`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayerSpec {
    pub role: LayerRole,
    pub path: PathBuf,
}

impl FromStr for LayerSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (role, path) = s
            .split_once('=')
            .ok_or_else(|| format!("expected ROLE=PATH, got '{s}'"))?;
        let role = role.parse::<LayerRole>().map_err(|e| e.to_string())?;
        if path.trim().is_empty() {
            return Err(format!("missing path for role '{role}'"));
        }
        Ok(Self {
            role,
            path: PathBuf::from(path.trim()),
        })
    }
}

/// Input layers shared by the pipeline commands.
#[derive(Clone, Debug, Args)]
pub struct LayerArgs {
    /// GeoJSON layer files; roles are detected from file names
    /// (`da_to_dp_03`, `sub_da`, `landcover`, `soils`/`wss*`).
    pub inputs: Vec<PathBuf>,
    /// Layer with an explicit role, e.g. `--layer soils=survey.geojson`.
    #[arg(long = "layer", value_name = "ROLE=PATH")]
    pub explicit: Vec<LayerSpec>,
    /// Curve number table (JSON array of `{LandCover, A, B, C, D}`).
    #[arg(long)]
    pub cn_table: Option<PathBuf>,
}

/// Arguments for `trib compute` and `trib export`.
#[derive(Clone, Debug, Args)]
pub struct ComputeArgs {
    #[command(flatten)]
    pub layers: LayerArgs,
    /// Directory receiving derived layers and the model file.
    #[arg(long, default_value = "out")]
    pub out_dir: PathBuf,
    /// Look up blank soil groups before running (needs `soils.area_symbol`).
    #[arg(long)]
    pub lookup_soils: bool,
}

/// Arguments for `trib preview`.
#[derive(Clone, Debug, Args)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub layers: LayerArgs,
    #[arg(long, default_value = "out")]
    pub out_dir: PathBuf,
    /// Rewrite the preview even if its signature is unchanged.
    #[arg(long)]
    pub force: bool,
}

/// Arguments for `trib soils`.
#[derive(Clone, Debug, Args)]
pub struct SoilsArgs {
    /// Soils GeoJSON (Web Soil Survey export).
    pub input: PathBuf,
    /// Soil survey area symbol; overrides `soils.area_symbol`.
    #[arg(long)]
    pub area: Option<String>,
    /// Where to write the filled layer (defaults to overwriting the input).
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Clone, Debug, Subcommand)]
pub enum CnCommands {
    /// Validate a curve number table.
    Check { path: PathBuf },
    /// Print a curve number table.
    Show { path: PathBuf },
}
