use std::path::PathBuf;

use anyhow::Context;
use serde::Serialize;
use trib_config::TribConfig;
use trib_core::EventLog;
use trib_soils::SoilDataClient;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::SoilsArgs;
use crate::commands::shared::{self, SoilFill};
use crate::layers;
use crate::output::output;
use crate::progress::Progress;

#[derive(Debug, Serialize)]
struct SoilsResponse {
    written: PathBuf,
    #[serde(flatten)]
    fill: SoilFill,
}

/// Handle `trib soils`.
///
/// A failed lookup still writes the normalized layer and exits cleanly;
/// the failure is reported as a warning.
pub async fn handle(args: &SoilsArgs, config: &TribConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let area_symbol = match &args.area {
        Some(area) => area.trim().to_string(),
        None => config
            .soils_area_symbol()
            .context("pass --area or set soils.area_symbol")?
            .to_string(),
    };
    let layer = layers::read_layer(&args.input)?;

    let progress = Progress::spinner("querying Soil Data Access");
    let mut events = EventLog::with_capacity(config.general.log_capacity);
    let client = SoilDataClient::new(&config.soils);
    let (filled, fill) = shared::fill_soil_groups(std::slice::from_ref(&layer), &area_symbol, client, &mut events)
        .await
        .pop()
        .context("soil fill returned no layer")?;
    match &fill.warning {
        Some(warning) => progress.finish_err(warning),
        None => progress.finish_ok(&format!("{} soil groups filled", fill.report.filled)),
    }

    let written = args.output.clone().unwrap_or_else(|| args.input.clone());
    layers::write_layer(&written, &filled)?;
    output(&SoilsResponse { written, fill }, flags.format)
}
