use std::path::PathBuf;

use serde::Serialize;
use trib_config::TribConfig;
use trib_core::EventLog;
use trib_hydro::{PipelineInputs, PipelineMode, PipelineOutput, PipelineSettings};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ComputeArgs;
use crate::commands::shared::{self, SoilFill, SubcatchmentRow};
use crate::layers;
use crate::output::output;
use crate::progress::Progress;

#[derive(Debug, Serialize)]
struct ComputeResponse {
    subcatchments: Vec<SubcatchmentRow>,
    written: Vec<PathBuf>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    soils: Vec<SoilFill>,
}

/// Load inputs, optionally fill soil groups, run the final pipeline and
/// write every derived layer. Shared by `compute` and `export`.
pub async fn run_final(
    args: &ComputeArgs,
    config: &TribConfig,
) -> anyhow::Result<(PipelineOutput, Vec<PathBuf>, Vec<SoilFill>)> {
    let cn_table = shared::load_cn_table(args.layers.cn_table.as_deref())?;
    let mut raw = layers::collect_raw_layers(&args.layers, config.model.max_discharge_points)?;
    let mut events = EventLog::with_capacity(config.general.log_capacity);
    let soils = if args.lookup_soils {
        shared::lookup_soils(&mut raw, config, &mut events).await?
    } else {
        Vec::new()
    };

    let progress = Progress::spinner("running overlay pipeline");
    let mut result = trib_hydro::run(
        &PipelineInputs {
            layers: &raw,
            cn_table: cn_table.as_ref(),
            mode: PipelineMode::Final,
            previous_preview: None,
        },
        &PipelineSettings::from(config),
    );
    // Soil events happened first; keep them ahead of the pipeline's.
    events.absorb(std::mem::take(&mut result.events));
    result.events = events;
    progress.set_message("writing derived layers");
    let written = layers::write_layers(&args.out_dir, &result.derived)?;
    if result.is_success() {
        progress.finish_clear();
    } else {
        progress.finish_err("pipeline finished with errors");
    }
    Ok((result, written, soils))
}

/// Handle `trib compute`.
pub async fn handle(args: &ComputeArgs, config: &TribConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let (result, written, soils) = run_final(args, config).await?;
    output(
        &ComputeResponse {
            subcatchments: result.subcatchments.iter().map(SubcatchmentRow::from).collect(),
            written,
            soils,
        },
        flags.format,
    )?;
    shared::fail_on_errors(&result)
}
