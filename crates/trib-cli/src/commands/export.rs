use std::path::PathBuf;

use anyhow::Context;
use serde::Serialize;
use trib_config::TribConfig;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ComputeArgs;
use crate::commands::compute::run_final;
use crate::commands::shared;
use crate::output::output;

#[derive(Debug, Serialize)]
struct ExportResponse {
    model: PathBuf,
    subcatchments: usize,
    layers_written: usize,
}

/// Handle `trib export`.
///
/// Derived layers are written even when the model cannot be; the model is
/// only written from a run without errors.
pub async fn handle(args: &ComputeArgs, config: &TribConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let (mut result, written, _soils) = run_final(args, config).await?;
    shared::fail_on_errors(&result).context("model not written")?;

    let model = trib_export::write_model(
        &args.out_dir,
        &result.subcatchments,
        &shared::subarea_names(&result),
        &config.model,
        &mut result.events,
    )
    .context("model not written")?;

    output(
        &ExportResponse {
            model,
            subcatchments: result.subcatchments.len(),
            layers_written: written.len(),
        },
        flags.format,
    )
}
