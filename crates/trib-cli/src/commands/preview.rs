use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Serialize;
use trib_config::TribConfig;
use trib_core::NamedLayer;
use trib_core::layer::names;
use trib_hydro::{PipelineInputs, PipelineMode, PipelineSettings, Signature};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::PreviewArgs;
use crate::commands::shared;
use crate::layers;
use crate::output::output;

/// Signature of the last written preview, kept next to the layers.
const SIGNATURE_FILE: &str = ".preview-signature";

#[derive(Debug, Serialize)]
struct PreviewResponse {
    signature: Option<String>,
    changed: bool,
    features: usize,
    written: Vec<PathBuf>,
}

fn read_signature(dir: &Path) -> Option<Signature> {
    std::fs::read_to_string(dir.join(SIGNATURE_FILE))
        .ok()
        .and_then(|text| Signature::from_hex(&text))
}

fn clear_signature(dir: &Path) -> anyhow::Result<()> {
    let path = dir.join(SIGNATURE_FILE);
    match std::fs::remove_file(&path) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
            Err(e).with_context(|| format!("failed to remove {}", path.display()))
        }
        _ => Ok(()),
    }
}

/// Handle `trib preview`.
///
/// Layers are only rewritten when the preview signature differs from the
/// one recorded by the previous run. An absent overall boundary always
/// overwrites the previous one with an empty layer.
pub fn handle(args: &PreviewArgs, config: &TribConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let cn_table = shared::load_cn_table(args.layers.cn_table.as_deref())?;
    let raw = layers::collect_raw_layers(&args.layers, config.model.max_discharge_points)?;
    let previous = if args.force {
        None
    } else {
        read_signature(&args.out_dir)
    };

    let result = trib_hydro::run(
        &PipelineInputs {
            layers: &raw,
            cn_table: cn_table.as_ref(),
            mode: PipelineMode::Preview,
            previous_preview: previous,
        },
        &PipelineSettings::from(config),
    );

    let overall_absent = result
        .derived_layer(names::OVERALL)
        .is_none_or(NamedLayer::is_empty);
    let written = if result.preview_changed {
        let written = layers::write_layers(&args.out_dir, &result.derived)?;
        if let Some(signature) = result.preview_signature {
            let path = args.out_dir.join(SIGNATURE_FILE);
            std::fs::write(&path, signature.to_string())
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        written
    } else if overall_absent {
        // Replace any boundary left by an earlier run with the empty layer,
        // and forget that run's signature so restored inputs are rewritten.
        tracing::info!("overall boundary is absent; clearing the previous one");
        let written = layers::write_layers(&args.out_dir, &result.derived)?;
        clear_signature(&args.out_dir)?;
        written
    } else {
        tracing::info!("preview unchanged; nothing written");
        Vec::new()
    };

    output(
        &PreviewResponse {
            signature: result.preview_signature.map(|s| s.to_string()),
            changed: result.preview_changed,
            features: result
                .derived_layer(names::OVERLAY_PREVIEW)
                .map_or(0, NamedLayer::len),
            written,
        },
        flags.format,
    )?;
    shared::fail_on_errors(&result)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::cli::OutputFormat;
    use crate::cli::root_commands::LayerArgs;
    use crate::layers::read_layer;

    const CN_TABLE: &str = r#"[{"LandCover": "Lawn", "A": 39, "B": 61, "C": 74, "D": 80}]"#;

    fn square(properties: &str) -> String {
        format!(
            r#"{{"type": "FeatureCollection", "features": [{{"type": "Feature",
                "properties": {properties},
                "geometry": {{"type": "Polygon",
                    "coordinates": [[[0,0],[100,0],[100,100],[0,100],[0,0]]]}}}}]}}"#
        )
    }

    fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, text).expect("write fixture");
        path
    }

    fn flags() -> GlobalFlags {
        GlobalFlags {
            format: OutputFormat::Json,
            quiet: true,
            config: None,
        }
    }

    fn preview_args(input: &Path, out: &Path, with_boundary: bool) -> PreviewArgs {
        let mut inputs = vec![
            write(input, "soils.geojson", &square(r#"{"musym": "WsB", "hydgrp": "b"}"#)),
            write(input, "landcover.geojson", &square(r#"{"LandCover": "lawn"}"#)),
        ];
        if with_boundary {
            inputs.push(write(input, "da_to_dp_01.geojson", &square("{}")));
        }
        PreviewArgs {
            layers: LayerArgs {
                inputs,
                explicit: Vec::new(),
                cn_table: Some(write(input, "cn.json", CN_TABLE)),
            },
            out_dir: out.to_path_buf(),
            force: false,
        }
    }

    #[test]
    fn signature_file_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert_eq!(read_signature(dir.path()), None);
        std::fs::write(dir.path().join(SIGNATURE_FILE), "00000000000000ff\n").expect("write");
        assert_eq!(read_signature(dir.path()), Signature::from_hex("ff"));
    }

    #[test]
    fn unchanged_preview_is_not_rewritten() {
        let input = tempfile::tempdir().expect("tempdir");
        let out = tempfile::tempdir().expect("tempdir");
        let config = TribConfig::default();
        let preview = out.path().join("overlay_preview.geojson");

        let mut args = preview_args(input.path(), out.path(), true);
        handle(&args, &config, &flags()).expect("first preview");
        assert!(preview.exists());
        assert!(read_signature(out.path()).is_some());

        std::fs::remove_file(&preview).expect("remove preview");
        handle(&args, &config, &flags()).expect("second preview");
        assert!(!preview.exists());

        args.force = true;
        handle(&args, &config, &flags()).expect("forced preview");
        assert!(preview.exists());
    }

    #[test]
    fn absent_boundary_clears_the_previous_overall() {
        let input = tempfile::tempdir().expect("tempdir");
        let out = tempfile::tempdir().expect("tempdir");
        let config = TribConfig::default();
        let overall = out.path().join("overall.geojson");

        handle(&preview_args(input.path(), out.path(), true), &config, &flags())
            .expect("preview with boundary");
        assert_eq!(read_layer(&overall).expect("overall").len(), 1);

        let without = tempfile::tempdir().expect("tempdir");
        let err = handle(&preview_args(without.path(), out.path(), false), &config, &flags())
            .unwrap_err();
        assert!(err.to_string().contains("overall"), "{err}");
        assert_eq!(read_layer(&overall).expect("overall").len(), 0);
        assert_eq!(read_signature(out.path()), None);
    }
}
