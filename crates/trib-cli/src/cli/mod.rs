use clap::Parser;

pub mod global;
pub mod root_commands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `trib` binary.
#[derive(Debug, Parser)]
#[command(
    name = "trib",
    version,
    about = "tributary - drainage overlay and HydroCAD model generation"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, table, raw
    #[arg(short, long, global = true, default_value = "table")]
    pub format: OutputFormat,

    /// Quiet mode (errors only, no progress)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Extra TOML config file layered above the discovered ones
    #[arg(short, long, global = true)]
    pub config: Option<String>,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            quiet: self.quiet,
            config: self.config.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::{CommandFactory, Parser};
    use trib_core::LayerRole;

    use super::root_commands::CnCommands;
    use super::{Cli, Commands, OutputFormat};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_before_subcommand() {
        let cli = Cli::try_parse_from(["trib", "--format", "json", "--verbose", "cn", "show", "cn.json"])
            .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Cn { action: CnCommands::Show { .. } }));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["trib", "cn", "check", "cn.json", "--format", "raw", "--quiet"])
            .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Raw);
        assert!(cli.quiet);
    }

    #[test]
    fn output_format_rejects_invalid_value() {
        let parsed = Cli::try_parse_from(["trib", "--format", "xml", "cn", "show", "cn.json"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn compute_takes_inputs_and_explicit_layers() {
        let cli = Cli::try_parse_from([
            "trib",
            "compute",
            "da_to_dp_01.geojson",
            "--layer",
            "soils=wss.geojson",
            "--cn-table",
            "cn.json",
            "--out-dir",
            "build",
        ])
        .expect("cli should parse");

        let Commands::Compute(args) = cli.command else {
            panic!("expected compute");
        };
        assert_eq!(args.layers.inputs, vec![PathBuf::from("da_to_dp_01.geojson")]);
        assert_eq!(args.layers.explicit[0].role, LayerRole::Soils);
        assert_eq!(args.layers.explicit[0].path, PathBuf::from("wss.geojson"));
        assert_eq!(args.layers.cn_table, Some(PathBuf::from("cn.json")));
        assert_eq!(args.out_dir, PathBuf::from("build"));
        assert!(!args.lookup_soils);
    }

    #[test]
    fn layer_spec_requires_a_known_role() {
        let parsed = Cli::try_parse_from(["trib", "compute", "--layer", "roads=r.geojson"]);
        assert!(parsed.is_err());
        let parsed = Cli::try_parse_from(["trib", "compute", "--layer", "soils"]);
        assert!(parsed.is_err());
    }
}
