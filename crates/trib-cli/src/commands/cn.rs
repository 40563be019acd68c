use serde::Serialize;
use trib_hydro::CnTable;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::CnCommands;
use crate::output::output;

#[derive(Debug, Serialize)]
struct CheckResponse {
    records: usize,
    /// Land covers missing a CN for at least one soil group.
    partial: Vec<String>,
}

fn check(table: &CnTable) -> CheckResponse {
    CheckResponse {
        records: table.len(),
        partial: table
            .records()
            .iter()
            .filter(|r| [r.a, r.b, r.c, r.d].iter().any(Option::is_none))
            .map(|r| r.land_cover.clone())
            .collect(),
    }
}

/// Handle `trib cn`.
pub fn handle(action: &CnCommands, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        CnCommands::Check { path } => output(&check(&CnTable::from_path(path)?), flags.format),
        CnCommands::Show { path } => output(CnTable::from_path(path)?.records(), flags.format),
    }
}
