pub mod cn;
pub mod compute;
pub mod export;
pub mod preview;
pub mod soils;

mod shared;

use trib_config::TribConfig;

use crate::cli::{Commands, GlobalFlags};

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(command: Commands, config: &TribConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Compute(args) => compute::handle(&args, config, flags).await,
        Commands::Preview(args) => preview::handle(&args, config, flags),
        Commands::Export(args) => export::handle(&args, config, flags).await,
        Commands::Soils(args) => soils::handle(&args, config, flags).await,
        Commands::Cn { action } => cn::handle(&action, flags),
    }
}
