use std::path::Path;

use anyhow::Context;
use trib_config::TribConfig;

use crate::cli::GlobalFlags;

/// Load `.env`, then the layered configuration, then validate it.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<TribConfig> {
    load_dotenv()?;

    let config = match &flags.config {
        Some(path) => TribConfig::load_from(Path::new(path))
            .with_context(|| format!("failed to load config file {path}"))?,
        None => TribConfig::load().context("failed to load configuration")?,
    };
    config.validate()?;
    tracing::debug!(
        project = %config.model.project_name,
        soils_configured = config.soils.is_configured(),
        "configuration loaded"
    );
    Ok(config)
}

fn load_dotenv() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("failed to determine current directory")?;
    let env_path = cwd.join(".env");
    if env_path.exists() {
        dotenvy::from_path(&env_path)
            .with_context(|| format!("failed to load dotenv file at {}", env_path.display()))?;
    }
    Ok(())
}
