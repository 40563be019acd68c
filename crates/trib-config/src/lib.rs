//! # trib-config
//!
//! Layered configuration loading for tributary using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`TRIB_*` prefix, `__` as separator)
//! 2. Project-level `.tributary/config.toml`
//! 3. User-level `~/.config/tributary/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `TRIB_GEOMETRY__AREA_TOLERANCE_SQ_M` -> `geometry.area_tolerance_sq_m`,
//! `TRIB_SOILS__AREA_SYMBOL` -> `soils.area_symbol`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use trib_config::TribConfig;
//!
//! let config = TribConfig::load_with_dotenv().expect("config");
//! config.validate().expect("valid config");
//! println!("tolerance: {} m²", config.geometry.area_tolerance_sq_m);
//! ```

mod error;
mod general;
mod geometry;
mod model;
mod soils;

pub use error::ConfigError;
pub use general::GeneralConfig;
pub use geometry::GeometryConfig;
pub use model::ModelConfig;
pub use soils::SoilsConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Shortest id length that still leaves room for collision suffixes.
const MIN_ID_LEN: usize = 8;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TribConfig {
    #[serde(default)]
    pub geometry: GeometryConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub soils: SoilsConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl TribConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] if you need
    /// `.env` file loading.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] if a source cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load configuration with `.env` file support from the current directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] if a source cannot be parsed.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Load with an explicit TOML file layered above the discovered ones.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] if a source cannot be parsed.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Self::figment()
            .merge(Toml::file(path))
            .merge(Env::prefixed("TRIB_").split("__"))
            .extract()
            .map_err(ConfigError::from)
    }

    /// Build the figment provider chain.
    ///
    /// This is public so tests can inspect the figment directly or add
    /// additional providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(".tributary/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("TRIB_").split("__"))
    }

    /// Reject values the pipeline cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &str, reason: &str| ConfigError::InvalidValue {
            field: field.to_string(),
            reason: reason.to_string(),
        };

        let tolerance = self.geometry.area_tolerance_sq_m;
        if !tolerance.is_finite() || tolerance <= 0.0 {
            return Err(invalid("geometry.area_tolerance_sq_m", "must be a positive number"));
        }
        let threshold = self.geometry.min_complement_sq_ft;
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(invalid("geometry.min_complement_sq_ft", "must be zero or positive"));
        }
        if self.model.max_discharge_points == 0 {
            return Err(invalid("model.max_discharge_points", "must be at least 1"));
        }
        if self.model.id_max_len < MIN_ID_LEN {
            return Err(invalid("model.id_max_len", "must be at least 8"));
        }
        if self.soils.chunk_size == 0 {
            return Err(invalid("soils.chunk_size", "must be at least 1"));
        }
        Ok(())
    }

    /// The soil survey area symbol, required by the soil lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingAreaSymbol`] when `soils.area_symbol` is blank.
    pub fn soils_area_symbol(&self) -> Result<&str, ConfigError> {
        if self.soils.is_configured() {
            Ok(self.soils.area_symbol.trim())
        } else {
            Err(ConfigError::MissingAreaSymbol)
        }
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("tributary").join("config.toml"))
    }
}
