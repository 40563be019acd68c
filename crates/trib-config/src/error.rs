//! Errors raised while loading or checking tributary settings.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config file or `TRIB_*` variable could not be merged or parsed.
    #[error("failed to load tributary settings: {0}")]
    Figment(#[from] figment::Error),

    /// The soil lookup was requested without a survey area.
    #[error("no soil survey area symbol configured (set soils.area_symbol or TRIB_SOILS__AREA_SYMBOL)")]
    MissingAreaSymbol,

    /// A setting is outside the range the pipeline accepts. `field` is the
    /// dotted path, e.g. `geometry.area_tolerance_sq_m`.
    #[error("{field} {reason}")]
    InvalidValue { field: String, reason: String },
}
