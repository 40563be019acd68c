//! Hydrologic stage error types.

use thiserror::Error;
use trib_overlay::OverlayError;

#[derive(Debug, Error)]
pub enum HydroError {
    /// The curve-number table has no records.
    #[error("curve number table is empty")]
    EmptyCnTable,

    /// Two records share a land cover (case-insensitive).
    #[error("curve number table lists land cover '{0}' more than once")]
    DuplicateLandCover(String),

    /// A record has a non-finite or negative CN value.
    #[error("curve number for '{land_cover}' (HSG {hsg}) is not a valid number")]
    InvalidCurveNumber { land_cover: String, hsg: String },

    #[error("failed to read curve number table: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse curve number table: {0}")]
    Json(#[from] serde_json::Error),

    /// A geometric stage refused to run (incomplete inputs).
    #[error(transparent)]
    Overlay(#[from] OverlayError),

    /// Subcatchments left without any CN bucket.
    #[error("subcatchments without curve numbers: {}", names.join(", "))]
    UnresolvedCurveNumbers { names: Vec<String> },
}
