//! Cross-cutting error types for tributary.
//!
//! Stage-specific errors (`OverlayError`, `HydroError`, `ExportError`, ...)
//! live in their own crates. The binary converges them with `anyhow`.

use thiserror::Error;

/// Errors that can be raised by any tributary crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A layer role name could not be recognized.
    #[error("Unknown layer role: {0}")]
    UnknownLayerRole(String),
}
