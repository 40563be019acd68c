//! Model export error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    /// Subareas that would be missing from, or empty in, the model.
    #[error("cannot write model, subareas without curve numbers: {}", names.join(", "))]
    IncompleteSubcatchments { names: Vec<String> },

    /// Nothing to write.
    #[error("no subcatchments to export")]
    Empty,

    #[error("failed to write model file: {0}")]
    Io(#[from] std::io::Error),
}
