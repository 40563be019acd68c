//! Overlay stage error types.

use thiserror::Error;

use crate::validate::CompletenessReport;

#[derive(Debug, Error)]
pub enum OverlayError {
    /// Required inputs are missing; nothing geometric was attempted.
    #[error("input data is incomplete:\n{0}")]
    Incomplete(CompletenessReport),

    /// The drainage boundaries dissolved to nothing above tolerance.
    #[error("no overall drainage boundary could be derived")]
    NoOverallBoundary,
}
