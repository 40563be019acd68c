//! Soil lookup error types.

use thiserror::Error;

/// Errors from the Soil Data Access lookup.
///
/// None of these are fatal to the pipeline: callers log them and leave the
/// hydrologic soil group blank.
#[derive(Debug, Error)]
pub enum SoilError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service returned a non-success status code.
    #[error("soil data access error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body.
        message: String,
    },

    /// The service returned a 429 Too Many Requests response.
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after_secs: u64,
    },

    /// The response body was not a recognizable table.
    #[error("parse error: {0}")]
    Parse(String),

    /// The lookup task was aborted or panicked.
    #[error("lookup task failed: {0}")]
    Task(String),
}
