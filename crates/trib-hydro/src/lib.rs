//! # trib-hydro
//!
//! Hydrologic side of the model pipeline:
//! - [`cn`]: the curve-number table and its lookup view
//! - [`aggregate`]: grouping final overlay polygons into subcatchments
//! - [`signature`]: structural content signatures for preview memoization
//! - [`pipeline`]: the explicit end-to-end pipeline function

pub mod aggregate;
pub mod cn;
pub mod pipeline;
pub mod signature;

mod error;

pub use aggregate::{AggregateOutput, aggregate, sanitize_id};
pub use cn::{CnLookup, CnRecord, CnTable};
pub use error::HydroError;
pub use pipeline::{
    PipelineInputs, PipelineMode, PipelineOutput, PipelineSettings, RawLayer, run,
};
pub use signature::{PreviewMemo, Signature, signature_of};
