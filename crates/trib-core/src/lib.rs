//! # trib-core
//!
//! Core types shared by every tributary crate.
//!
//! This crate provides:
//! - Polygon features with a scalar property bag, and named layers of them
//! - The canonical attribute schema and the ingestion step that maps
//!   inconsistently-cased source attributes onto it
//! - Discharge-point name canonicalization
//! - Area units (square meters internally, square feet / acres at the edges)
//! - Hydrologic soil group parsing
//! - Subcatchment and area-group output types
//! - A bounded event log returned by every pipeline stage
//! - Cross-cutting error types

pub mod attributes;
pub mod errors;
pub mod events;
pub mod feature;
pub mod hsg;
pub mod layer;
pub mod naming;
pub mod schema;
pub mod subcatchment;
pub mod units;

pub use attributes::{AttrValue, Properties};
pub use errors::CoreError;
pub use events::{Event, EventLevel, EventLog, Stage};
pub use feature::PolygonFeature;
pub use hsg::HydrologicSoilGroup;
pub use layer::{LayerCategory, LayerRole, NamedLayer};
pub use subcatchment::{AreaGroup, Subcatchment};
pub use units::Area;
