//! # trib-export
//!
//! Serializes aggregated subcatchments into a HydroCAD project file.

pub mod hydrocad;

mod error;

pub use error::ExportError;
pub use hydrocad::{
    DischargePointGraph, HydroCadModel, ModelOptions, export_file_name, render, write_model,
};
