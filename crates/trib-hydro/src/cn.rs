//! Curve-number table and lookup.
//!
//! The table is an ordered list of `{ LandCover, A, B, C, D }` records,
//! unique by case-insensitive land cover. Lookups go through [`CnLookup`],
//! which tries an exact land-cover match before a case-insensitive one.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use trib_core::HydrologicSoilGroup;
use trib_overlay::CurveNumbers;

use crate::error::HydroError;

/// One land cover and its CN per hydrologic soil group.
///
/// A missing column means "no CN for that soil group"; nothing is
/// interpolated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CnRecord {
    #[serde(rename = "LandCover", alias = "landCover", alias = "land_cover", alias = "Description")]
    pub land_cover: String,
    #[serde(rename = "A", alias = "a", default)]
    pub a: Option<f64>,
    #[serde(rename = "B", alias = "b", default)]
    pub b: Option<f64>,
    #[serde(rename = "C", alias = "c", default)]
    pub c: Option<f64>,
    #[serde(rename = "D", alias = "d", default)]
    pub d: Option<f64>,
}

impl CnRecord {
    #[must_use]
    pub fn new(land_cover: impl Into<String>, a: f64, b: f64, c: f64, d: f64) -> Self {
        Self {
            land_cover: land_cover.into(),
            a: Some(a),
            b: Some(b),
            c: Some(c),
            d: Some(d),
        }
    }

    #[must_use]
    pub const fn value(&self, group: HydrologicSoilGroup) -> Option<f64> {
        match group {
            HydrologicSoilGroup::A => self.a,
            HydrologicSoilGroup::B => self.b,
            HydrologicSoilGroup::C => self.c,
            HydrologicSoilGroup::D => self.d,
        }
    }
}

/// Validated curve-number table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CnTable {
    records: Vec<CnRecord>,
}

impl CnTable {
    /// Validate and wrap `records`.
    ///
    /// # Errors
    ///
    /// - [`HydroError::EmptyCnTable`] when `records` is empty.
    /// - [`HydroError::DuplicateLandCover`] when two land covers differ only
    ///   by case.
    /// - [`HydroError::InvalidCurveNumber`] for negative or non-finite values.
    pub fn new(records: Vec<CnRecord>) -> Result<Self, HydroError> {
        if records.is_empty() {
            return Err(HydroError::EmptyCnTable);
        }

        let mut seen = HashSet::new();
        for record in &records {
            let key = record.land_cover.trim().to_lowercase();
            if !seen.insert(key) {
                return Err(HydroError::DuplicateLandCover(record.land_cover.clone()));
            }
            for group in [
                HydrologicSoilGroup::A,
                HydrologicSoilGroup::B,
                HydrologicSoilGroup::C,
                HydrologicSoilGroup::D,
            ] {
                if record.value(group).is_some_and(|v| !v.is_finite() || v < 0.0) {
                    return Err(HydroError::InvalidCurveNumber {
                        land_cover: record.land_cover.clone(),
                        hsg: group.to_string(),
                    });
                }
            }
        }

        Ok(Self { records })
    }

    /// Parse a JSON array of records.
    ///
    /// # Errors
    ///
    /// Returns [`HydroError::Json`] for malformed JSON, otherwise the
    /// validation errors of [`Self::new`].
    pub fn from_json(json: &str) -> Result<Self, HydroError> {
        let records: Vec<CnRecord> = serde_json::from_str(json)?;
        Self::new(records)
    }

    /// Read and parse a JSON table from disk.
    ///
    /// # Errors
    ///
    /// Returns [`HydroError::Io`] if the file cannot be read, otherwise the
    /// errors of [`Self::from_json`].
    pub fn from_path(path: &Path) -> Result<Self, HydroError> {
        let json = std::fs::read_to_string(path)?;
        let table = Self::from_json(&json)?;
        tracing::debug!(path = %path.display(), records = table.len(), "loaded curve number table");
        Ok(table)
    }

    #[must_use]
    pub fn records(&self) -> &[CnRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Land-cover spellings in table order, for ingestion normalization.
    #[must_use]
    pub fn land_covers(&self) -> Vec<String> {
        self.records.iter().map(|r| r.land_cover.clone()).collect()
    }

    #[must_use]
    pub fn lookup(&self) -> CnLookup<'_> {
        CnLookup::new(self)
    }
}

/// Read-only lookup view over a [`CnTable`].
#[derive(Debug, Clone)]
pub struct CnLookup<'a> {
    exact: HashMap<&'a str, &'a CnRecord>,
    folded: HashMap<String, &'a CnRecord>,
}

impl<'a> CnLookup<'a> {
    #[must_use]
    pub fn new(table: &'a CnTable) -> Self {
        let exact = table
            .records
            .iter()
            .map(|r| (r.land_cover.trim(), r))
            .collect();
        let folded = table
            .records
            .iter()
            .map(|r| (r.land_cover.trim().to_lowercase(), r))
            .collect();
        Self { exact, folded }
    }

    #[must_use]
    pub fn record(&self, land_cover: &str) -> Option<&'a CnRecord> {
        let key = land_cover.trim();
        self.exact
            .get(key)
            .or_else(|| self.folded.get(&key.to_lowercase()))
            .copied()
    }

    /// CN for a land cover and a raw soil-group value.
    ///
    /// `None` when the land cover is unknown, the soil group has no `A`..`D`
    /// letter, or the table has no value in that column.
    #[must_use]
    pub fn resolve(&self, land_cover: &str, hsg: &str) -> Option<f64> {
        let group = HydrologicSoilGroup::parse(hsg)?;
        self.record(land_cover)?.value(group)
    }
}

impl CurveNumbers for CnLookup<'_> {
    fn curve_number(&self, land_cover: &str, hsg: &str) -> Option<f64> {
        self.resolve(land_cover, hsg)
    }
}
