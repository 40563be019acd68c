use serde::{Deserialize, Serialize};

/// One CN/description bucket within a subcatchment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaGroup {
    pub cn: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub area_sq_ft: f64,
}

/// An aggregated hydrologic unit: one named subarea and its CN buckets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subcatchment {
    /// Identifier-safe id, unique within one model-generation run.
    pub id: String,
    pub name: String,
    /// Owning discharge point label(s), sorted and comma-joined when several.
    pub parent_discharge_point: Option<String>,
    pub areas: Vec<AreaGroup>,
}

impl Subcatchment {
    /// A subcatchment without CN buckets cannot be written to a model.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.areas.is_empty()
    }

    #[must_use]
    pub fn total_area_sq_ft(&self) -> f64 {
        self.areas.iter().map(|a| a.area_sq_ft).sum()
    }
}
