use geo::{MultiPolygon, Polygon};

use crate::attributes::{self, AttrValue, Properties};

/// A polygonal geometry plus its property bag.
///
/// Single polygons are stored as one-part multipolygons. Identity is the
/// feature's position within its layer.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonFeature {
    pub geometry: MultiPolygon<f64>,
    pub properties: Properties,
}

impl PolygonFeature {
    #[must_use]
    pub const fn new(geometry: MultiPolygon<f64>, properties: Properties) -> Self {
        Self {
            geometry,
            properties,
        }
    }

    #[must_use]
    pub fn from_polygon(polygon: Polygon<f64>, properties: Properties) -> Self {
        Self::new(MultiPolygon::new(vec![polygon]), properties)
    }

    /// Trimmed, non-empty text under a canonical key.
    #[must_use]
    pub fn text(&self, key: &str) -> Option<String> {
        attributes::text(&self.properties, key)
    }

    #[must_use]
    pub fn number(&self, key: &str) -> Option<f64> {
        self.properties.get(key).and_then(AttrValue::as_f64)
    }

    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        self.properties.get(key).is_some_and(AttrValue::as_bool)
    }

    /// Builder-style property setter.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<AttrValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: impl Into<AttrValue>) {
        self.properties.insert(key.to_string(), value.into());
    }
}
