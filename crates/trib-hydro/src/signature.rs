//! Structural content signatures.
//!
//! A signature is an xxh3 hash fed directly from feature structure
//! (coordinates as IEEE-754 bits, properties in key order), so two layers
//! with equal content always hash equally regardless of how they were
//! serialized.

use std::fmt;

use geo::{LineString, Polygon};
use serde::{Deserialize, Serialize};
use trib_core::{AttrValue, NamedLayer, PolygonFeature};
use xxhash_rust::xxh3::Xxh3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signature(u64);

impl Signature {
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Parse the 16-digit hex form produced by `Display`.
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        u64::from_str_radix(hex.trim(), 16).ok().map(Self)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Signature over the features of `layers`, in order.
///
/// Layer names and categories are not hashed: only content matters.
#[must_use]
pub fn signature_of(layers: &[&NamedLayer]) -> Signature {
    let mut hasher = Xxh3::new();
    hasher.update(&(layers.len() as u64).to_le_bytes());
    for layer in layers {
        hasher.update(&(layer.features.len() as u64).to_le_bytes());
        for feature in &layer.features {
            hash_feature(&mut hasher, feature);
        }
    }
    Signature(hasher.digest())
}

fn hash_feature(hasher: &mut Xxh3, feature: &PolygonFeature) {
    hasher.update(&(feature.geometry.0.len() as u64).to_le_bytes());
    for polygon in &feature.geometry.0 {
        hash_polygon(hasher, polygon);
    }
    hasher.update(&(feature.properties.len() as u64).to_le_bytes());
    for (key, value) in &feature.properties {
        hash_bytes(hasher, key.as_bytes());
        match value {
            AttrValue::Null => hasher.update(&[0]),
            AttrValue::Bool(b) => hasher.update(&[1, u8::from(*b)]),
            AttrValue::Number(n) => {
                hasher.update(&[2]);
                hasher.update(&n.to_bits().to_le_bytes());
            }
            AttrValue::Text(s) => {
                hasher.update(&[3]);
                hash_bytes(hasher, s.as_bytes());
            }
        }
    }
}

fn hash_polygon(hasher: &mut Xxh3, polygon: &Polygon<f64>) {
    hash_ring(hasher, polygon.exterior());
    hasher.update(&(polygon.interiors().len() as u64).to_le_bytes());
    for ring in polygon.interiors() {
        hash_ring(hasher, ring);
    }
}

fn hash_ring(hasher: &mut Xxh3, ring: &LineString<f64>) {
    hasher.update(&(ring.0.len() as u64).to_le_bytes());
    for coord in &ring.0 {
        hasher.update(&coord.x.to_bits().to_le_bytes());
        hasher.update(&coord.y.to_bits().to_le_bytes());
    }
}

fn hash_bytes(hasher: &mut Xxh3, bytes: &[u8]) {
    hasher.update(&(bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

/// Remembers the last emitted preview so unchanged results are not
/// re-emitted.
#[derive(Debug, Clone, Default)]
pub struct PreviewMemo {
    last: Option<Signature>,
}

impl PreviewMemo {
    #[must_use]
    pub const fn new(last: Option<Signature>) -> Self {
        Self { last }
    }

    #[must_use]
    pub const fn last(&self) -> Option<Signature> {
        self.last
    }

    /// `true` (and remember `signature`) when it differs from the last one.
    pub fn should_emit(&mut self, signature: Signature) -> bool {
        if self.last == Some(signature) {
            return false;
        }
        self.last = Some(signature);
        true
    }
}
