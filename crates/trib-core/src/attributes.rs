//! Scalar property bags and the canonical attribute keys.
//!
//! Source layers arrive with whatever key casing the surveyor's software
//! produced. [`crate::schema`] maps them onto the canonical keys below once
//! per layer; every later stage reads canonical keys only.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Discharge-point name a drainage boundary drains to.
pub const DA_NAME: &str = "DA_NAME";
/// Declared or resolved subarea name.
pub const SUBAREA_NAME: &str = "SUBAREA_NAME";
/// Discharge point a subarea belongs to.
pub const PARENT_DA: &str = "PARENT_DA";
/// `true` on complement features.
pub const IS_COMPLEMENT: &str = "IS_COMPLEMENT";
/// Subarea area in acres.
pub const SUBAREA_AC: &str = "SUBAREA_AC";
/// Hydrologic soil group letter (`A`..`D`, or blank).
pub const HSG: &str = "HSG";
/// Soil map unit symbol.
pub const MUSYM: &str = "MUSYM";
/// Soil map unit name.
pub const MUNAME: &str = "MUNAME";
/// Land-cover description.
pub const LAND_COVER: &str = "LAND_COVER";
/// Resolved curve number.
pub const CN: &str = "CN";
/// Overlay polygon area in square feet.
pub const AREA_SF: &str = "AREA_SF";
/// Overlay polygon area in acres.
pub const AREA_AC: &str = "AREA_AC";

/// Property bag attached to every feature. Ordered so serialization is stable.
pub type Properties = BTreeMap<String, AttrValue>;

/// A scalar attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl AttrValue {
    /// Trimmed text form. `None` for null, empty strings and non-finite numbers.
    #[must_use]
    pub fn as_text(&self) -> Option<String> {
        let text = match self {
            Self::Null => return None,
            Self::Bool(b) => b.to_string(),
            Self::Number(n) if n.is_finite() => n.to_string(),
            Self::Number(_) => return None,
            Self::Text(s) => s.trim().to_string(),
        };
        (!text.is_empty()).then_some(text)
    }

    /// Numeric form; text is parsed after trimming.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) if n.is_finite() => Some(*n),
            Self::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    /// Truthiness for flag attributes such as [`IS_COMPLEMENT`].
    #[must_use]
    pub fn as_bool(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0,
            Self::Text(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"),
            Self::Null => false,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&serde_json::Value> for AttrValue {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(*b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Self::Null, Self::Number),
            serde_json::Value::String(s) => Self::Text(s.clone()),
            other => Self::Text(other.to_string()),
        }
    }
}

impl From<&AttrValue> for serde_json::Value {
    fn from(value: &AttrValue) -> Self {
        match value {
            AttrValue::Null => Self::Null,
            AttrValue::Bool(b) => Self::Bool(*b),
            AttrValue::Number(n) => {
                serde_json::Number::from_f64(*n).map_or(Self::Null, Self::Number)
            }
            AttrValue::Text(s) => Self::String(s.clone()),
        }
    }
}

/// Trimmed, non-empty text stored under `key`.
#[must_use]
pub fn text(props: &Properties, key: &str) -> Option<String> {
    props.get(key).and_then(AttrValue::as_text)
}

/// Case-insensitive lookup over a list of candidate keys, first alias wins.
///
/// Blank values are skipped so a later alias can still supply the value.
#[must_use]
pub fn find_ci<'a>(props: &'a Properties, aliases: &[&str]) -> Option<&'a AttrValue> {
    aliases.iter().find_map(|alias| {
        props
            .iter()
            .find(|(key, value)| key.eq_ignore_ascii_case(alias) && value.as_text().is_some())
            .map(|(_, value)| value)
    })
}

/// Merge `overlay` into `base`; keys in `overlay` win on collision.
#[must_use]
pub fn merged(base: &Properties, overlay: &Properties) -> Properties {
    let mut out = base.clone();
    out.extend(overlay.iter().map(|(k, v)| (k.clone(), v.clone())));
    out
}
