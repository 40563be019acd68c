//! Hydrologic soil groups.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Soil permeability class used to pick a CN column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HydrologicSoilGroup {
    A,
    B,
    C,
    D,
}

impl HydrologicSoilGroup {
    /// Extract the first `A`..`D` letter from a raw survey value.
    ///
    /// Dual classes like `"B/D"` resolve to their first letter; values with no
    /// usable letter (`"E"`, `"---"`, blank) yield `None`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        raw.trim()
            .chars()
            .map(|c| c.to_ascii_uppercase())
            .find_map(|c| match c {
                'A' => Some(Self::A),
                'B' => Some(Self::B),
                'C' => Some(Self::C),
                'D' => Some(Self::D),
                _ => None,
            })
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }
}

impl fmt::Display for HydrologicSoilGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Simplified HSG text: the letter, or an empty string when unusable.
#[must_use]
pub fn simplify(raw: &str) -> String {
    HydrologicSoilGroup::parse(raw).map_or_else(String::new, |g| g.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_first_letter_case_insensitively() {
        assert_eq!(HydrologicSoilGroup::parse("b"), Some(HydrologicSoilGroup::B));
        assert_eq!(HydrologicSoilGroup::parse(" C/D "), Some(HydrologicSoilGroup::C));
        assert_eq!(HydrologicSoilGroup::parse("E"), None);
        assert_eq!(HydrologicSoilGroup::parse(""), None);
    }

    #[test]
    fn simplify_blanks_invalid_groups() {
        assert_eq!(simplify("A/D"), "A");
        assert_eq!(simplify("---"), "");
    }
}
