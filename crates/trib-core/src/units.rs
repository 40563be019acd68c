//! Area units.
//!
//! All arithmetic happens in square meters. Square feet and acres exist only
//! at presentation boundaries (attributes, model files, reports).

use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};

use serde::{Deserialize, Serialize};

/// Square feet in one square meter (1 / 0.3048²).
pub const SQ_FT_PER_SQ_M: f64 = 10.763_910_416_709_722;
/// Square meters in one international acre.
pub const SQ_M_PER_ACRE: f64 = 4_046.856_422_4;

/// A planar area, stored in square meters.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Area(f64);

impl Area {
    pub const ZERO: Self = Self(0.0);

    #[must_use]
    pub const fn from_sq_m(sq_m: f64) -> Self {
        Self(sq_m)
    }

    #[must_use]
    pub fn from_sq_ft(sq_ft: f64) -> Self {
        Self(sq_ft / SQ_FT_PER_SQ_M)
    }

    #[must_use]
    pub fn from_acres(acres: f64) -> Self {
        Self(acres * SQ_M_PER_ACRE)
    }

    #[must_use]
    pub const fn sq_m(self) -> f64 {
        self.0
    }

    #[must_use]
    pub fn sq_ft(self) -> f64 {
        self.0 * SQ_FT_PER_SQ_M
    }

    #[must_use]
    pub fn acres(self) -> f64 {
        self.0 / SQ_M_PER_ACRE
    }

    /// `true` when strictly above `tolerance` (and finite).
    #[must_use]
    pub fn exceeds(self, tolerance: Self) -> bool {
        self.0.is_finite() && self.0 > tolerance.0
    }
}

impl Add for Area {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Area {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Area {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Sum for Area {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}
