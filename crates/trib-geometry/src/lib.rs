//! # trib-geometry
//!
//! The polygon algebra the overlay pipeline is built on: intersection,
//! difference, union, flattening and area over planar (projected)
//! coordinates, backed by the `geo` crate.
//!
//! Coordinates are expected in meters, so areas come back in square meters.
//! Results at or below the caller's area tolerance are treated as empty.

use geo::{Area as _, BooleanOps, BoundingRect, CoordsIter, Intersects, MultiPolygon, Polygon, Rect};
use trib_core::Area;

/// Unsigned planar area of a multipolygon.
#[must_use]
pub fn area(geometry: &MultiPolygon<f64>) -> Area {
    Area::from_sq_m(geometry.unsigned_area())
}

/// Signed area (positive for counter-clockwise exteriors).
#[must_use]
pub fn signed_area(geometry: &MultiPolygon<f64>) -> f64 {
    geometry.signed_area()
}

/// `true` when the geometry has at least one part, only finite coordinates and
/// a non-zero area.
#[must_use]
pub fn is_usable(geometry: &MultiPolygon<f64>) -> bool {
    !geometry.0.is_empty()
        && geometry
            .coords_iter()
            .all(|c| c.x.is_finite() && c.y.is_finite())
        && geometry.unsigned_area() > 0.0
}

/// Keep `geometry` only if it is usable and its area exceeds `tolerance`.
#[must_use]
pub fn significant(geometry: MultiPolygon<f64>, tolerance: Area) -> Option<MultiPolygon<f64>> {
    (is_usable(&geometry) && area(&geometry).exceeds(tolerance)).then_some(geometry)
}

#[must_use]
pub fn intersection(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    a.intersection(b)
}

#[must_use]
pub fn difference(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    a.difference(b)
}

/// Intersection that is `None` when empty or not above `tolerance`.
#[must_use]
pub fn clip(
    a: &MultiPolygon<f64>,
    b: &MultiPolygon<f64>,
    tolerance: Area,
) -> Option<MultiPolygon<f64>> {
    if !bbox_overlaps(a, b) {
        return None;
    }
    significant(intersection(a, b), tolerance)
}

/// Dissolve every usable input into one multipolygon.
///
/// Unusable inputs (empty, non-finite, zero-area) are skipped. Overlaps and
/// holes are resolved by ordinary union semantics.
#[must_use]
pub fn union_all<'a, I>(geometries: I) -> MultiPolygon<f64>
where
    I: IntoIterator<Item = &'a MultiPolygon<f64>>,
{
    geometries
        .into_iter()
        .filter(|g| is_usable(g))
        .fold(MultiPolygon::new(Vec::new()), |acc, next| {
            if acc.0.is_empty() {
                next.clone()
            } else {
                acc.union(next)
            }
        })
}

/// Split a multipolygon into its single-polygon parts.
#[must_use]
pub fn flatten(geometry: &MultiPolygon<f64>) -> Vec<Polygon<f64>> {
    geometry.0.clone()
}

#[must_use]
pub fn bounds(geometry: &MultiPolygon<f64>) -> Option<Rect<f64>> {
    geometry.bounding_rect()
}

/// Cheap candidate test: do the bounding rectangles touch or overlap?
#[must_use]
pub fn bbox_overlaps(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> bool {
    match (bounds(a), bounds(b)) {
        (Some(ra), Some(rb)) => ra.intersects(&rb),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use geo::polygon;

    use super::*;

    fn square(x: f64, y: f64, size: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: x, y: y),
            (x: x + size, y: y),
            (x: x + size, y: y + size),
            (x: x, y: y + size),
        ]])
    }

    #[test]
    fn overlapping_squares_intersect() {
        let a = square(0.0, 0.0, 10.0);
        let b = square(5.0, 5.0, 10.0);
        let clipped = clip(&a, &b, Area::from_sq_m(0.01)).expect("overlap");
        assert!((area(&clipped).sq_m() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn touching_squares_clip_to_nothing() {
        let a = square(0.0, 0.0, 10.0);
        let b = square(10.0, 0.0, 10.0);
        assert!(clip(&a, &b, Area::from_sq_m(0.01)).is_none());
    }

    #[test]
    fn disjoint_squares_skip_by_bbox() {
        assert!(!bbox_overlaps(&square(0.0, 0.0, 1.0), &square(5.0, 5.0, 1.0)));
    }

    #[test]
    fn union_dissolves_overlaps() {
        let a = square(0.0, 0.0, 10.0);
        let b = square(5.0, 0.0, 10.0);
        let u = union_all([&a, &b]);
        assert!((area(&u).sq_m() - 150.0).abs() < 1e-9);
        assert_eq!(flatten(&u).len(), 1);
    }

    #[test]
    fn union_skips_unusable_inputs() {
        let empty = MultiPolygon::new(Vec::new());
        let bad = square(f64::NAN, 0.0, 1.0);
        let good = square(0.0, 0.0, 2.0);
        let u = union_all([&empty, &bad, &good]);
        assert!((area(&u).sq_m() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn difference_leaves_remainder() {
        let a = square(0.0, 0.0, 10.0);
        let b = square(0.0, 0.0, 5.0);
        let rest = difference(&a, &b);
        assert!((area(&rest).sq_m() - 75.0).abs() < 1e-9);
    }

    #[test]
    fn signed_area_follows_orientation() {
        assert!(signed_area(&square(0.0, 0.0, 2.0)) > 0.0);
    }
}
