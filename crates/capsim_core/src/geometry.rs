//! Segment and rectangle primitives for capsule contact detection.
//!
//! Capsules are segments swept by a sphere. Narrow-phase forces use the
//! nearest points between two segments; the binary "are these two touching"
//! test works on 2-D bounding rectangles in the xy-plane, clipped against each
//! other with Sutherland-Hodgman.

use crate::config::OverlapMeasure;
use glam::{DVec2, DVec3};
use std::cmp::Ordering;

/// Squared-length below which a segment is treated as a point.
const DEGENERATE_EPS: f64 = 1e-12;

/// `|dx|` below which a rod is considered vertical in the xy-plane.
const VERTICAL_EPS: f64 = 1e-9;

/// Nearest points between two segments `p1->q1` and `p2->q2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosestPoints {
    /// Parameter along the first segment, in [0, 1].
    pub s: f64,
    /// Parameter along the second segment, in [0, 1].
    pub t: f64,
    pub on_first: DVec3,
    pub on_second: DVec3,
}

impl ClosestPoints {
    #[must_use]
    pub fn distance(&self) -> f64 {
        self.on_first.distance(self.on_second)
    }
}

/// Computes the closest pair of points between two segments.
///
/// For (near-)parallel segments the choice is not unique; the midpoint of the
/// overlap of their projections is used so that side-by-side rods push along
/// their common normal instead of at an arbitrary end.
#[must_use]
pub fn closest_points(p1: DVec3, q1: DVec3, p2: DVec3, q2: DVec3) -> ClosestPoints {
    let d1 = q1 - p1;
    let d2 = q2 - p2;
    let r = p1 - p2;
    let a = d1.length_squared();
    let e = d2.length_squared();
    let f = d2.dot(r);

    let (s, t) = if a <= DEGENERATE_EPS && e <= DEGENERATE_EPS {
        (0.0, 0.0)
    } else if a <= DEGENERATE_EPS {
        (0.0, (f / e).clamp(0.0, 1.0))
    } else {
        let c = d1.dot(r);
        if e <= DEGENERATE_EPS {
            ((-c / a).clamp(0.0, 1.0), 0.0)
        } else {
            let b = d1.dot(d2);
            let denom = a * e - b * b;
            if denom > 1e-9 * a * e {
                let s = ((b * f - c * e) / denom).clamp(0.0, 1.0);
                let t = (b * s + f) / e;
                if t < 0.0 {
                    ((-c / a).clamp(0.0, 1.0), 0.0)
                } else if t > 1.0 {
                    (((b - c) / a).clamp(0.0, 1.0), 1.0)
                } else {
                    (s, t)
                }
            } else {
                parallel_parameters(p1, d1, a, p2, q2, d2, e)
            }
        }
    };

    ClosestPoints {
        s,
        t,
        on_first: p1 + d1 * s,
        on_second: p2 + d2 * t,
    }
}

fn parallel_parameters(
    p1: DVec3,
    d1: DVec3,
    a: f64,
    p2: DVec3,
    q2: DVec3,
    d2: DVec3,
    e: f64,
) -> (f64, f64) {
    let s0 = (p2 - p1).dot(d1) / a;
    let s1 = (q2 - p1).dot(d1) / a;
    let lo = s0.min(s1).max(0.0);
    let hi = s0.max(s1).min(1.0);
    let s = if lo <= hi {
        0.5 * (lo + hi)
    } else if s0.max(s1) < 0.0 {
        0.0
    } else {
        1.0
    };
    let t = ((p1 + d1 * s - p2).dot(d2) / e).clamp(0.0, 1.0);
    (s, t)
}

/// Orientation of the rod `x1 -> x2` projected on the xy-plane, in radians.
///
/// Vertical rods return `pi/2` instead of dividing by zero.
#[must_use]
pub fn rod_angle(x1: DVec3, x2: DVec3) -> f64 {
    let dx = x2.x - x1.x;
    let dy = x2.y - x1.y;
    if dx.abs() < VERTICAL_EPS {
        std::f64::consts::FRAC_PI_2
    } else {
        (dy / dx).atan()
    }
}

/// Rectangle with arbitrary orientation; corners are stored counter-clockwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedRect {
    pub corners: [DVec2; 4],
}

impl OrientedRect {
    #[must_use]
    pub fn new(center: DVec2, length: f64, width: f64, angle: f64) -> Self {
        let axis = DVec2::new(angle.cos(), angle.sin()) * (0.5 * length);
        let normal = DVec2::new(-angle.sin(), angle.cos()) * (0.5 * width);
        Self {
            corners: [
                center - axis - normal,
                center + axis - normal,
                center + axis + normal,
                center - axis + normal,
            ],
        }
    }

    /// Bounding rectangle of a capsule inflated by `range` on every side.
    #[must_use]
    pub fn around_capsule(x1: DVec3, x2: DVec3, radius: f64, range: f64) -> Self {
        let mid = (x1 + x2) * 0.5;
        let rod = (x2 - x1).truncate().length();
        let pad = radius + range;
        Self::new(mid.truncate(), rod + 2.0 * pad, 2.0 * pad, rod_angle(x1, x2))
    }

    fn key(&self) -> (f64, f64) {
        (self.corners[0].x, self.corners[0].y)
    }
}

/// Clips the convex `subject` polygon against the convex counter-clockwise `clip` polygon.
#[must_use]
pub fn clip_polygon(subject: &[DVec2], clip: &[DVec2]) -> Vec<DVec2> {
    let mut output: Vec<DVec2> = subject.to_vec();
    for i in 0..clip.len() {
        if output.is_empty() {
            break;
        }
        let e0 = clip[i];
        let e1 = clip[(i + 1) % clip.len()];
        let edge = e1 - e0;
        let inside = |p: DVec2| edge.perp_dot(p - e0) >= 0.0;

        let input = std::mem::take(&mut output);
        for j in 0..input.len() {
            let current = input[j];
            let previous = input[(j + input.len() - 1) % input.len()];
            let (cur_in, prev_in) = (inside(current), inside(previous));
            if cur_in {
                if !prev_in {
                    output.push(line_intersection(previous, current, e0, e1));
                }
                output.push(current);
            } else if prev_in {
                output.push(line_intersection(previous, current, e0, e1));
            }
        }
    }
    output
}

fn line_intersection(a0: DVec2, a1: DVec2, b0: DVec2, b1: DVec2) -> DVec2 {
    let da = a1 - a0;
    let db = b1 - b0;
    let denom = da.perp_dot(db);
    if denom.abs() < DEGENERATE_EPS {
        return a0;
    }
    let t = (b0 - a0).perp_dot(db) / denom;
    a0 + da * t
}

/// Shoelace area of a simple polygon.
#[must_use]
pub fn polygon_area(points: &[DVec2]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let twice: f64 = (0..points.len())
        .map(|i| points[i].perp_dot(points[(i + 1) % points.len()]))
        .sum();
    0.5 * twice.abs()
}

#[must_use]
pub fn polygon_perimeter(points: &[DVec2]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    (0..points.len())
        .map(|i| points[i].distance(points[(i + 1) % points.len()]))
        .sum()
}

/// Size of the intersection of two rectangles under `measure`.
///
/// The operands are put in a canonical order first, so the result does not
/// depend on which rectangle is passed first.
#[must_use]
pub fn overlap(a: &OrientedRect, b: &OrientedRect, measure: OverlapMeasure) -> f64 {
    let (subject, clip) = match a.key().partial_cmp(&b.key()) {
        Some(Ordering::Greater) => (b, a),
        _ => (a, b),
    };
    let polygon = clip_polygon(&subject.corners, &clip.corners);
    match measure {
        OverlapMeasure::Perimeter => polygon_perimeter(&polygon),
        OverlapMeasure::Area => polygon_area(&polygon),
    }
}

/// Binary collision test on bounding rectangles.
#[must_use]
pub fn rects_collide(
    a: &OrientedRect,
    b: &OrientedRect,
    measure: OverlapMeasure,
    threshold: f64,
) -> bool {
    overlap(a, b, measure) > threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_crossing_segments_meet_at_intersection() {
        let cp = closest_points(
            DVec3::new(-1.0, 0.0, 0.0),
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(0.0, -1.0, 0.0),
            DVec3::new(0.0, 1.0, 0.0),
        );
        assert!((cp.s - 0.5).abs() < 1e-12);
        assert!((cp.t - 0.5).abs() < 1e-12);
        assert!(cp.distance() < 1e-12);
    }

    #[test]
    fn test_skew_segments_in_3d() {
        let cp = closest_points(
            DVec3::new(-1.0, 0.0, 0.0),
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(0.0, -1.0, 2.0),
            DVec3::new(0.0, 1.0, 2.0),
        );
        assert!((cp.distance() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_parallel_segments_use_overlap_midpoint() {
        let cp = closest_points(
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(4.0, 0.0, 0.0),
            DVec3::new(2.0, 1.0, 0.0),
            DVec3::new(6.0, 1.0, 0.0),
        );
        assert!((cp.on_first.x - 3.0).abs() < 1e-12);
        assert!((cp.on_second.x - 3.0).abs() < 1e-12);
        assert!((cp.distance() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_collinear_disjoint_segments_use_facing_ends() {
        let cp = closest_points(
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(3.0, 0.0, 0.0),
            DVec3::new(5.0, 0.0, 0.0),
        );
        assert_eq!(cp.s, 1.0);
        assert_eq!(cp.t, 0.0);
        assert!((cp.distance() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_point_segment() {
        let p = DVec3::new(1.0, 2.0, 0.0);
        let cp = closest_points(p, p, DVec3::ZERO, DVec3::new(4.0, 0.0, 0.0));
        assert!((cp.on_second.x - 1.0).abs() < 1e-12);
        assert!((cp.distance() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_vertical_rod_angle() {
        let angle = rod_angle(DVec3::new(1.0, 0.0, 0.0), DVec3::new(1.0, 3.0, 0.0));
        assert_eq!(angle, FRAC_PI_2);
        let flat = rod_angle(DVec3::ZERO, DVec3::new(2.0, 0.0, 0.0));
        assert_eq!(flat, 0.0);
    }

    #[test]
    fn test_unit_square_measures() {
        let square = OrientedRect::new(DVec2::new(0.5, 0.5), 1.0, 1.0, 0.0);
        assert!((polygon_area(&square.corners) - 1.0).abs() < 1e-12);
        assert!((polygon_perimeter(&square.corners) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_half_overlapping_squares() {
        let a = OrientedRect::new(DVec2::new(0.0, 0.0), 2.0, 2.0, 0.0);
        let b = OrientedRect::new(DVec2::new(1.0, 0.0), 2.0, 2.0, 0.0);
        assert!((overlap(&a, &b, OverlapMeasure::Area) - 2.0).abs() < 1e-9);
        assert!((overlap(&a, &b, OverlapMeasure::Perimeter) - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_disjoint_rects_do_not_collide() {
        let a = OrientedRect::new(DVec2::new(0.0, 0.0), 2.0, 1.0, 0.3);
        let b = OrientedRect::new(DVec2::new(10.0, 0.0), 2.0, 1.0, -0.3);
        assert!(!rects_collide(&a, &b, OverlapMeasure::Perimeter, 0.0));
        assert_eq!(overlap(&a, &b, OverlapMeasure::Area), 0.0);
    }

    #[test]
    fn test_contained_rect_collides() {
        let outer = OrientedRect::new(DVec2::new(0.0, 0.0), 10.0, 10.0, 0.7);
        let inner = OrientedRect::new(DVec2::new(0.5, -0.5), 1.0, 0.5, -0.2);
        assert!(rects_collide(&outer, &inner, OverlapMeasure::Perimeter, 0.0));
        assert!(rects_collide(&inner, &outer, OverlapMeasure::Area, 0.0));
        assert!((overlap(&outer, &inner, OverlapMeasure::Area) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_capsule_rect_is_padded() {
        let rect = OrientedRect::around_capsule(
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(4.0, 0.0, 0.0),
            0.5,
            0.25,
        );
        assert!((polygon_area(&rect.corners) - 5.5 * 1.5).abs() < 1e-9);
    }
}
