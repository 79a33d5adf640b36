//! Chord-bisector circle fit.
//!
//! The perpendicular bisector of any chord passes through the circle centre.
//! Pairs of chords between sub-sampled edge points give pairs of bisectors;
//! their intersections are averaged into the centre estimate and the radius
//! is the mean distance from that centre to every edge point.

use crate::Vector2;

use super::Circle;

/// Chords shorter than this (pixels) give an unreliable bisector direction.
pub const MIN_CHORD_LENGTH: f32 = 1.0;

/// Bisector pairs meeting at an angle whose sine is below this (about 3°) are
/// treated as parallel. Pixel-quantised endpoints put their intersection
/// anywhere along a long, thin error region.
pub const PARALLEL_TOLERANCE: f32 = 0.05;

/// A line `a·x + b·y + c = 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line2D {
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl Line2D {
    /// Perpendicular bisector of the chord `p1 → p2`, with `(a, b)` the unit
    /// chord direction.
    ///
    /// Returns `None` for chords shorter than [`MIN_CHORD_LENGTH`].
    pub fn perpendicular_bisector(p1: &Vector2, p2: &Vector2) -> Option<Self> {
        let chord = p2 - p1;
        let length = chord.norm();
        if length < MIN_CHORD_LENGTH {
            return None;
        }
        let u = chord / length;
        let mid = (p1 + p2) * 0.5;
        Some(Self {
            a: u.x,
            b: u.y,
            c: -u.dot(&mid),
        })
    }

    /// Intersection with `other`, from the homogeneous cross product.
    ///
    /// Returns `None` for parallel or coincident lines.
    pub fn intersection(&self, other: &Line2D) -> Option<Vector2> {
        let px = self.b * other.c - other.b * self.c;
        let py = other.a * self.c - self.a * other.c;
        let w = self.a * other.b - other.a * self.b;
        if w.abs() < PARALLEL_TOLERANCE * self.a.hypot(self.b) * other.a.hypot(other.b) {
            return None;
        }
        let p = Vector2::new(px / w, py / w);
        (p.x.is_finite() && p.y.is_finite()).then_some(p)
    }
}

/// Fit a circle from chord bisector intersections.
///
/// Every `stride`-th point is sampled by index, so nothing is allocated. All
/// sample pairs that differ in both coordinates form chords, taken in order
/// and consumed two at a time. The
/// centre is the mean of all valid bisector intersections; the radius is the
/// mean distance from it to all of `points`, not just the samples.
///
/// Returns [`Circle::DEGENERATE`] when no pair of chords intersects.
pub fn fit_chord(points: &[Vector2], stride: usize) -> Circle {
    let stride = stride.max(1);
    let num_samples = points.len().div_ceil(stride);
    if num_samples < 3 {
        return Circle::DEGENERATE;
    }

    let chords = (0..points.len()).step_by(stride).flat_map(move |i| {
        (i + stride..points.len())
            .step_by(stride)
            .map(move |k| (points[i], points[k]))
            .filter(|(p, q)| q.x != p.x && q.y != p.y)
    });

    let mut first: Option<(Vector2, Vector2)> = None;
    let mut sum_x = 0.0f64;
    let mut sum_y = 0.0f64;
    let mut count = 0usize;
    for chord in chords {
        let Some((p1, p2)) = first.take() else {
            first = Some(chord);
            continue;
        };
        let (p3, p4) = chord;
        let (Some(l1), Some(l2)) = (
            Line2D::perpendicular_bisector(&p1, &p2),
            Line2D::perpendicular_bisector(&p3, &p4),
        ) else {
            continue;
        };
        if let Some(centre) = l1.intersection(&l2) {
            sum_x += centre.x as f64;
            sum_y += centre.y as f64;
            count += 1;
        }
    }

    if count == 0 {
        return Circle::DEGENERATE;
    }
    let centre = Vector2::new((sum_x / count as f64) as f32, (sum_y / count as f64) as f32);
    let radius = points
        .iter()
        .map(|p| (p - centre).norm() as f64)
        .sum::<f64>()
        / points.len() as f64;
    Circle::new(centre.x, centre.y, radius as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circle_fit::arc_points;

    #[test]
    fn test_bisector_passes_through_midpoint() {
        let p1 = Vector2::new(-3.0, 1.0);
        let p2 = Vector2::new(5.0, 7.0);
        let line = Line2D::perpendicular_bisector(&p1, &p2).unwrap();
        let mid = (p1 + p2) * 0.5;
        assert!((line.a * mid.x + line.b * mid.y + line.c).abs() < 1e-5);
        // Both endpoints are equidistant, so they evaluate to opposite signs.
        let e1 = line.a * p1.x + line.b * p1.y + line.c;
        let e2 = line.a * p2.x + line.b * p2.y + line.c;
        assert!((e1 + e2).abs() < 1e-5);
    }

    #[test]
    fn test_short_chord_rejected() {
        let p = Vector2::new(10.0, 10.0);
        assert!(Line2D::perpendicular_bisector(&p, &Vector2::new(10.5, 10.5)).is_none());
        assert!(Line2D::perpendicular_bisector(&p, &p).is_none());
    }

    #[test]
    fn test_intersection() {
        // x = 2 and y = -3
        let vertical = Line2D { a: 1.0, b: 0.0, c: -2.0 };
        let horizontal = Line2D { a: 0.0, b: 1.0, c: 3.0 };
        let p = vertical.intersection(&horizontal).unwrap();
        assert!((p.x - 2.0).abs() < 1e-6 && (p.y + 3.0).abs() < 1e-6);
        assert!(vertical.intersection(&Line2D { a: 1.0, b: 0.0, c: 5.0 }).is_none());
        assert!(vertical.intersection(&vertical).is_none());
    }

    #[test]
    fn test_exact_circle() {
        let points = arc_points(5.0, -120.0, 110.0, 0.4, 2.7, 300);
        let c = fit_chord(&points, 20);
        assert!((c.center.x - 5.0).abs() < 0.05, "x0 = {}", c.center.x);
        assert!((c.center.y + 120.0).abs() < 0.05, "y0 = {}", c.center.y);
        assert!((c.radius - 110.0).abs() < 0.05, "r = {}", c.radius);
    }

    #[test]
    fn test_stride_one_uses_every_point() {
        let points = arc_points(0.0, 0.0, 30.0, 0.0, 3.0, 12);
        let c = fit_chord(&points, 1);
        assert!((c.radius - 30.0).abs() < 0.01, "r = {}", c.radius);
        // A zero stride is treated as one.
        assert_eq!(fit_chord(&points, 0), c);
    }

    #[test]
    fn test_stride_samples_in_place() {
        let points = arc_points(-8.0, -140.0, 125.0, 0.6, 2.5, 230);
        let subset: Vec<Vector2> = points.iter().step_by(20).copied().collect();
        let strided = fit_chord(&points, 20);
        let explicit = fit_chord(&subset, 1);
        // Same chords in the same order, so the same centre.
        assert_eq!(strided.center, explicit.center);
        assert!((strided.radius - explicit.radius).abs() < 1e-2);
        // 230 points at stride 20 is 12 samples; 40 at stride 20 is only 2.
        assert!(!strided.is_degenerate());
        assert!(fit_chord(&points[..40], 20).is_degenerate());
        assert!(!fit_chord(&points[..41], 20).is_degenerate());
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(fit_chord(&[], 20).is_degenerate());
        // Too few samples after striding.
        let points = arc_points(0.0, 0.0, 30.0, 0.0, 3.0, 30);
        assert!(fit_chord(&points, 20).is_degenerate());
        // A horizontal line: no pair differs in both coordinates.
        let line: Vec<Vector2> = (0..100).map(|i| Vector2::new(i as f32, 4.0)).collect();
        assert!(fit_chord(&line, 5).is_degenerate());
    }
}
