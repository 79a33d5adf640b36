//! Algebraic (Kåsa) least-squares circle fit.
//!
//! The circle `(x - x0)² + (y - y0)² = r²` is rewritten as the linear model
//!
//! ```text
//! x² + y² = 2·x0·x + 2·y0·y + (r² - x0² - y0²)
//! ```
//!
//! whose normal equations are a symmetric 3×3 system. Sums are accumulated
//! in f64: the cubic moments of a 160-pixel-wide frame lose too many digits
//! in f32 once several hundred points are summed.

use nalgebra::{Matrix3, Vector3};

use crate::linalg::{det3, invert3, multiply3x3_3x1};
use crate::Vector2;

use super::Circle;

/// Relative determinant below which the normal matrix is treated as singular
/// (collinear or coincident points).
const SINGULAR_TOLERANCE: f64 = 1e-12;

/// Fit a circle to `points` by linear least squares.
///
/// Returns [`Circle::DEGENERATE`] for fewer than three points or when the
/// points do not determine a circle.
pub fn fit_least_squares(points: &[Vector2]) -> Circle {
    if points.len() < 3 {
        return Circle::DEGENERATE;
    }

    let mut a = Matrix3::<f64>::zeros();
    let mut b = Vector3::<f64>::zeros();
    for p in points {
        let x = p.x as f64;
        let y = p.y as f64;
        let r2 = x * x + y * y;
        a[(0, 0)] += x * x;
        a[(0, 1)] += x * y;
        a[(0, 2)] += x;
        a[(1, 1)] += y * y;
        a[(1, 2)] += y;
        b[0] += x * r2;
        b[1] += y * r2;
        b[2] += r2;
    }
    a[(1, 0)] = a[(0, 1)];
    a[(2, 0)] = a[(0, 2)];
    a[(2, 1)] = a[(1, 2)];
    a[(2, 2)] = points.len() as f64;

    let det = det3(&a);
    let scale = (a[(0, 0)] * a[(1, 1)] * a[(2, 2)]).abs();
    if !det.is_finite() || det.abs() <= SINGULAR_TOLERANCE * scale {
        return Circle::DEGENERATE;
    }

    let solution = multiply3x3_3x1(&invert3(&a), &b);
    let x0 = 0.5 * solution[0];
    let y0 = 0.5 * solution[1];
    let radius = (solution[2] + x0 * x0 + y0 * y0).max(0.0).sqrt();

    if !(x0.is_finite() && y0.is_finite() && radius.is_finite()) {
        return Circle::DEGENERATE;
    }
    Circle::new(x0 as f32, y0 as f32, radius as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circle_fit::arc_points;

    #[test]
    fn test_full_circle() {
        let points = arc_points(12.5, -7.0, 40.0, 0.0, std::f32::consts::TAU, 90);
        let c = fit_least_squares(&points);
        assert!((c.center.x - 12.5).abs() < 1e-3, "x0 = {}", c.center.x);
        assert!((c.center.y + 7.0).abs() < 1e-3, "y0 = {}", c.center.y);
        assert!((c.radius - 40.0).abs() < 1e-3, "r = {}", c.radius);
    }

    #[test]
    fn test_partial_horizon_arc() {
        // A large Earth disc below the frame: only a shallow arc is visible.
        let points = arc_points(15.0, -260.0, 230.0, 1.25, 1.90, 150);
        let c = fit_least_squares(&points);
        assert!((c.center.x - 15.0).abs() < 0.05, "x0 = {}", c.center.x);
        assert!((c.center.y + 260.0).abs() < 0.05, "y0 = {}", c.center.y);
        assert!((c.radius - 230.0).abs() < 0.05, "r = {}", c.radius);
    }

    #[test]
    fn test_too_few_points() {
        let points = [Vector2::new(0.0, 0.0), Vector2::new(1.0, 1.0)];
        assert!(fit_least_squares(&points).is_degenerate());
        assert!(fit_least_squares(&[]).is_degenerate());
    }

    #[test]
    fn test_collinear_points_are_degenerate() {
        let points: Vec<Vector2> = (0..50)
            .map(|i| Vector2::new(i as f32 - 25.0, 0.5 * i as f32 - 3.0))
            .collect();
        let c = fit_least_squares(&points);
        assert!(c.is_degenerate(), "collinear fit gave radius {}", c.radius);
    }
}
