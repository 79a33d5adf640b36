//! Circle fitting to the horizon edge points.
//!
//! Two interchangeable algorithms reduce the edge point list to a single
//! circle in the image-centred frame:
//!
//! - [`FitAlgorithm::LeastSquares`]: closed-form algebraic fit, one O(n)
//!   accumulation and a 3×3 solve. Fast and deterministic, but sensitive to
//!   uneven point density and outliers.
//! - [`FitAlgorithm::Chord`]: intersects perpendicular bisectors of chords
//!   between sub-sampled points and averages the intersections. More robust
//!   when only a short, noisy arc is visible, at a higher cost.
//!
//! Either fit may come back degenerate (radius zero) when the points do not
//! determine a circle; the caller must check before trusting it.

pub mod chord;
pub mod least_squares;

use rkyv::{Archive, Deserialize, Serialize};

use crate::Vector2;

pub use chord::{fit_chord, Line2D};
pub use least_squares::fit_least_squares;

/// Fitted horizon circle, image-centred pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    /// Centre, +x right, +y up, origin at the image centre.
    pub center: Vector2,
    /// Radius in pixels, never negative.
    pub radius: f32,
}

impl Circle {
    /// The "no circle" value returned when a fit is undetermined.
    pub const DEGENERATE: Circle = Circle {
        center: Vector2::new(0.0, 0.0),
        radius: 0.0,
    };

    pub fn new(center_x: f32, center_y: f32, radius: f32) -> Self {
        Self {
            center: Vector2::new(center_x, center_y),
            radius,
        }
    }

    /// `true` when the fit did not determine a circle.
    pub fn is_degenerate(&self) -> bool {
        self.radius <= 0.0
    }

    /// Signed distance from `p` to the circle (positive outside).
    pub fn residual(&self, p: &Vector2) -> f32 {
        (p - self.center).norm() - self.radius
    }

    /// Mean-squared and mean-absolute radial residual over `points`.
    ///
    /// Returns `None` for an empty point list.
    pub fn residual_statistics(&self, points: &[Vector2]) -> Option<FitStatistics> {
        if points.is_empty() {
            return None;
        }
        let (sum_sq, sum_abs) = points.iter().fold((0.0f64, 0.0f64), |(sq, abs), p| {
            let r = self.residual(p) as f64;
            (sq + r * r, abs + r.abs())
        });
        let n = points.len() as f64;
        Some(FitStatistics {
            mean_squared_error: (sum_sq / n) as f32,
            mean_absolute_error: (sum_abs / n) as f32,
        })
    }
}

/// Goodness of fit of a circle to the edge points, in pixels / pixels².
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitStatistics {
    pub mean_squared_error: f32,
    pub mean_absolute_error: f32,
}

/// Which circle fit the pipeline runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Archive, Serialize, Deserialize)]
pub enum FitAlgorithm {
    /// Algebraic linear least squares.
    #[default]
    LeastSquares,
    /// Perpendicular-bisector intersection over sub-sampled chords.
    Chord,
}

/// Fit a circle to `points` with the selected algorithm.
///
/// `chord_subset_stride` only applies to [`FitAlgorithm::Chord`].
pub fn fit_circle(
    points: &[Vector2],
    algorithm: FitAlgorithm,
    chord_subset_stride: usize,
) -> Circle {
    match algorithm {
        FitAlgorithm::LeastSquares => fit_least_squares(points),
        FitAlgorithm::Chord => fit_chord(points, chord_subset_stride),
    }
}

/// Evenly spaced points on an arc, used by the fit tests.
#[cfg(test)]
pub(crate) fn arc_points(
    cx: f32,
    cy: f32,
    r: f32,
    start: f32,
    end: f32,
    n: usize,
) -> Vec<Vector2> {
    (0..n)
        .map(|i| {
            let t = start + (end - start) * i as f32 / (n - 1) as f32;
            Vector2::new(cx + r * t.cos(), cy + r * t.sin())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_residual_statistics_exact_circle() {
        let circle = Circle::new(10.0, -40.0, 90.0);
        let points = arc_points(10.0, -40.0, 90.0, 0.3, 2.8, 64);
        let stats = circle.residual_statistics(&points).unwrap();
        assert!(stats.mean_squared_error < 1e-6);
        assert!(stats.mean_absolute_error < 1e-3);
    }

    #[test]
    fn test_residual_statistics_offset() {
        let circle = Circle::new(0.0, 0.0, 10.0);
        let points = [Vector2::new(12.0, 0.0), Vector2::new(0.0, 8.0)];
        let stats = circle.residual_statistics(&points).unwrap();
        assert!((stats.mean_squared_error - 4.0).abs() < 1e-5);
        assert!((stats.mean_absolute_error - 2.0).abs() < 1e-5);
        assert!(circle.residual_statistics(&[]).is_none());
    }

    #[test]
    fn test_dispatch() {
        let points = arc_points(-20.0, -150.0, 140.0, 0.6, 2.5, 200);
        for algorithm in [FitAlgorithm::LeastSquares, FitAlgorithm::Chord] {
            let c = fit_circle(&points, algorithm, 20);
            assert!(
                (c.center - Vector2::new(-20.0, -150.0)).norm() < 0.5 && (c.radius - 140.0).abs() < 0.5,
                "{:?} fit gave centre ({}, {}) radius {}",
                algorithm,
                c.center.x,
                c.center.y,
                c.radius
            );
        }
    }
}
