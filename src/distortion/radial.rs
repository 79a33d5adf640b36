//! Radial barrel correction evaluated directly on observed points.
//!
//! ```text
//! p_ideal = p_obs · (1 + k1·r² + k2·r⁴ + k3·r⁶),   r = |p_obs|
//! ```
//!
//! The polynomial is in the *observed* radius, so the correction is a fixed
//! number of multiply-adds per point with no iteration. Coordinates are
//! pixels relative to the optical centre.

use rkyv::{Archive, Deserialize, Serialize};

use crate::pixel_grid::{COLS, ROWS};
use crate::Vector2;

/// Highest even power of the radius the model carries (`r⁶`).
pub const MAX_ORDER: usize = 3;

/// Radial correction coefficients `[k1, k2, k3]`.
///
/// Calibrated values are small: `k1` around 1e-6 for the sensor optics,
/// higher orders rarely needed. Unused orders are zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Archive, Serialize, Deserialize)]
pub struct RadialDistortion {
    pub coefficients: [f32; MAX_ORDER],
}

impl RadialDistortion {
    pub fn new(coefficients: [f32; MAX_ORDER]) -> Self {
        Self { coefficients }
    }

    /// Single-coefficient model.
    pub fn first_order(k1: f32) -> Self {
        Self::new([k1, 0.0, 0.0])
    }

    /// First-order model from the fraction `pd` by which the image corner is
    /// pulled toward the centre, `pd = (r_p - r_d) / r_p`.
    ///
    /// The observed corner at `corner_radius_px` is moved out to
    /// `corner_radius_px / (1 - pd)`. Barrel distortion has `pd > 0`.
    pub fn from_corner_percentage(pd: f32, corner_radius_px: f32) -> Self {
        let r_sq = corner_radius_px * corner_radius_px;
        Self::first_order(pd / ((1.0 - pd) * r_sq))
    }

    /// [`from_corner_percentage`](Self::from_corner_percentage) at the corner
    /// of the 160 × 120 frame (100 px from the centre).
    pub fn for_sensor(pd: f32) -> Self {
        let corner = Vector2::new(COLS as f32 * 0.5, ROWS as f32 * 0.5);
        Self::from_corner_percentage(pd, corner.norm())
    }

    /// Radial scale factor `1 + Σ k_j r^(2j)` for squared observed radius
    /// `r_sq`.
    pub fn scale(&self, r_sq: f32) -> f32 {
        let poly = self
            .coefficients
            .iter()
            .rev()
            .fold(0.0f32, |acc, &k| (acc + k) * r_sq);
        1.0 + poly
    }

    /// Observed → ideal.
    pub fn correct(&self, p: &Vector2) -> Vector2 {
        p * self.scale(p.norm_squared())
    }

    pub fn is_zero(&self) -> bool {
        self.coefficients.iter().all(|&k| k == 0.0)
    }
}
