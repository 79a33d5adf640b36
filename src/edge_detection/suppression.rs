//! Gradient magnitude/phase and non-maximum suppression.

use std::f64::consts::PI;

use crate::pixel_grid::{Grid, COLS, ROWS};

use super::convolution::GRADIENT_MARGIN;

/// Rows/columns at each border left unset by [`non_max_suppression`].
pub const SUPPRESSION_MARGIN: usize = GRADIENT_MARGIN + 1;

/// Element-wise magnitude (`hypot`) and phase (`atan2`) of the gradients.
///
/// Phase is in radians over the full `atan2` range.
pub fn magnitude_and_phase(
    grad_x: &Grid<i16>,
    grad_y: &Grid<i16>,
    magnitude: &mut Grid<i16>,
    phase: &mut Grid<f64>,
) {
    magnitude.fill(0);
    phase.fill(0.0);
    for row in GRADIENT_MARGIN..ROWS - GRADIENT_MARGIN {
        for col in GRADIENT_MARGIN..COLS - GRADIENT_MARGIN {
            let gx = grad_x[(row, col)] as f64;
            let gy = grad_y[(row, col)] as f64;
            // Both inputs are within 14 bits, so the hypotenuse fits an i16.
            magnitude[(row, col)] = gx.hypot(gy) as i16;
            phase[(row, col)] = gy.atan2(gx);
        }
    }
}

/// Direction bucket of a gradient, folded into `[0°, 180°)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradientDirection {
    Horizontal,
    Diagonal45,
    Vertical,
    Diagonal135,
}

impl GradientDirection {
    /// Bucket a phase angle in radians.
    pub fn from_phase(phase: f64) -> Self {
        let mut angle = phase * 180.0 / PI;
        if angle < 0.0 {
            angle += 180.0;
        }
        if (22.5..67.5).contains(&angle) {
            GradientDirection::Diagonal45
        } else if (67.5..112.5).contains(&angle) {
            GradientDirection::Vertical
        } else if (112.5..157.5).contains(&angle) {
            GradientDirection::Diagonal135
        } else {
            GradientDirection::Horizontal
        }
    }

    /// The two neighbours of `(row, col)` along this direction.
    ///
    /// Row indices grow downward while the phase is measured with +y up,
    /// so "up-right" is `(row - 1, col + 1)`.
    fn neighbours(self, row: usize, col: usize) -> [(usize, usize); 2] {
        match self {
            GradientDirection::Horizontal => [(row, col + 1), (row, col - 1)],
            GradientDirection::Diagonal45 => [(row + 1, col - 1), (row - 1, col + 1)],
            GradientDirection::Vertical => [(row + 1, col), (row - 1, col)],
            GradientDirection::Diagonal135 => [(row - 1, col - 1), (row + 1, col + 1)],
        }
    }
}

/// Keep a pixel's magnitude only where it is a local maximum along its
/// gradient direction (ties kept); zero it otherwise.
///
/// The output never exceeds the input at any pixel.
pub fn non_max_suppression(magnitude: &Grid<i16>, phase: &Grid<f64>, output: &mut Grid<i16>) {
    output.fill(0);
    for row in SUPPRESSION_MARGIN..ROWS - SUPPRESSION_MARGIN {
        for col in SUPPRESSION_MARGIN..COLS - SUPPRESSION_MARGIN {
            let current = magnitude[(row, col)];
            let [q, r] = GradientDirection::from_phase(phase[(row, col)]).neighbours(row, col);
            if current >= magnitude[q] && current >= magnitude[r] {
                output[(row, col)] = current;
            }
        }
    }
}
